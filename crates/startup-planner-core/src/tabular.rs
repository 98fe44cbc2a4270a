use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{PlannerError, PlannerResult};

/// Date layouts accepted in uploaded tables, tried in order.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// An uploaded table before any schema is applied: a header row and rows of
/// raw string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> PlannerResult<Self> {
        let table = RawTable { headers, rows };
        table.validate()?;
        Ok(table)
    }

    /// Every row must have exactly one cell per header.
    pub fn validate(&self) -> PlannerResult<()> {
        if self.headers.is_empty() {
            return Err(PlannerError::invalid("headers", "Table has no columns."));
        }
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.headers.len() {
                return Err(PlannerError::invalid(
                    format!("row {}", i + 1),
                    format!(
                        "Expected {} cells, found {}.",
                        self.headers.len(),
                        row.len()
                    ),
                ));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, matching the header exactly after trimming.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn require_column(&self, name: &str) -> PlannerResult<usize> {
        self.column_index(name)
            .ok_or_else(|| PlannerError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Check several required columns at once, reporting the first missing.
    pub fn require_columns(&self, names: &[&str]) -> PlannerResult<()> {
        for name in names {
            self.require_column(name)?;
        }
        Ok(())
    }

    /// First of `names` present in the table.
    pub fn first_column_of(&self, names: &[&str]) -> Option<usize> {
        names.iter().find_map(|n| self.column_index(n))
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows[row][col].trim()
    }

    /// Numeric column where blank cells are `None`.
    pub fn decimal_column(&self, name: &str) -> PlannerResult<Vec<Option<Decimal>>> {
        let col = self.require_column(name)?;
        self.decimal_column_at(col)
    }

    pub fn decimal_column_at(&self, col: usize) -> PlannerResult<Vec<Option<Decimal>>> {
        let header = self.headers[col].trim();
        (0..self.rows.len())
            .map(|r| {
                let raw = self.cell(r, col);
                parse_decimal_cell(raw).map_err(|_| cell_error(header, r, "not a number", raw))
            })
            .collect()
    }

    /// Numeric column where every cell must hold a value.
    pub fn required_decimal_column(&self, name: &str) -> PlannerResult<Vec<Decimal>> {
        let values = self.decimal_column(name)?;
        values
            .into_iter()
            .enumerate()
            .map(|(r, v)| v.ok_or_else(|| cell_error(name, r, "value is missing", "")))
            .collect()
    }

    /// Optional numeric column: `None` when absent, blanks read as zero.
    pub fn optional_decimal_column(&self, name: &str) -> PlannerResult<Option<Vec<Decimal>>> {
        match self.column_index(name) {
            None => Ok(None),
            Some(col) => Ok(Some(
                self.decimal_column_at(col)?
                    .into_iter()
                    .map(|v| v.unwrap_or(Decimal::ZERO))
                    .collect(),
            )),
        }
    }

    pub fn date_column(&self, name: &str) -> PlannerResult<Vec<NaiveDate>> {
        let col = self.require_column(name)?;
        self.date_column_at(col)
    }

    pub fn date_column_at(&self, col: usize) -> PlannerResult<Vec<NaiveDate>> {
        let header = self.headers[col].trim();
        (0..self.rows.len())
            .map(|r| {
                let raw = self.cell(r, col);
                parse_date(raw).ok_or_else(|| cell_error(header, r, "not a date", raw))
            })
            .collect()
    }

    /// True when every non-blank cell of the column parses as a number and at
    /// least one cell is non-blank.
    pub fn is_numeric_column(&self, col: usize) -> bool {
        let mut seen = false;
        for r in 0..self.rows.len() {
            match parse_decimal_cell(self.cell(r, col)) {
                Ok(Some(_)) => seen = true,
                Ok(None) => {}
                Err(_) => return false,
            }
        }
        seen
    }
}

/// Parse a date in any of the accepted layouts. A trailing time of day is
/// accepted and discarded.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, DATETIME_FORMAT) {
        return Some(dt.date());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Blank cells are `Ok(None)`; anything else must be a plain or scientific
/// decimal.
pub fn parse_decimal_cell(s: &str) -> Result<Option<Decimal>, rust_decimal::Error> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map(Some)
}

fn cell_error(column: &str, row: usize, reason: &str, raw: &str) -> PlannerError {
    let reason = if raw.is_empty() {
        reason.to_string()
    } else {
        format!("{reason}: '{raw}'")
    };
    PlannerError::invalid(format!("{column} row {}", row + 1), reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_require_column_reports_missing_name() {
        let t = table(&["Date", "Revenue"], &[&["2024-01-01", "10"]]);
        assert_eq!(t.require_column("Revenue").unwrap(), 1);
        match t.require_column("COGS") {
            Err(PlannerError::MissingColumn { column }) => assert_eq!(column, "COGS"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = RawTable::new(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into()]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(parse_date("2024-03-15"), Some(expected));
        assert_eq!(parse_date("2024/03/15"), Some(expected));
        assert_eq!(parse_date("15/03/2024"), Some(expected));
        assert_eq!(parse_date("2024-03-15 08:30:00"), Some(expected));
        assert_eq!(parse_date("March 15"), None);
    }

    #[test]
    fn test_decimal_cells() {
        assert_eq!(parse_decimal_cell("  12.5 ").unwrap(), Some(dec!(12.5)));
        assert_eq!(parse_decimal_cell("1.5e3").unwrap(), Some(dec!(1500)));
        assert_eq!(parse_decimal_cell("").unwrap(), None);
        assert!(parse_decimal_cell("abc").is_err());
    }

    #[test]
    fn test_bad_cell_names_column_and_row() {
        let t = table(&["Revenue"], &[&["10"], &["ten"]]);
        match t.decimal_column("Revenue") {
            Err(PlannerError::InvalidInput { field, .. }) => assert_eq!(field, "Revenue row 2"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_numeric_column_detection() {
        let t = table(
            &["Date", "Users", "Region"],
            &[&["2024-01-01", "5", "EU"], &["2024-02-01", "", "US"]],
        );
        assert!(!t.is_numeric_column(0));
        assert!(t.is_numeric_column(1));
        assert!(!t.is_numeric_column(2));
    }

    #[test]
    fn test_optional_column_blanks_are_zero() {
        let t = table(&["Equity"], &[&["100"], &[""]]);
        assert_eq!(
            t.optional_decimal_column("Equity").unwrap(),
            Some(vec![dec!(100), Decimal::ZERO])
        );
        assert_eq!(t.optional_decimal_column("Inventory").unwrap(), None);
    }
}
