use startup_planner_core::tabular::RawTable;
use tracing::debug;

use super::file::resolve_path;

/// Load a CSV upload into a [`RawTable`]. Header cells are trimmed; a
/// leading UTF-8 byte-order mark is dropped.
pub fn read_csv(path: &str) -> Result<RawTable, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record =
            record.map_err(|e| format!("'{}' row {}: {}", canonical.display(), i + 1, e))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    debug!(path = %canonical.display(), rows = rows.len(), "csv loaded");

    Ok(RawTable::new(headers, rows)?)
}

/// Optional companion table such as a targets upload.
pub fn read_optional_csv(path: Option<&str>) -> Result<Option<RawTable>, Box<dyn std::error::Error>> {
    path.map(read_csv).transpose()
}
