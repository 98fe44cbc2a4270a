use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::business::BusinessReport;
use super::financial::FinancialReport;
use super::KpiStat;

pub const MARKDOWN_CONTENT_TYPE: &str = "text/markdown";

/// A rendered report held in memory; the caller decides where it goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportArtifact {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ReportArtifact {
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }
}

/// Reports that know how to lay themselves out as Markdown sections.
pub trait MarkdownReport {
    fn file_name(&self) -> &'static str;
    fn title(&self) -> &'static str;
    fn body(&self, out: &mut String);
}

pub fn render_markdown<R: MarkdownReport>(report: &R, generated_at: NaiveDateTime) -> ReportArtifact {
    let mut out = format!(
        "# {}\n\n_Generated {}_\n\n",
        report.title(),
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    report.body(&mut out);
    ReportArtifact {
        file_name: report.file_name().to_string(),
        content_type: MARKDOWN_CONTENT_TYPE.to_string(),
        bytes: out.into_bytes(),
    }
}

/// Two decimals with thousands separators: `1234567.891` → `1,234,567.89`.
pub fn format_amount(value: Decimal) -> String {
    let text = format!("{:.2}", value.round_dp(2).abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value.round_dp(2) < Decimal::ZERO { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

/// Value already expressed in percent.
fn format_percent(value: Decimal) -> String {
    format!("{:.1}%", value.round_dp(1))
}

fn format_pct(fraction: Decimal) -> String {
    format_percent(fraction * dec!(100))
}

fn format_opt(value: Option<Decimal>, fmt: fn(Decimal) -> String) -> String {
    value.map(fmt).unwrap_or_else(|| "n/a".to_string())
}

fn table(out: &mut String, headers: &[&str], rows: impl IntoIterator<Item = Vec<String>>) {
    out.push_str(&format!("| {} |\n", headers.join(" | ")));
    out.push_str(&format!("|{}\n", "---|".repeat(headers.len())));
    for row in rows {
        out.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    out.push('\n');
}

fn kpi_section(out: &mut String, stats: &[KpiStat]) {
    out.push_str("## KPI Summary\n\n");
    table(
        out,
        &["KPI", "Total", "Mean", "Max", "Min"],
        stats.iter().map(|s| {
            vec![
                s.kpi.clone(),
                s.total.map(format_amount).unwrap_or_default(),
                format_amount(s.mean),
                format_amount(s.max),
                format_amount(s.min),
            ]
        }),
    );
}

impl MarkdownReport for BusinessReport {
    fn file_name(&self) -> &'static str {
        "business_report.md"
    }

    fn title(&self) -> &'static str {
        "Business Performance Report"
    }

    fn body(&self, out: &mut String) {
        kpi_section(out, &self.kpi_summary);

        let m = &self.metrics;
        out.push_str("## Key Metrics\n\n");
        table(
            out,
            &["Metric", "Value"],
            [
                ("Revenue growth", format_opt(m.revenue_growth_pct, format_percent)),
                ("Net profit growth", format_opt(m.net_profit_growth_pct, format_percent)),
                ("Marketing / revenue", format_opt(m.marketing_to_revenue_pct, format_percent)),
                ("Operating / revenue", format_opt(m.operating_to_revenue_pct, format_percent)),
                ("Average burn", format_amount(m.average_burn)),
                (
                    "Runway (months)",
                    m.runway_months
                        .map(|r| r.round_dp(1).to_string())
                        .unwrap_or_else(|| "n/a".to_string()),
                ),
            ]
            .into_iter()
            .map(|(k, v)| vec![k.to_string(), v]),
        );

        out.push_str("## Period Totals\n\n");
        table(
            out,
            &["Period", "Revenue", "Total Cost", "Net Profit", "Net Margin"],
            self.periods.iter().map(|p| {
                vec![
                    p.period.clone(),
                    format_amount(p.revenue),
                    format_amount(p.total_cost),
                    format_amount(p.net_profit),
                    format_pct(p.net_margin),
                ]
            }),
        );

        if let Some(targets) = &self.targets {
            out.push_str("## Targets\n\n");
            table(
                out,
                &["KPI", "Actual", "Target", "Gap", "Achievement"],
                targets.iter().map(|t| {
                    vec![
                        t.kpi.clone(),
                        format_amount(t.actual),
                        format_amount(t.target),
                        format_amount(t.gap),
                        format_opt(t.achievement_pct, format_percent),
                    ]
                }),
            );
        }
    }
}

impl MarkdownReport for FinancialReport {
    fn file_name(&self) -> &'static str {
        "financial_report.md"
    }

    fn title(&self) -> &'static str {
        "Financial Statement Report"
    }

    fn body(&self, out: &mut String) {
        kpi_section(out, &self.kpi_summary);

        out.push_str("## Financial Ratios\n\n");
        table(
            out,
            &["Ratio", "Mean"],
            self.ratios.iter().map(|r| {
                vec![
                    r.name.clone(),
                    format_opt(r.value, |v| v.round_dp(4).normalize().to_string()),
                ]
            }),
        );

        if let Some(targets) = &self.targets {
            out.push_str("## Targets\n\n");
            table(
                out,
                &["KPI", "Actual", "Target", "Gap", "Achievement"],
                targets.iter().map(|t| {
                    if !t.has_data {
                        return vec![
                            t.kpi.clone(),
                            "no data".to_string(),
                            format_amount(t.target),
                            String::new(),
                            String::new(),
                        ];
                    }
                    vec![
                        t.kpi.clone(),
                        format_opt(t.actual, format_amount),
                        format_amount(t.target),
                        format_opt(t.gap, format_amount),
                        format_opt(t.achievement_pct, format_percent),
                    ]
                }),
            );
        }
    }
}
