//! Printable financial report built from a billing summary.

mod export;
mod render;

use chrono::NaiveDateTime;

use crate::billing::views::BillingSummaryView;
use crate::billing::BillingSummary;
use crate::domain::Amount;

pub use export::ReportFormat;

pub const REPORT_TITLE: &str = "Driving School - Financial Report";

/// Currency symbol followed by the bare integer, no grouping separators.
pub fn format_amount(amount: Amount) -> String {
    format!("${amount}")
}

#[derive(Debug, Clone)]
pub struct FinancialReport {
    pub generated_at: NaiveDateTime,
    pub summary: BillingSummaryView,
}

impl FinancialReport {
    pub fn build(summary: &BillingSummary, generated_at: NaiveDateTime) -> Self {
        Self {
            generated_at,
            summary: summary.view(),
        }
    }

    pub fn file_name(&self, format: ReportFormat) -> String {
        format!(
            "financial_report_{}.{}",
            self.summary.period.slug(),
            format.extension()
        )
    }

    pub fn issued_on(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M").to_string()
    }

    pub fn series_title(&self) -> &'static str {
        match self.summary.bucket_header {
            "Month" => "Monthly breakdown",
            _ => "Daily breakdown",
        }
    }
}

#[derive(Debug)]
pub enum ReportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::Io(err) => write!(f, "failed to write report: {}", err),
            ReportError::Csv(err) => write!(f, "failed to write report CSV: {}", err),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Io(err) => Some(err),
            ReportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}
