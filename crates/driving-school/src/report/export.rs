use std::io::Write;
use std::str::FromStr;

use serde::Deserialize;

use super::{format_amount, FinancialReport, ReportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Html,
    Text,
    Csv,
}

impl ReportFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Text => "txt",
            Self::Csv => "csv",
        }
    }

    pub fn content_type(self) -> mime::Mime {
        match self {
            Self::Html => mime::TEXT_HTML_UTF_8,
            Self::Text => mime::TEXT_PLAIN_UTF_8,
            Self::Csv => mime::TEXT_CSV_UTF_8,
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "text" | "txt" => Ok(Self::Text),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown report format '{other}'")),
        }
    }
}

impl FinancialReport {
    /// Both tables in one CSV stream, each preceded by a section row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ReportError> {
        let summary = &self.summary;
        let mut csv_writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(writer);

        csv_writer.write_record(["section", self.series_title()])?;
        csv_writer.write_record([summary.bucket_header, "Billed ($)"])?;
        for bucket in &summary.series {
            csv_writer.write_record([bucket.label.as_str(), format_amount(bucket.total).as_str()])?;
        }

        csv_writer.write_record(["section", "Per student (top 10 in period)"])?;
        csv_writer.write_record(["Student", "Paid", "Pending", "Total"])?;
        for student in &summary.top_students {
            csv_writer.write_record([
                student.name.as_str(),
                format_amount(student.paid).as_str(),
                format_amount(student.pending).as_str(),
                format_amount(student.total).as_str(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    pub fn render(&self, format: ReportFormat) -> Result<String, ReportError> {
        match format {
            ReportFormat::Html => Ok(self.render_html()),
            ReportFormat::Text => Ok(self.render_text()),
            ReportFormat::Csv => {
                let mut buffer = Vec::new();
                self.write_csv(&mut buffer)?;
                String::from_utf8(buffer).map_err(|err| {
                    ReportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::{BillingSummary, Period};
    use crate::store::Snapshot;
    use chrono::NaiveDate;

    #[test]
    fn empty_period_exports_headers_only() {
        let generated_at = NaiveDate::from_ymd_opt(2024, 4, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("valid");
        let summary = BillingSummary::compute(&Snapshot::default(), Period::AllTime, 10);
        let csv = FinancialReport::build(&summary, generated_at)
            .render(ReportFormat::Csv)
            .expect("renders");

        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(
            lines,
            [
                "section,Monthly breakdown",
                "Month,Billed ($)",
                "section,Per student (top 10 in period)",
                "Student,Paid,Pending,Total",
            ]
        );
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("CSV".parse::<ReportFormat>(), Ok(ReportFormat::Csv));
        assert!("pdf".parse::<ReportFormat>().is_err());
        assert_eq!(ReportFormat::Csv.content_type().as_ref(), "text/csv; charset=utf-8");
    }
}
