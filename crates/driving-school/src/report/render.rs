use std::fmt::Write as _;

use super::{format_amount, FinancialReport, REPORT_TITLE};

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const STYLE: &str = "body{font-family:Helvetica,Arial,sans-serif;margin:2em;color:#1e293b}\
table{border-collapse:collapse;margin-bottom:2em;min-width:60%}\
th{background:#2563eb;color:#fff;text-align:left}\
th,td{padding:4px 10px;border:1px solid #cbd5e1}\
.figures{background:#f0f0f0;padding:1em;margin:1em 0}\
@media print{body{margin:0}}";

impl FinancialReport {
    /// Self-contained HTML document, meant to be printed or saved as PDF.
    pub fn render_html(&self) -> String {
        let summary = &self.summary;
        let totals = &summary.totals;
        let mut html = String::new();

        // Writing into a String cannot fail.
        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
             <h1>{title}</h1>\n<p>Issued: {issued}</p>\n<p>Reported period: {period}</p>\n",
            title = escape(REPORT_TITLE),
            issued = self.issued_on(),
            period = escape(&summary.period_label),
        );

        let _ = write!(
            html,
            "<div class=\"figures\">\n<p>Total generated: {}</p>\n<p>Total collected: {}</p>\n\
             <p>Pending collection: {}</p>\n<p>Collected by method: Cash {} / Transfer {}</p>\n</div>\n",
            format_amount(totals.generated),
            format_amount(totals.paid),
            format_amount(totals.pending),
            format_amount(totals.cash),
            format_amount(totals.transfer),
        );

        let _ = write!(
            html,
            "<h2>{}</h2>\n<table>\n<thead><tr><th>{}</th><th>Billed ($)</th></tr></thead>\n<tbody>\n",
            self.series_title(),
            summary.bucket_header,
        );
        for bucket in &summary.series {
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{}</td></tr>",
                escape(&bucket.label),
                format_amount(bucket.total)
            );
        }
        html.push_str("</tbody>\n</table>\n");

        html.push_str(
            "<h2>Per student (top 10 in period)</h2>\n<table>\n\
             <thead><tr><th>Student</th><th>Paid</th><th>Pending</th><th>Total</th></tr></thead>\n<tbody>\n",
        );
        for student in &summary.top_students {
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&student.name),
                format_amount(student.paid),
                format_amount(student.pending),
                format_amount(student.total)
            );
        }
        html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
        html
    }

    pub fn render_text(&self) -> String {
        let summary = &self.summary;
        let totals = &summary.totals;
        let mut out = String::new();

        let _ = writeln!(out, "{REPORT_TITLE}");
        let _ = writeln!(out, "Issued: {}", self.issued_on());
        let _ = writeln!(out, "Reported period: {}", summary.period_label);
        let _ = writeln!(out);
        let _ = writeln!(out, "Total generated:     {}", format_amount(totals.generated));
        let _ = writeln!(out, "Total collected:     {}", format_amount(totals.paid));
        let _ = writeln!(out, "Pending collection:  {}", format_amount(totals.pending));
        let _ = writeln!(
            out,
            "Collected by method: Cash {} / Transfer {} ({:.1}% cash)",
            format_amount(totals.cash),
            format_amount(totals.transfer),
            totals.cash_share_pct
        );
        let _ = writeln!(out);

        let _ = writeln!(out, "{}", self.series_title());
        let _ = writeln!(out, "{:<10} {:>12}", summary.bucket_header, "Billed ($)");
        for bucket in &summary.series {
            let _ = writeln!(out, "{:<10} {:>12}", bucket.label, format_amount(bucket.total));
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "Per student (top 10 in period)");
        let _ = writeln!(
            out,
            "{:<20} {:>10} {:>10} {:>10}",
            "Student", "Paid", "Pending", "Total"
        );
        for student in &summary.top_students {
            let _ = writeln!(
                out,
                "{:<20} {:>10} {:>10} {:>10}",
                student.name,
                format_amount(student.paid),
                format_amount(student.pending),
                format_amount(student.total)
            );
        }
        out
    }
}
