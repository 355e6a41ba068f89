use serde::Serialize;

use super::{Period, YearMonth};
use crate::domain::{Amount, StudentId};

#[derive(Debug, Clone, Serialize)]
pub struct TotalsView {
    pub generated: Amount,
    pub paid: Amount,
    pub pending: Amount,
    pub cash: Amount,
    pub transfer: Amount,
    pub cash_share_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentLedgerView {
    pub student_id: StudentId,
    pub name: String,
    pub paid: Amount,
    pub pending: Amount,
    pub cash: Amount,
    pub transfer: Amount,
    pub total: Amount,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeBucketView {
    pub label: String,
    pub total: Amount,
}

#[derive(Debug, Clone, Serialize)]
pub struct BillingSummaryView {
    pub period: Period,
    pub period_label: String,
    pub bucket_header: &'static str,
    pub totals: TotalsView,
    pub series: Vec<TimeBucketView>,
    pub top_students: Vec<StudentLedgerView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailableMonthsView {
    pub current: YearMonth,
    pub months: Vec<YearMonth>,
}
