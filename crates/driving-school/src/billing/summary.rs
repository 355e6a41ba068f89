use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::views::{BillingSummaryView, StudentLedgerView, TimeBucketView, TotalsView};
use super::Period;
use crate::domain::{Amount, ClassStatus, DrivingClass, PaymentMethod, PaymentStatus, StudentId};
use crate::store::Snapshot;

/// Money sums over a set of classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub paid: Amount,
    pub pending: Amount,
    pub cash: Amount,
    pub transfer: Amount,
}

impl Totals {
    /// Paid classes count once whatever their status; completed unpaid ones are owed.
    pub fn record(&mut self, class: &DrivingClass) {
        if class.is_paid() {
            self.paid = self.paid.saturating_add(class.price);
            match class.payment_method {
                Some(PaymentMethod::Cash) => self.cash = self.cash.saturating_add(class.price),
                Some(PaymentMethod::Transfer) => {
                    self.transfer = self.transfer.saturating_add(class.price)
                }
                None => {}
            }
        } else if class.is_outstanding() {
            self.pending = self.pending.saturating_add(class.price);
        }
    }

    /// Sums saturate; stored prices are not bounded by form validation.
    pub const fn generated(&self) -> Amount {
        self.paid.saturating_add(self.pending)
    }

    /// Share of collected money paid in cash; zero when nothing was collected.
    pub fn cash_share_pct(&self) -> f64 {
        if self.paid == 0 {
            return 0.0;
        }
        self.cash as f64 * 100.0 / self.paid as f64
    }

    fn to_view(self) -> TotalsView {
        TotalsView {
            generated: self.generated(),
            paid: self.paid,
            pending: self.pending,
            cash: self.cash,
            transfer: self.transfer,
            cash_share_pct: self.cash_share_pct(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentLedger {
    pub student_id: StudentId,
    pub name: String,
    pub totals: Totals,
}

impl StudentLedger {
    pub const fn total(&self) -> Amount {
        self.totals.generated()
    }

    fn to_view(&self) -> StudentLedgerView {
        StudentLedgerView {
            student_id: self.student_id.clone(),
            name: self.name.clone(),
            paid: self.totals.paid,
            pending: self.totals.pending,
            cash: self.totals.cash,
            transfer: self.totals.transfer,
            total: self.total(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeBucket {
    pub label: String,
    pub total: Amount,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BillingSummary {
    pub period: Period,
    pub totals: Totals,
    /// Best contributors first, at most `top_n`.
    pub top_students: Vec<StudentLedger>,
    pub series: Vec<TimeBucket>,
}

impl BillingSummary {
    pub fn compute(snapshot: &Snapshot, period: Period, top_n: usize) -> Self {
        let mut totals = Totals::default();
        let mut per_student: HashMap<&StudentId, Totals> = HashMap::new();
        let mut buckets: BTreeMap<String, TimeBucket> = BTreeMap::new();

        for class in snapshot.classes.iter().filter(|class| period.contains(class.date)) {
            totals.record(class);
            per_student
                .entry(&class.student_id)
                .or_default()
                .record(class);

            if class.status == ClassStatus::Completed || class.payment_status == PaymentStatus::Paid {
                let (key, label) = period.bucket(class.date);
                let bucket = buckets
                    .entry(key)
                    .or_insert_with(|| TimeBucket { label, total: 0 });
                bucket.total = bucket.total.saturating_add(class.price);
            }
        }

        // Classes of deleted students stay in the totals but cannot be ranked.
        let mut top_students: Vec<StudentLedger> = snapshot
            .students
            .iter()
            .filter_map(|student| {
                let totals = per_student.get(&student.id).copied()?;
                (totals.generated() > 0).then(|| StudentLedger {
                    student_id: student.id.clone(),
                    name: student.short_name(),
                    totals,
                })
            })
            .collect();
        top_students.sort_by(|a, b| {
            b.total()
                .cmp(&a.total())
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.student_id.cmp(&b.student_id))
        });
        top_students.truncate(top_n);

        Self {
            period,
            totals,
            top_students,
            series: buckets.into_values().collect(),
        }
    }

    pub fn view(&self) -> BillingSummaryView {
        BillingSummaryView {
            period: self.period,
            period_label: self.period.label(),
            bucket_header: self.period.bucket_header(),
            totals: self.totals.to_view(),
            series: self
                .series
                .iter()
                .map(|bucket| TimeBucketView {
                    label: bucket.label.clone(),
                    total: bucket.total,
                })
                .collect(),
            top_students: self.top_students.iter().map(StudentLedger::to_view).collect(),
        }
    }
}

/// Lifetime figures for one student, as shown on the student profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StudentAccount {
    pub completed_classes: usize,
    pub completed_amount: Amount,
    pub paid: Amount,
    pub pending: Amount,
}

impl StudentAccount {
    pub fn for_student(snapshot: &Snapshot, student_id: &StudentId) -> Self {
        snapshot
            .classes_for(student_id)
            .fold(Self::default(), |mut account, class| {
                if class.is_completed() {
                    account.completed_classes += 1;
                    account.completed_amount =
                        account.completed_amount.saturating_add(class.price);
                }
                if class.is_paid() {
                    account.paid = account.paid.saturating_add(class.price);
                } else if class.is_outstanding() {
                    account.pending = account.pending.saturating_add(class.price);
                }
                account
            })
    }
}
