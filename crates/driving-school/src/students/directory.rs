use serde::Serialize;

use crate::billing::{OrdinalIndex, PromoPolicy, StudentAccount};
use crate::domain::{ClassStatus, DrivingClass, Student, StudentId};
use crate::store::Snapshot;

/// Case-insensitive match on first or last name. A blank query matches everyone.
pub fn matches_query(student: &Student, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    needle.is_empty()
        || student.first_name.to_lowercase().contains(&needle)
        || student.last_name.to_lowercase().contains(&needle)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentRow {
    #[serde(flatten)]
    pub student: Student,
    pub completed_classes: usize,
    /// Every class not cancelled, whatever its outcome.
    pub engaged_classes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub class: DrivingClass,
    pub ordinal: u32,
    pub promo: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentProfile {
    pub student: Student,
    pub account: StudentAccount,
    /// Newest first.
    pub history: Vec<HistoryEntry>,
}

/// Read side of the students screen.
pub struct Directory<'a> {
    snapshot: &'a Snapshot,
    policy: PromoPolicy,
}

impl<'a> Directory<'a> {
    pub fn new(snapshot: &'a Snapshot, policy: PromoPolicy) -> Self {
        Self { snapshot, policy }
    }

    /// Students matching `query`, sorted by last then first name.
    pub fn rows(&self, query: &str) -> Vec<StudentRow> {
        let mut rows: Vec<StudentRow> = self
            .snapshot
            .students
            .iter()
            .filter(|student| matches_query(student, query))
            .map(|student| self.row(student))
            .collect();
        rows.sort_by_cached_key(|row| {
            (
                row.student.last_name.to_lowercase(),
                row.student.first_name.to_lowercase(),
                row.student.id.clone(),
            )
        });
        rows
    }

    pub fn row(&self, student: &Student) -> StudentRow {
        let (completed_classes, engaged_classes) = self.snapshot.classes_for(&student.id).fold(
            (0, 0),
            |(completed, engaged), class| {
                (
                    completed + usize::from(class.is_completed()),
                    engaged + usize::from(class.status != ClassStatus::Cancelled),
                )
            },
        );
        StudentRow {
            student: student.clone(),
            completed_classes,
            engaged_classes,
        }
    }

    pub fn profile(&self, id: &StudentId) -> Option<StudentProfile> {
        let student = self.snapshot.student(id)?;
        let ordinals = OrdinalIndex::build(&self.snapshot.classes);

        let mut history: Vec<HistoryEntry> = self
            .snapshot
            .classes_for(id)
            .map(|class| {
                let ordinal = ordinals.get(&class.id).unwrap_or(1);
                HistoryEntry {
                    class: class.clone(),
                    ordinal,
                    promo: self.policy.is_promo(Some(student), ordinal),
                }
            })
            .collect();
        history.sort_by(|a, b| b.ordinal.cmp(&a.ordinal));

        Some(StudentProfile {
            student: student.clone(),
            account: StudentAccount::for_student(self.snapshot, id),
            history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::time::parse_time;
    use crate::domain::{
        ClassDuration, ClassId, ClassType, ExamReadiness, NewClass, NewStudent, PaymentMethod,
        PaymentStatus, StudentStatus,
    };
    use chrono::NaiveDate;

    fn student(id: &str, first: &str, last: &str) -> Student {
        NewStudent {
            first_name: first.to_string(),
            last_name: last.to_string(),
            phone: "600".to_string(),
            email: None,
            national_id: None,
            status: StudentStatus::Active,
            exam_readiness: ExamReadiness::No,
            registration_date: None,
            price_per_class: 15000,
            promo_packs: 1,
            notes: String::new(),
            strengths: Vec::new(),
            weaknesses: Vec::new(),
        }
        .into_student(StudentId::from(id))
    }

    fn class(id: &str, student: &str, day: u32, status: ClassStatus) -> DrivingClass {
        let paid = status == ClassStatus::Completed;
        NewClass {
            student_id: StudentId::from(student),
            date: NaiveDate::from_ymd_opt(2024, 4, day).expect("valid"),
            start_time: parse_time("09:00").expect("valid"),
            duration: ClassDuration::Sixty,
            kind: ClassType::Practice,
            status,
            payment_status: if paid {
                PaymentStatus::Paid
            } else {
                PaymentStatus::Pending
            },
            price: 9000,
            payment_method: paid.then_some(PaymentMethod::Cash),
            notes: String::new(),
            location: None,
        }
        .into_class(ClassId::from(id))
    }

    fn snapshot() -> Snapshot {
        Snapshot::new(
            vec![
                student("s-1", "Lucia", "Garcia"),
                student("s-2", "Marcos", "Alonso"),
                student("s-3", "Ana", "Fernandez"),
            ],
            vec![
                class("c-1", "s-1", 2, ClassStatus::Completed),
                class("c-2", "s-1", 9, ClassStatus::Cancelled),
                class("c-3", "s-1", 16, ClassStatus::Scheduled),
                class("c-4", "s-1", 1, ClassStatus::NoShow),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn search_ignores_case_and_checks_both_names() {
        let snapshot = snapshot();
        let directory = Directory::new(&snapshot, PromoPolicy::default());
        let names: Vec<String> = directory
            .rows("AL")
            .into_iter()
            .map(|row| row.student.full_name())
            .collect();
        assert_eq!(names, ["Marcos Alonso"]);
        assert_eq!(directory.rows("  ").len(), 3);
        assert!(directory.rows("zz").is_empty());
    }

    #[test]
    fn rows_sort_by_last_name() {
        let snapshot = snapshot();
        let rows = Directory::new(&snapshot, PromoPolicy::default()).rows("");
        let ids: Vec<&str> = rows.iter().map(|row| row.student.id.as_str()).collect();
        assert_eq!(ids, ["s-2", "s-3", "s-1"]);
    }

    #[test]
    fn counts_completed_and_engaged_classes() {
        let snapshot = snapshot();
        let directory = Directory::new(&snapshot, PromoPolicy::default());
        let row = directory.row(&snapshot.students[0]);
        assert_eq!(row.completed_classes, 1);
        assert_eq!(row.engaged_classes, 3);
    }

    #[test]
    fn profile_lists_history_newest_first() {
        let snapshot = snapshot();
        let profile = Directory::new(&snapshot, PromoPolicy::default())
            .profile(&StudentId::from("s-1"))
            .expect("present");

        let ids: Vec<&str> = profile
            .history
            .iter()
            .map(|entry| entry.class.id.as_str())
            .collect();
        assert_eq!(ids, ["c-3", "c-2", "c-1", "c-4"]);
        assert_eq!(profile.history[0].ordinal, 4);
        assert!(profile.history.iter().all(|entry| entry.promo));
        assert_eq!(profile.account.completed_classes, 1);
        assert_eq!(profile.account.paid, 9000);
    }

    #[test]
    fn unknown_student_has_no_profile() {
        let snapshot = snapshot();
        let directory = Directory::new(&snapshot, PromoPolicy::default());
        assert!(directory.profile(&StudentId::from("ghost")).is_none());
    }
}
