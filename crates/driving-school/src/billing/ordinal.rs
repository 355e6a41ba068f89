use std::collections::HashMap;

use crate::domain::{ClassId, DrivingClass, StudentId};

fn sort_chronologically(classes: &mut [&DrivingClass]) {
    classes.sort_by(|a, b| {
        (a.date, a.start_time, &a.id).cmp(&(b.date, b.start_time, &b.id))
    });
}

/// One student's classes, oldest first. Identical slots fall back to the class id.
pub fn chronological<'a>(classes: &'a [DrivingClass], student_id: &StudentId) -> Vec<&'a DrivingClass> {
    let mut owned: Vec<&DrivingClass> = classes
        .iter()
        .filter(|class| &class.student_id == student_id)
        .collect();
    sort_chronologically(&mut owned);
    owned
}

/// 1-based position of a class among its student's classes.
pub fn ordinal_of(classes: &[DrivingClass], class_id: &ClassId) -> Option<u32> {
    let target = classes.iter().find(|class| &class.id == class_id)?;
    let position = chronological(classes, &target.student_id)
        .iter()
        .position(|class| &class.id == class_id)?;
    Some(position as u32 + 1)
}

/// Ordinal the class being edited will take for `student_id`.
///
/// A class that keeps its student keeps its current ordinal. A new class, or one
/// moving to another student, lands after all of the target student's classes.
pub fn upcoming_ordinal(
    classes: &[DrivingClass],
    student_id: &StudentId,
    editing: Option<&ClassId>,
) -> u32 {
    if let Some(class_id) = editing {
        let keeps_student = classes
            .iter()
            .any(|class| &class.id == class_id && &class.student_id == student_id);
        if keeps_student {
            if let Some(ordinal) = ordinal_of(classes, class_id) {
                return ordinal;
            }
        }
    }

    let existing = classes
        .iter()
        .filter(|class| &class.student_id == student_id)
        .filter(|class| Some(&class.id) != editing)
        .count();
    existing as u32 + 1
}

/// Ordinals for every class, computed in a single pass per student.
#[derive(Debug, Clone, Default)]
pub struct OrdinalIndex {
    ordinals: HashMap<ClassId, u32>,
}

impl OrdinalIndex {
    pub fn build(classes: &[DrivingClass]) -> Self {
        let mut by_student: HashMap<&StudentId, Vec<&DrivingClass>> = HashMap::new();
        for class in classes {
            by_student.entry(&class.student_id).or_default().push(class);
        }

        let mut ordinals = HashMap::with_capacity(classes.len());
        for (_, mut owned) in by_student {
            sort_chronologically(&mut owned);
            for (position, class) in owned.into_iter().enumerate() {
                ordinals.insert(class.id.clone(), position as u32 + 1);
            }
        }
        Self { ordinals }
    }

    pub fn get(&self, class_id: &ClassId) -> Option<u32> {
        self.ordinals.get(class_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::time::parse_time;
    use crate::domain::{
        ClassDuration, ClassStatus, ClassType, NewClass, PaymentStatus,
    };
    use chrono::NaiveDate;

    fn class(id: &str, student: &str, day: u32, start: &str) -> DrivingClass {
        NewClass {
            student_id: StudentId::from(student),
            date: NaiveDate::from_ymd_opt(2024, 3, day).expect("valid"),
            start_time: parse_time(start).expect("valid"),
            duration: ClassDuration::Sixty,
            kind: ClassType::Practice,
            status: ClassStatus::Scheduled,
            payment_status: PaymentStatus::Pending,
            price: 15000,
            payment_method: None,
            notes: String::new(),
            location: None,
        }
        .into_class(ClassId::from(id))
    }

    fn roster() -> Vec<DrivingClass> {
        vec![
            class("c3", "ana", 10, "09:00"),
            class("c1", "ana", 2, "18:00"),
            class("c2", "ana", 2, "08:30"),
            class("x1", "beto", 1, "07:00"),
        ]
    }

    #[test]
    fn ordinal_follows_date_then_start_time() {
        let classes = roster();
        assert_eq!(ordinal_of(&classes, &ClassId::from("c2")), Some(1));
        assert_eq!(ordinal_of(&classes, &ClassId::from("c1")), Some(2));
        assert_eq!(ordinal_of(&classes, &ClassId::from("c3")), Some(3));
        assert_eq!(ordinal_of(&classes, &ClassId::from("x1")), Some(1));
        assert_eq!(ordinal_of(&classes, &ClassId::from("nope")), None);
    }

    #[test]
    fn identical_slots_break_ties_by_id() {
        let classes = vec![
            class("b", "ana", 5, "10:00"),
            class("a", "ana", 5, "10:00"),
        ];
        assert_eq!(ordinal_of(&classes, &ClassId::from("a")), Some(1));
        assert_eq!(ordinal_of(&classes, &ClassId::from("b")), Some(2));
    }

    #[test]
    fn index_matches_single_lookups() {
        let classes = roster();
        let index = OrdinalIndex::build(&classes);
        for class in &classes {
            assert_eq!(index.get(&class.id), ordinal_of(&classes, &class.id));
        }
    }

    #[test]
    fn ordinals_are_stable_across_reads() {
        let classes = roster();
        let first: Vec<_> = classes.iter().map(|c| ordinal_of(&classes, &c.id)).collect();
        let second: Vec<_> = classes.iter().map(|c| ordinal_of(&classes, &c.id)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn upcoming_ordinal_for_new_and_moved_classes() {
        let classes = roster();
        let ana = StudentId::from("ana");
        let beto = StudentId::from("beto");

        assert_eq!(upcoming_ordinal(&classes, &ana, None), 4);
        assert_eq!(upcoming_ordinal(&classes, &StudentId::from("new"), None), 1);
        // keeps its student: current position
        assert_eq!(upcoming_ordinal(&classes, &ana, Some(&ClassId::from("c1"))), 2);
        // moves from ana to beto
        assert_eq!(upcoming_ordinal(&classes, &beto, Some(&ClassId::from("c1"))), 2);
    }
}
