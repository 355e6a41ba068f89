use chrono::{Days, NaiveDate};
use driving_school::domain::time::parse_time;
use driving_school::domain::{
    ClassDuration, ClassId, ClassStatus, ClassType, DrivingClass, ExamReadiness, NewClass,
    NewStudent, PaymentMethod, PaymentStatus, StudentId, StudentStatus,
};
use driving_school::store::Snapshot;

struct SeedClass {
    id: &'static str,
    student: &'static str,
    day_offset: i64,
    start: &'static str,
    kind: ClassType,
    status: ClassStatus,
    payment_status: PaymentStatus,
    payment_method: Option<PaymentMethod>,
    price: u64,
    notes: &'static str,
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn shift(today: NaiveDate, offset: i64) -> NaiveDate {
    let days = Days::new(offset.unsigned_abs());
    let shifted = if offset < 0 {
        today.checked_sub_days(days)
    } else {
        today.checked_add_days(days)
    };
    shifted.unwrap_or(today)
}

impl SeedClass {
    fn build(&self, today: NaiveDate) -> Option<DrivingClass> {
        let start_time = parse_time(self.start).ok()?;
        Some(
            NewClass {
                student_id: StudentId::from(self.student),
                date: shift(today, self.day_offset),
                start_time,
                duration: ClassDuration::Sixty,
                kind: self.kind,
                status: self.status,
                payment_status: self.payment_status,
                price: self.price,
                payment_method: self.payment_method,
                notes: self.notes.to_string(),
                location: None,
            }
            .into_class(ClassId::from(self.id)),
        )
    }
}

/// Three students and a handful of classes around `today`, for demos and local runs.
pub(crate) fn demo_snapshot(today: NaiveDate) -> Snapshot {
    let students = vec![
        NewStudent {
            first_name: "Lucia".to_string(),
            last_name: "Garcia".to_string(),
            phone: "11 4123 4567".to_string(),
            email: Some("lucia.garcia@example.com".to_string()),
            national_id: Some("12345678A".to_string()),
            status: StudentStatus::Active,
            exam_readiness: ExamReadiness::AlmostReady,
            registration_date: NaiveDate::from_ymd_opt(2023, 9, 1),
            price_per_class: 15000,
            promo_packs: 1,
            notes: "Afternoons only. Wants a manual licence.".to_string(),
            strengths: lines(&["Attention", "Respects signage"]),
            weaknesses: lines(&["Angle parking", "Nervous on motorways"]),
        }
        .into_student(StudentId::from("1")),
        NewStudent {
            first_name: "Marcos".to_string(),
            last_name: "Alonso".to_string(),
            phone: "11 6999 8888".to_string(),
            email: Some("marcos.alonso@example.com".to_string()),
            national_id: Some("87654321B".to_string()),
            status: StudentStatus::Active,
            exam_readiness: ExamReadiness::InProgress,
            registration_date: NaiveDate::from_ymd_opt(2023, 10, 15),
            price_per_class: 18000,
            promo_packs: 0,
            notes: "Mornings preferred. Automatic licence.".to_string(),
            strengths: lines(&["Steering control"]),
            weaknesses: lines(&["Mirror checks", "Following distance"]),
        }
        .into_student(StudentId::from("2")),
        NewStudent {
            first_name: "Ana".to_string(),
            last_name: "Fernandez".to_string(),
            phone: "11 2345 6789".to_string(),
            email: Some("ana.fdez@example.com".to_string()),
            national_id: Some("11223344C".to_string()),
            status: StudentStatus::Finished,
            exam_readiness: ExamReadiness::Ready,
            registration_date: NaiveDate::from_ymd_opt(2023, 8, 1),
            price_per_class: 15000,
            promo_packs: 0,
            notes: "Passed the theory exam on the first try.".to_string(),
            strengths: lines(&["All good"]),
            weaknesses: Vec::new(),
        }
        .into_student(StudentId::from("3")),
    ];

    let classes = [
        SeedClass {
            id: "101",
            student: "1",
            day_offset: 0,
            start: "10:00",
            kind: ClassType::Practice,
            status: ClassStatus::Scheduled,
            payment_status: PaymentStatus::Paid,
            payment_method: Some(PaymentMethod::Cash),
            price: 9000,
            notes: "Practice the exam area.",
        },
        SeedClass {
            id: "102",
            student: "2",
            day_offset: 0,
            start: "11:30",
            kind: ClassType::Practice,
            status: ClassStatus::Completed,
            payment_status: PaymentStatus::Paid,
            payment_method: Some(PaymentMethod::Transfer),
            price: 18000,
            notes: "Turns improving.",
        },
        SeedClass {
            id: "103",
            student: "1",
            day_offset: 1,
            start: "16:00",
            kind: ClassType::ExamSimulation,
            status: ClassStatus::Scheduled,
            payment_status: PaymentStatus::Paid,
            payment_method: Some(PaymentMethod::Cash),
            price: 9000,
            notes: "",
        },
        SeedClass {
            id: "104",
            student: "2",
            day_offset: -1,
            start: "09:00",
            kind: ClassType::Practice,
            status: ClassStatus::Completed,
            payment_status: PaymentStatus::Invoiced,
            payment_method: None,
            price: 18000,
            notes: "",
        },
    ];

    Snapshot::new(
        students,
        classes.iter().filter_map(|seed| seed.build(today)).collect(),
        Vec::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_classes_sit_around_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date");
        let snapshot = demo_snapshot(today);

        assert_eq!(snapshot.students.len(), 3);
        assert_eq!(snapshot.classes.len(), 4);
        let yesterday = snapshot
            .class(&ClassId::from("104"))
            .expect("seeded")
            .date;
        assert_eq!(yesterday, NaiveDate::from_ymd_opt(2024, 2, 29).expect("valid"));
        assert!(snapshot
            .classes
            .iter()
            .all(|class| class.is_paid() == class.payment_method.is_some()));
    }
}
