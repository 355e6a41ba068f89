use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::domain::time::parse_time;
use crate::domain::{
    Amount, ClassDuration, ClassId, ClassPatch, ClassStatus, ClassType, DrivingClass,
    ExamReadiness, NewClass, NewPayment, NewStudent, PaymentId, PaymentMethod, PaymentStatus,
    Student, StudentId, StudentPatch, StudentStatus,
};
use crate::scheduling::{ClassEditor, SchedulingService};
use crate::store::{
    MemoryStore, Snapshot, SnapshotHub, SnapshotSource, StoreCommands, StoreError, StoreResult,
    Subscription,
};

pub(super) fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid date")
}

pub(super) fn student(id: &str, first: &str, last: &str, promo_packs: u32) -> Student {
    NewStudent {
        first_name: first.to_string(),
        last_name: last.to_string(),
        phone: "11 4123 4567".to_string(),
        email: None,
        national_id: None,
        status: StudentStatus::Active,
        exam_readiness: ExamReadiness::InProgress,
        registration_date: None,
        price_per_class: 15000,
        promo_packs,
        notes: String::new(),
        strengths: Vec::new(),
        weaknesses: Vec::new(),
    }
    .into_student(StudentId::from(id))
}

pub(super) fn class(id: &str, student_id: &str, day: &str, start: &str) -> DrivingClass {
    NewClass {
        student_id: StudentId::from(student_id),
        date: date(day),
        start_time: parse_time(start).expect("valid time"),
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

pub(super) fn paid(mut class: DrivingClass, price: Amount, method: PaymentMethod) -> DrivingClass {
    class.status = ClassStatus::Completed;
    class.payment_status = PaymentStatus::Paid;
    class.payment_method = Some(method);
    class.price = price;
    class
}

/// Lucia holds one promo pack and two booked classes; Marcos has none.
pub(super) fn roster() -> (Vec<Student>, Vec<DrivingClass>) {
    let students = vec![
        student("lucia", "Lucia", "Garcia", 1),
        student("marcos", "Marcos", "Alonso", 0),
    ];
    let classes = vec![
        class("c-1", "lucia", "2024-03-04", "10:00"),
        class("c-2", "lucia", "2024-03-05", "16:00"),
        paid(
            class("c-3", "marcos", "2024-03-04", "11:30"),
            18000,
            PaymentMethod::Transfer,
        ),
    ];
    (students, classes)
}

pub(super) fn memory_store() -> Arc<MemoryStore> {
    let (students, classes) = roster();
    Arc::new(MemoryStore::with_records(students, classes, Vec::new()))
}

pub(super) fn build_service() -> (Arc<SchedulingService<MemoryStore>>, Arc<MemoryStore>) {
    let store = memory_store();
    let service = Arc::new(SchedulingService::new(
        Arc::clone(&store),
        ClassEditor::default(),
    ));
    (service, store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("body readable");
    serde_json::from_slice(&body).expect("json body")
}

/// Serves a fixed snapshot and refuses every write.
pub(super) struct RejectingStore {
    hub: SnapshotHub,
}

impl RejectingStore {
    pub(super) fn new() -> Self {
        let (students, classes) = roster();
        Self {
            hub: SnapshotHub::new(Snapshot::new(students, classes, Vec::new())),
        }
    }

    fn denied<T>() -> StoreResult<T> {
        Err(StoreError::Rejected("permission denied".to_string()))
    }
}

impl SnapshotSource for RejectingStore {
    fn snapshot(&self) -> Arc<Snapshot> {
        self.hub.current()
    }

    fn subscribe(&self) -> Subscription {
        self.hub.subscribe()
    }
}

#[async_trait]
impl StoreCommands for RejectingStore {
    async fn add_student(&self, _student: NewStudent) -> StoreResult<StudentId> {
        Self::denied()
    }

    async fn update_student(&self, _id: &StudentId, _patch: StudentPatch) -> StoreResult<()> {
        Self::denied()
    }

    async fn delete_student(&self, _id: &StudentId) -> StoreResult<()> {
        Self::denied()
    }

    async fn add_class(&self, _class: NewClass) -> StoreResult<ClassId> {
        Self::denied()
    }

    async fn update_class(&self, _id: &ClassId, _patch: ClassPatch) -> StoreResult<()> {
        Self::denied()
    }

    async fn delete_class(&self, _id: &ClassId) -> StoreResult<()> {
        Self::denied()
    }

    async fn add_payment(&self, _payment: NewPayment) -> StoreResult<PaymentId> {
        Self::denied()
    }

    async fn delete_payment(&self, _id: &PaymentId) -> StoreResult<()> {
        Self::denied()
    }
}
