use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::info;

use super::document::{CLASSES, STUDENTS};
use super::{
    CollectionPush, Snapshot, SnapshotHub, SnapshotSource, StoreCommands, StoreError,
    StoreResult, Subscription,
};
use crate::domain::{
    ClassId, ClassPatch, DrivingClass, NewClass, NewPayment, NewStudent, Payment, PaymentId,
    Student, StudentId, StudentPatch,
};

static STUDENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static CLASS_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static PAYMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_id(prefix: &str, sequence: &AtomicU64, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let n = sequence.fetch_add(1, Ordering::Relaxed);
        let candidate = format!("{prefix}-{n:06}");
        if !taken(&candidate) {
            return candidate;
        }
    }
}

#[derive(Debug, Default)]
struct Collections {
    students: Vec<Student>,
    classes: Vec<DrivingClass>,
    payments: Vec<Payment>,
}

/// Process-local store. Every successful write pushes the affected collection,
/// mirroring what the hosted store delivers to its live listeners.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
    hub: Arc<SnapshotHub>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from pre-existing records, kept in the given order.
    pub fn with_records(
        students: Vec<Student>,
        classes: Vec<DrivingClass>,
        payments: Vec<Payment>,
    ) -> Self {
        let hub = SnapshotHub::new(Snapshot::new(
            students.clone(),
            classes.clone(),
            payments.clone(),
        ));
        info!(
            students = students.len(),
            classes = classes.len(),
            payments = payments.len(),
            "memory store loaded"
        );
        Self {
            collections: Mutex::new(Collections {
                students,
                classes,
                payments,
            }),
            hub: Arc::new(hub),
        }
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self::with_records(
            snapshot.students.to_vec(),
            snapshot.classes.to_vec(),
            snapshot.payments.to_vec(),
        )
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Collections>> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl SnapshotSource for MemoryStore {
    fn snapshot(&self) -> Arc<Snapshot> {
        self.hub.current()
    }

    fn subscribe(&self) -> Subscription {
        self.hub.subscribe()
    }
}

#[async_trait]
impl StoreCommands for MemoryStore {
    async fn add_student(&self, student: NewStudent) -> StoreResult<StudentId> {
        let mut guard = self.lock()?;
        let id = StudentId::new(next_id("stu", &STUDENT_SEQUENCE, |candidate| {
            guard.students.iter().any(|s| s.id.as_str() == candidate)
        }));
        guard.students.push(student.into_student(id.clone()));
        self.hub
            .apply(CollectionPush::Students(guard.students.clone()));
        Ok(id)
    }

    async fn update_student(&self, id: &StudentId, patch: StudentPatch) -> StoreResult<()> {
        let mut guard = self.lock()?;
        let student = guard
            .students
            .iter_mut()
            .find(|student| &student.id == id)
            .ok_or_else(|| StoreError::not_found(STUDENTS, id))?;
        patch.apply(student);
        self.hub
            .apply(CollectionPush::Students(guard.students.clone()));
        Ok(())
    }

    async fn delete_student(&self, id: &StudentId) -> StoreResult<()> {
        let mut guard = self.lock()?;
        let before = guard.students.len();
        guard.students.retain(|student| &student.id != id);
        if guard.students.len() != before {
            self.hub
                .apply(CollectionPush::Students(guard.students.clone()));
        }
        Ok(())
    }

    async fn add_class(&self, class: NewClass) -> StoreResult<ClassId> {
        let mut guard = self.lock()?;
        let id = ClassId::new(next_id("cls", &CLASS_SEQUENCE, |candidate| {
            guard.classes.iter().any(|c| c.id.as_str() == candidate)
        }));
        guard.classes.push(class.into_class(id.clone()));
        self.hub.apply(CollectionPush::Classes(guard.classes.clone()));
        Ok(id)
    }

    async fn update_class(&self, id: &ClassId, patch: ClassPatch) -> StoreResult<()> {
        let mut guard = self.lock()?;
        let class = guard
            .classes
            .iter_mut()
            .find(|class| &class.id == id)
            .ok_or_else(|| StoreError::not_found(CLASSES, id))?;
        patch.apply(class);
        self.hub.apply(CollectionPush::Classes(guard.classes.clone()));
        Ok(())
    }

    async fn delete_class(&self, id: &ClassId) -> StoreResult<()> {
        let mut guard = self.lock()?;
        let before = guard.classes.len();
        guard.classes.retain(|class| &class.id != id);
        if guard.classes.len() != before {
            self.hub.apply(CollectionPush::Classes(guard.classes.clone()));
        }
        Ok(())
    }

    async fn add_payment(&self, payment: NewPayment) -> StoreResult<PaymentId> {
        let mut guard = self.lock()?;
        let id = PaymentId::new(next_id("pay", &PAYMENT_SEQUENCE, |candidate| {
            guard.payments.iter().any(|p| p.id.as_str() == candidate)
        }));
        guard.payments.push(payment.into_payment(id.clone()));
        self.hub
            .apply(CollectionPush::Payments(guard.payments.clone()));
        Ok(id)
    }

    async fn delete_payment(&self, id: &PaymentId) -> StoreResult<()> {
        let mut guard = self.lock()?;
        let before = guard.payments.len();
        guard.payments.retain(|payment| &payment.id != id);
        if guard.payments.len() != before {
            self.hub
                .apply(CollectionPush::Payments(guard.payments.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::time::parse_time;
    use crate::domain::{
        ClassDuration, ClassStatus, ClassType, ExamReadiness, LedgerMethod, PaymentMethod,
        PaymentStatus, StudentStatus,
    };
    use chrono::NaiveDate;

    fn new_student(first: &str) -> NewStudent {
        NewStudent {
            first_name: first.to_string(),
            last_name: "Garcia".to_string(),
            phone: "600".to_string(),
            email: None,
            national_id: None,
            status: StudentStatus::Active,
            exam_readiness: ExamReadiness::No,
            registration_date: None,
            price_per_class: 15000,
            promo_packs: 0,
            notes: String::new(),
            strengths: Vec::new(),
            weaknesses: Vec::new(),
        }
    }

    fn paid_class(student_id: StudentId) -> NewClass {
        NewClass {
            student_id,
            date: NaiveDate::from_ymd_opt(2024, 3, 4).expect("valid"),
            start_time: parse_time("10:00").expect("valid"),
            duration: ClassDuration::Sixty,
            kind: ClassType::Practice,
            status: ClassStatus::Completed,
            payment_status: PaymentStatus::Paid,
            price: 15000,
            payment_method: Some(PaymentMethod::Transfer),
            notes: String::new(),
            location: None,
        }
    }

    #[tokio::test]
    async fn add_assigns_fresh_ids_and_pushes() {
        let store = MemoryStore::new();
        let mut subscription = store.subscribe();

        let first = store.add_student(new_student("Lucia")).await.expect("added");
        let second = store.add_student(new_student("Marta")).await.expect("added");

        assert_ne!(first, second);
        let snapshot = subscription.next().await.expect("pushed");
        assert!(snapshot.student(&second).is_some());
        assert_eq!(store.snapshot().students.len(), 2);
    }

    #[tokio::test]
    async fn update_unknown_class_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_class(&ClassId::from("missing"), ClassPatch::default())
            .await
            .expect_err("unknown id");
        assert!(matches!(err, StoreError::NotFound { collection: "classes", .. }));
    }

    #[tokio::test]
    async fn merged_update_drops_method_when_no_longer_paid() {
        let store = MemoryStore::new();
        let student = store.add_student(new_student("Lucia")).await.expect("added");
        let class_id = store.add_class(paid_class(student)).await.expect("added");

        store
            .update_class(
                &class_id,
                ClassPatch {
                    payment_status: Some(PaymentStatus::Pending),
                    ..ClassPatch::default()
                },
            )
            .await
            .expect("updated");

        let snapshot = store.snapshot();
        let class = snapshot.class(&class_id).expect("present");
        assert_eq!(class.payment_method, None);
    }

    #[tokio::test]
    async fn deleting_a_student_keeps_their_classes() {
        let store = MemoryStore::new();
        let student = store.add_student(new_student("Lucia")).await.expect("added");
        store
            .add_class(paid_class(student.clone()))
            .await
            .expect("added");

        store.delete_student(&student).await.expect("deleted");
        store.delete_student(&student).await.expect("idempotent");

        let snapshot = store.snapshot();
        assert!(snapshot.students.is_empty());
        assert_eq!(snapshot.classes.len(), 1);
    }

    #[tokio::test]
    async fn payments_are_added_and_removed() {
        let store = MemoryStore::new();
        let id = store
            .add_payment(NewPayment {
                student_id: StudentId::from("stu-x"),
                amount: 9000,
                date: NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid"),
                method: LedgerMethod::Card,
                concept: "Promo pack".to_string(),
            })
            .await
            .expect("added");

        assert!(store.snapshot().payment(&id).is_some());
        store.delete_payment(&id).await.expect("deleted");
        assert!(store.snapshot().payments.is_empty());
    }
}
