use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::domain::{ClassId, DrivingClass, Payment, PaymentId, Student, StudentId};

/// Immutable view over the three collections as last pushed by the store.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub students: Arc<Vec<Student>>,
    pub classes: Arc<Vec<DrivingClass>>,
    pub payments: Arc<Vec<Payment>>,
}

impl Snapshot {
    pub fn new(students: Vec<Student>, classes: Vec<DrivingClass>, payments: Vec<Payment>) -> Self {
        Self {
            students: Arc::new(students),
            classes: Arc::new(classes),
            payments: Arc::new(payments),
        }
    }

    pub fn student(&self, id: &StudentId) -> Option<&Student> {
        self.students.iter().find(|student| &student.id == id)
    }

    pub fn class(&self, id: &ClassId) -> Option<&DrivingClass> {
        self.classes.iter().find(|class| &class.id == id)
    }

    pub fn payment(&self, id: &PaymentId) -> Option<&Payment> {
        self.payments.iter().find(|payment| &payment.id == id)
    }

    pub fn classes_for<'a>(
        &'a self,
        student_id: &'a StudentId,
    ) -> impl Iterator<Item = &'a DrivingClass> + 'a {
        self.classes
            .iter()
            .filter(move |class| &class.student_id == student_id)
    }

    /// Returns a new snapshot with one collection replaced wholesale.
    pub fn with_push(&self, push: CollectionPush) -> Self {
        let mut next = self.clone();
        match push {
            CollectionPush::Students(students) => next.students = Arc::new(students),
            CollectionPush::Classes(classes) => next.classes = Arc::new(classes),
            CollectionPush::Payments(payments) => next.payments = Arc::new(payments),
        }
        next
    }
}

/// Full replacement of a single collection, as delivered by a live subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionPush {
    Students(Vec<Student>),
    Classes(Vec<DrivingClass>),
    Payments(Vec<Payment>),
}

impl CollectionPush {
    pub const fn collection(&self) -> &'static str {
        match self {
            Self::Students(_) => "students",
            Self::Classes(_) => "classes",
            Self::Payments(_) => "payments",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Students(items) => items.len(),
            Self::Classes(items) => items.len(),
            Self::Payments(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fan-out point shared by the store backends: applies pushes and wakes subscribers.
#[derive(Debug)]
pub struct SnapshotHub {
    sender: watch::Sender<Arc<Snapshot>>,
}

impl Default for SnapshotHub {
    fn default() -> Self {
        Self::new(Snapshot::default())
    }
}

impl SnapshotHub {
    pub fn new(initial: Snapshot) -> Self {
        let (sender, _) = watch::channel(Arc::new(initial));
        Self { sender }
    }

    pub fn current(&self) -> Arc<Snapshot> {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn apply(&self, push: CollectionPush) {
        let collection = push.collection();
        let count = push.len();
        self.sender
            .send_modify(|current| *current = Arc::new(current.with_push(push)));
        debug!(collection, count, "snapshot collection replaced");
    }

    /// Applies a push only when it differs from what the snapshot already holds.
    pub fn apply_if_changed(&self, push: CollectionPush) -> bool {
        let changed = {
            let current = self.sender.borrow();
            match &push {
                CollectionPush::Students(items) => current.students.as_slice() != items.as_slice(),
                CollectionPush::Classes(items) => current.classes.as_slice() != items.as_slice(),
                CollectionPush::Payments(items) => current.payments.as_slice() != items.as_slice(),
            }
        };
        if changed {
            self.apply(push);
        }
        changed
    }
}

/// Live handle on the snapshot. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    receiver: watch::Receiver<Arc<Snapshot>>,
}

impl Subscription {
    pub fn current(&self) -> Arc<Snapshot> {
        self.receiver.borrow().clone()
    }

    /// Waits for the next push. Returns `None` once the store has shut down.
    pub async fn next(&mut self) -> Option<Arc<Snapshot>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExamReadiness, NewStudent, StudentStatus};

    fn student(id: &str, first: &str) -> Student {
        NewStudent {
            first_name: first.to_string(),
            last_name: "Test".to_string(),
            phone: "555".to_string(),
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
        .into_student(StudentId::from(id))
    }

    #[test]
    fn push_replaces_only_its_collection() {
        let hub = SnapshotHub::default();
        hub.apply(CollectionPush::Students(vec![student("a", "Ana")]));
        let before = hub.current();

        hub.apply(CollectionPush::Classes(Vec::new()));
        let after = hub.current();

        assert!(Arc::ptr_eq(&before.students, &after.students));
        assert_eq!(after.students.len(), 1);
    }

    #[test]
    fn find_by_id_returns_none_for_unknown() {
        let snapshot = Snapshot::new(vec![student("a", "Ana")], Vec::new(), Vec::new());
        assert!(snapshot.student(&StudentId::from("a")).is_some());
        assert!(snapshot.student(&StudentId::from("missing")).is_none());
    }

    #[test]
    fn unchanged_push_is_skipped() {
        let hub = SnapshotHub::default();
        assert!(hub.apply_if_changed(CollectionPush::Students(vec![student("a", "Ana")])));
        assert!(!hub.apply_if_changed(CollectionPush::Students(vec![student("a", "Ana")])));
    }

    #[tokio::test]
    async fn subscribers_observe_pushes() {
        let hub = SnapshotHub::default();
        let mut subscription = hub.subscribe();

        hub.apply(CollectionPush::Students(vec![student("a", "Ana")]));

        let snapshot = subscription.next().await.expect("push delivered");
        assert_eq!(snapshot.students[0].first_name, "Ana");
    }

    #[tokio::test]
    async fn subscription_ends_when_hub_is_dropped() {
        let hub = SnapshotHub::default();
        let mut subscription = hub.subscribe();
        drop(hub);
        assert!(subscription.next().await.is_none());
    }
}
