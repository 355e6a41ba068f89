use std::sync::Arc;

use async_trait::async_trait;

use super::{
    FirestoreStore, MemoryStore, Snapshot, SnapshotSource, StoreCommands, StoreResult,
    Subscription,
};
use crate::config::StoreConfig;
use crate::domain::{
    ClassId, ClassPatch, NewClass, NewPayment, NewStudent, PaymentId, StudentId, StudentPatch,
};

/// The configured store, dispatched statically.
#[derive(Debug)]
pub enum StoreBackend {
    Memory(MemoryStore),
    Firestore(FirestoreStore),
}

impl StoreBackend {
    pub async fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        match config {
            StoreConfig::Memory => Ok(Self::Memory(MemoryStore::new())),
            StoreConfig::Firestore(settings) => {
                FirestoreStore::connect(settings.clone()).await.map(Self::Firestore)
            }
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Firestore(_) => "firestore",
        }
    }
}

impl From<MemoryStore> for StoreBackend {
    fn from(store: MemoryStore) -> Self {
        Self::Memory(store)
    }
}

macro_rules! dispatch {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            StoreBackend::Memory($store) => $call,
            StoreBackend::Firestore($store) => $call,
        }
    };
}

impl SnapshotSource for StoreBackend {
    fn snapshot(&self) -> Arc<Snapshot> {
        dispatch!(self, store => store.snapshot())
    }

    fn subscribe(&self) -> Subscription {
        dispatch!(self, store => store.subscribe())
    }
}

#[async_trait]
impl StoreCommands for StoreBackend {
    async fn add_student(&self, student: NewStudent) -> StoreResult<StudentId> {
        dispatch!(self, store => store.add_student(student).await)
    }

    async fn update_student(&self, id: &StudentId, patch: StudentPatch) -> StoreResult<()> {
        dispatch!(self, store => store.update_student(id, patch).await)
    }

    async fn delete_student(&self, id: &StudentId) -> StoreResult<()> {
        dispatch!(self, store => store.delete_student(id).await)
    }

    async fn add_class(&self, class: NewClass) -> StoreResult<ClassId> {
        dispatch!(self, store => store.add_class(class).await)
    }

    async fn update_class(&self, id: &ClassId, patch: ClassPatch) -> StoreResult<()> {
        dispatch!(self, store => store.update_class(id, patch).await)
    }

    async fn delete_class(&self, id: &ClassId) -> StoreResult<()> {
        dispatch!(self, store => store.delete_class(id).await)
    }

    async fn add_payment(&self, payment: NewPayment) -> StoreResult<PaymentId> {
        dispatch!(self, store => store.add_payment(payment).await)
    }

    async fn delete_payment(&self, id: &PaymentId) -> StoreResult<()> {
        dispatch!(self, store => store.delete_payment(id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_config_builds_an_empty_store() {
        let backend = StoreBackend::from_config(&StoreConfig::Memory)
            .await
            .expect("memory store");
        assert_eq!(backend.kind(), "memory");
        assert!(backend.snapshot().students.is_empty());
    }
}
