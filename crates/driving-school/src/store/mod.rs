//! Live snapshots of the external collections plus write-through commands.
//!
//! Reads and writes are split: [`SnapshotSource`] hands out immutable snapshots
//! and subscriptions, [`StoreCommands`] forwards mutations to the backing store.
//! A snapshot only changes when the store pushes a collection, never as a side
//! effect of a write call returning.

mod backend;
pub mod document;
pub mod firestore;
mod memory;
mod snapshot;

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    ClassId, ClassPatch, NewClass, NewPayment, NewStudent, PaymentId, StudentId, StudentPatch,
};

pub use backend::StoreBackend;
pub use document::DecodeError;
pub use firestore::{FirestoreSettings, FirestoreStore};
pub use memory::MemoryStore;
pub use snapshot::{CollectionPush, Snapshot, SnapshotHub, Subscription};

/// Read side of the store.
pub trait SnapshotSource: Send + Sync {
    fn snapshot(&self) -> Arc<Snapshot>;
    fn subscribe(&self) -> Subscription;
}

/// Write side of the store. Deletes never cascade.
#[async_trait]
pub trait StoreCommands: Send + Sync {
    async fn add_student(&self, student: NewStudent) -> StoreResult<StudentId>;
    async fn update_student(&self, id: &StudentId, patch: StudentPatch) -> StoreResult<()>;
    async fn delete_student(&self, id: &StudentId) -> StoreResult<()>;

    async fn add_class(&self, class: NewClass) -> StoreResult<ClassId>;
    async fn update_class(&self, id: &ClassId, patch: ClassPatch) -> StoreResult<()>;
    async fn delete_class(&self, id: &ClassId) -> StoreResult<()>;

    async fn add_payment(&self, payment: NewPayment) -> StoreResult<PaymentId>;
    async fn delete_payment(&self, id: &PaymentId) -> StoreResult<()>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{collection}/{id} not found")]
    NotFound { collection: &'static str, id: String },
    #[error("store rejected the request: {0}")]
    Rejected(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl StoreError {
    pub(crate) fn not_found(collection: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            collection,
            id: id.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
