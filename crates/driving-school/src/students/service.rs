use std::sync::Arc;

use chrono::Local;
use tracing::info;

use super::directory::{Directory, StudentProfile, StudentRow};
use super::editor::{StudentChanges, StudentForm};
use crate::billing::PromoPolicy;
use crate::domain::{Student, StudentId, StudentPatch};
use crate::store::{SnapshotSource, StoreCommands, StoreError};
use crate::validation::ValidationError;

pub struct StudentService<S> {
    store: Arc<S>,
    policy: PromoPolicy,
}

impl<S> StudentService<S>
where
    S: SnapshotSource + StoreCommands + 'static,
{
    pub fn new(store: Arc<S>, policy: PromoPolicy) -> Self {
        Self { store, policy }
    }

    pub fn list(&self, query: &str) -> Vec<StudentRow> {
        let snapshot = self.store.snapshot();
        Directory::new(&snapshot, self.policy).rows(query)
    }

    pub fn get(&self, id: &StudentId) -> Result<Student, StudentServiceError> {
        self.store
            .snapshot()
            .student(id)
            .cloned()
            .ok_or_else(|| StudentServiceError::NotFound(id.clone()))
    }

    pub fn profile(&self, id: &StudentId) -> Result<StudentProfile, StudentServiceError> {
        let snapshot = self.store.snapshot();
        Directory::new(&snapshot, self.policy)
            .profile(id)
            .ok_or_else(|| StudentServiceError::NotFound(id.clone()))
    }

    pub async fn create(&self, form: StudentForm) -> Result<StudentId, StudentServiceError> {
        let student = form.finalize(Local::now().date_naive())?;
        let id = self.store.add_student(student).await?;
        info!(student_id = %id, "student registered");
        Ok(id)
    }

    pub async fn update(
        &self,
        id: &StudentId,
        changes: StudentChanges,
    ) -> Result<(), StudentServiceError> {
        let current = self.get(id)?;
        let mut form = StudentForm::from_student(&current);
        changes.apply_to(&mut form);
        let student = form.finalize(Local::now().date_naive())?;
        self.store
            .update_student(id, StudentPatch::from(student))
            .await?;
        info!(student_id = %id, "student updated");
        Ok(())
    }

    /// Classes referencing the student are left in place.
    pub async fn delete(&self, id: &StudentId) -> Result<(), StudentServiceError> {
        self.store.delete_student(id).await?;
        info!(student_id = %id, "student deleted");
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StudentServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("student {0} not found")]
    NotFound(StudentId),
}
