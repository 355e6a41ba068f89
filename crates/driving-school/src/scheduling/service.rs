use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::info;

use super::calendar::{CalendarBoard, ClassFilter, MonthView, WeekView};
use super::editor::{ClassChanges, ClassDraft, ClassEditor};
use crate::billing::{PricingSuggestion, YearMonth};
use crate::domain::{ClassId, ClassPatch, DrivingClass, StudentId};
use crate::store::{Snapshot, SnapshotSource, StoreCommands, StoreError};
use crate::validation::ValidationError;

/// Class editor wired to the store: validated forms in, store writes out.
pub struct SchedulingService<S> {
    store: Arc<S>,
    editor: ClassEditor,
}

impl<S> SchedulingService<S>
where
    S: SnapshotSource + StoreCommands + 'static,
{
    pub fn new(store: Arc<S>, editor: ClassEditor) -> Self {
        Self { store, editor }
    }

    pub fn editor(&self) -> &ClassEditor {
        &self.editor
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.store.snapshot()
    }

    /// Classes matching the filter, oldest first.
    pub fn list(&self, filter: &ClassFilter) -> Vec<DrivingClass> {
        let snapshot = self.store.snapshot();
        let mut classes: Vec<DrivingClass> = snapshot
            .classes
            .iter()
            .filter(|class| filter.matches(class))
            .cloned()
            .collect();
        classes.sort_by(|a, b| (a.date, a.start_time, &a.id).cmp(&(b.date, b.start_time, &b.id)));
        classes
    }

    pub fn get(&self, id: &ClassId) -> Result<DrivingClass, SchedulingError> {
        self.store
            .snapshot()
            .class(id)
            .cloned()
            .ok_or_else(|| SchedulingError::NotFound(id.clone()))
    }

    pub fn blank(&self, date: NaiveDate, start_time: Option<NaiveTime>) -> ClassDraft {
        self.editor.blank(date, start_time)
    }

    pub fn suggest(&self, student_id: &StudentId, editing: Option<&ClassId>) -> PricingSuggestion {
        self.editor.suggest(&self.store.snapshot(), student_id, editing)
    }

    pub async fn create(&self, draft: ClassDraft) -> Result<ClassId, SchedulingError> {
        let class = self.editor.finalize(draft)?;
        let student_id = class.student_id.clone();
        let id = self.store.add_class(class).await?;
        info!(class_id = %id, student_id = %student_id, "class scheduled");
        Ok(id)
    }

    /// Merges the changes into the stored class and saves the whole form again.
    pub async fn update(&self, id: &ClassId, changes: ClassChanges) -> Result<(), SchedulingError> {
        let current = self.get(id)?;
        let mut draft = ClassDraft::from_class(&current);
        changes.apply_to(&mut draft);
        let class = self.editor.finalize(draft)?;
        self.store.update_class(id, ClassPatch::from(class)).await?;
        info!(class_id = %id, "class updated");
        Ok(())
    }

    pub async fn delete(&self, id: &ClassId) -> Result<(), SchedulingError> {
        self.store.delete_class(id).await?;
        info!(class_id = %id, "class deleted");
        Ok(())
    }

    pub fn week(&self, date: NaiveDate, filter: &ClassFilter) -> WeekView {
        let snapshot = self.store.snapshot();
        CalendarBoard::new(&snapshot, *self.editor.policy()).week(date, filter)
    }

    pub fn month(&self, month: YearMonth, filter: &ClassFilter) -> MonthView {
        let snapshot = self.store.snapshot();
        CalendarBoard::new(&snapshot, *self.editor.policy()).month(month, filter)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("class {0} not found")]
    NotFound(ClassId),
}
