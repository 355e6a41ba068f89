use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use driving_school::billing::Period;
use driving_school::config::StoreConfig;
use driving_school::error::AppError;
use driving_school::report::ReportFormat;
use driving_school::store::document::{decode_class, decode_payment, decode_student, KeyedDocument};
use driving_school::store::{MemoryStore, Snapshot, StoreBackend, StoreError};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::seed::demo_snapshot;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// On-disk export of the three collections, each document carrying its key.
#[derive(Debug, Default, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    students: Vec<KeyedDocument>,
    #[serde(default)]
    classes: Vec<KeyedDocument>,
    #[serde(default)]
    payments: Vec<KeyedDocument>,
}

pub(crate) fn read_snapshot<R: Read>(reader: R) -> Result<Snapshot, AppError> {
    let file: SnapshotFile = serde_json::from_reader(reader)?;
    let students = file
        .students
        .into_iter()
        .map(|doc| decode_student(&doc.id, Value::Object(doc.fields)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::from)?;
    let classes = file
        .classes
        .into_iter()
        .map(|doc| decode_class(&doc.id, Value::Object(doc.fields)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::from)?;
    let payments = file
        .payments
        .into_iter()
        .map(|doc| decode_payment(&doc.id, Value::Object(doc.fields)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::from)?;
    Ok(Snapshot::new(students, classes, payments))
}

pub(crate) fn load_snapshot_file(path: &Path) -> Result<Snapshot, AppError> {
    let file = File::open(path)?;
    let snapshot = read_snapshot(BufReader::new(file))?;
    info!(
        path = %path.display(),
        students = snapshot.students.len(),
        classes = snapshot.classes.len(),
        "snapshot file loaded"
    );
    Ok(snapshot)
}

/// Connects the configured store. `seed` preloads the demo roster into a memory store.
pub(crate) async fn open_store(config: &StoreConfig, seed: bool) -> Result<StoreBackend, AppError> {
    match (config, seed) {
        (StoreConfig::Memory, true) => {
            let snapshot = demo_snapshot(today());
            Ok(StoreBackend::from(MemoryStore::from_snapshot(&snapshot)))
        }
        (StoreConfig::Firestore(_), true) => {
            warn!("--seed only applies to the memory store; ignoring");
            Ok(StoreBackend::from_config(config).await?)
        }
        (_, false) => Ok(StoreBackend::from_config(config).await?),
    }
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn parse_period(raw: &str) -> Result<Period, String> {
    raw.parse().map_err(|err| format!("{err}"))
}

pub(crate) fn parse_format(raw: &str) -> Result<ReportFormat, String> {
    raw.parse()
}
