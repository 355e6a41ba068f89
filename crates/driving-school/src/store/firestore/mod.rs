//! Hosted document store reached through the Firestore REST API.
//!
//! The REST surface has no push channel, so live subscriptions are emulated by
//! a poller that re-lists each collection and pushes it when it changed. Writes
//! refresh the affected collection right away.

mod value;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::document::{
    self, decode_class, decode_payment, decode_student, encode_class, encode_payment,
    encode_student, field_paths, CLASSES, PAYMENTS, STUDENTS,
};
use super::{
    CollectionPush, Snapshot, SnapshotHub, SnapshotSource, StoreCommands, StoreError,
    StoreResult, Subscription,
};
use crate::domain::{
    ClassId, ClassPatch, NewClass, NewPayment, NewStudent, PaymentId, StudentId, StudentPatch,
};

pub use value::ValueError;

pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";
const PAGE_SIZE: &str = "300";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirestoreSettings {
    pub project_id: String,
    pub api_key: Option<String>,
    /// Bearer token of the signed-in user, forwarded to the security rules.
    pub id_token: Option<String>,
    pub base_url: String,
    pub poll_interval: Duration,
}

impl FirestoreSettings {
    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            collection
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.collection_url(collection), id)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<RemoteDocument>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoteDocument {
    name: String,
    #[serde(default)]
    fields: Value,
}

impl RemoteDocument {
    fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }

    fn plain_fields(&self) -> Result<Value, ValueError> {
        if self.fields.is_null() {
            return Ok(Value::Object(Map::new()));
        }
        value::decode_fields(&self.fields)
    }
}

struct Remote {
    client: Client,
    settings: FirestoreSettings,
    hub: SnapshotHub,
}

impl Remote {
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = match &self.settings.api_key {
            Some(key) => request.query(&[("key", key)]),
            None => request,
        };
        match &self.settings.id_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, target: &str) -> StoreResult<Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                StoreError::Rejected(format!("{target}: {status} {body}"))
            }
            StatusCode::NOT_FOUND => StoreError::NotFound {
                collection: "document",
                id: target.to_string(),
            },
            _ => StoreError::Unavailable(format!("{target}: {status} {body}")),
        })
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<RemoteDocument>> {
        let url = self.settings.collection_url(collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client.get(&url).query(&[("pageSize", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }
            let page: ListResponse = self
                .send(request, collection)
                .await?
                .json()
                .await
                .map_err(|err| StoreError::Unavailable(err.to_string()))?;
            documents.extend(page.documents);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(documents)
    }

    async fn fetch(&self, collection: &'static str, id: &str) -> StoreResult<Value> {
        let url = self.settings.document_url(collection, id);
        let document: RemoteDocument = self
            .send(self.client.get(&url), &format!("{collection}/{id}"))
            .await
            .map_err(|err| match err {
                StoreError::NotFound { .. } => StoreError::not_found(collection, id),
                other => other,
            })?
            .json()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        document
            .plain_fields()
            .map_err(|err| StoreError::Unavailable(format!("{collection}/{id}: {err}")))
    }

    async fn create(&self, collection: &'static str, fields: &Map<String, Value>) -> StoreResult<String> {
        let url = self.settings.collection_url(collection);
        let body = json!({ "fields": value::encode_fields(fields) });
        let created: RemoteDocument = self
            .send(self.client.post(&url).json(&body), collection)
            .await?
            .json()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(created.id().to_string())
    }

    /// Replaces every known field. Fields absent from `fields` are removed
    /// because they are still listed in the update mask.
    async fn overwrite(
        &self,
        collection: &'static str,
        id: &str,
        fields: &Map<String, Value>,
    ) -> StoreResult<()> {
        let url = self.settings.document_url(collection, id);
        let mut query: Vec<(&str, &str)> = field_paths(collection)
            .iter()
            .map(|path| ("updateMask.fieldPaths", *path))
            .collect();
        query.push(("currentDocument.exists", "true"));

        let body = json!({ "fields": value::encode_fields(fields) });
        self.send(
            self.client.patch(&url).query(&query).json(&body),
            &format!("{collection}/{id}"),
        )
        .await
        .map_err(|err| match err {
            StoreError::NotFound { .. } => StoreError::not_found(collection, id),
            other => other,
        })?;
        Ok(())
    }

    async fn remove(&self, collection: &'static str, id: &str) -> StoreResult<()> {
        let url = self.settings.document_url(collection, id);
        self.send(self.client.delete(&url), &format!("{collection}/{id}"))
            .await?;
        Ok(())
    }

    /// Lists one collection and pushes it when it differs from the snapshot.
    async fn refresh(&self, collection: &'static str) -> StoreResult<bool> {
        let documents = self.list(collection).await?;
        let push = match collection {
            STUDENTS => CollectionPush::Students(decode_all(collection, documents, decode_student)),
            CLASSES => CollectionPush::Classes(decode_all(collection, documents, decode_class)),
            _ => CollectionPush::Payments(decode_all(collection, documents, decode_payment)),
        };
        Ok(self.hub.apply_if_changed(push))
    }

    async fn refresh_all(&self) -> StoreResult<()> {
        for collection in [STUDENTS, CLASSES, PAYMENTS] {
            self.refresh(collection).await?;
        }
        Ok(())
    }

    async fn refresh_after_write(&self, collection: &'static str) {
        if let Err(err) = self.refresh(collection).await {
            warn!(collection, error = %err, "refresh after write failed; poller will catch up");
        }
    }
}

fn decode_all<T>(
    collection: &'static str,
    documents: Vec<RemoteDocument>,
    decode: impl Fn(&str, Value) -> Result<T, document::DecodeError>,
) -> Vec<T> {
    documents
        .into_iter()
        .filter_map(|remote| {
            let id = remote.id().to_string();
            let decoded = remote
                .plain_fields()
                .map_err(|err| err.to_string())
                .and_then(|fields| decode(&id, fields).map_err(|err| err.to_string()));
            match decoded {
                Ok(item) => Some(item),
                Err(reason) => {
                    warn!(collection, id = %id, %reason, "skipping undecodable document");
                    None
                }
            }
        })
        .collect()
}

async fn poll(remote: Arc<Remote>) {
    let mut ticker = tokio::time::interval(remote.settings.poll_interval);
    // The first tick fires immediately and the initial load already ran.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        for collection in [STUDENTS, CLASSES, PAYMENTS] {
            match remote.refresh(collection).await {
                Ok(true) => debug!(collection, "remote change detected"),
                Ok(false) => {}
                Err(err) => warn!(collection, error = %err, "collection poll failed"),
            }
        }
    }
}

/// Store backed by Firestore. Dropping it stops the poller.
pub struct FirestoreStore {
    remote: Arc<Remote>,
    poller: JoinHandle<()>,
}

impl std::fmt::Debug for FirestoreStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreStore")
            .field("project_id", &self.remote.settings.project_id)
            .field("base_url", &self.remote.settings.base_url)
            .finish()
    }
}

impl FirestoreStore {
    /// Loads the three collections, then starts polling. Must run inside a tokio runtime.
    pub async fn connect(settings: FirestoreSettings) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        let remote = Arc::new(Remote {
            client,
            settings,
            hub: SnapshotHub::default(),
        });
        remote.refresh_all().await?;

        let snapshot = remote.hub.current();
        info!(
            project = %remote.settings.project_id,
            students = snapshot.students.len(),
            classes = snapshot.classes.len(),
            payments = snapshot.payments.len(),
            poll_secs = remote.settings.poll_interval.as_secs(),
            "firestore store connected"
        );

        let poller = tokio::spawn(poll(Arc::clone(&remote)));
        Ok(Self { remote, poller })
    }
}

impl Drop for FirestoreStore {
    fn drop(&mut self) {
        self.poller.abort();
    }
}

impl SnapshotSource for FirestoreStore {
    fn snapshot(&self) -> Arc<Snapshot> {
        self.remote.hub.current()
    }

    fn subscribe(&self) -> Subscription {
        self.remote.hub.subscribe()
    }
}

#[async_trait]
impl StoreCommands for FirestoreStore {
    async fn add_student(&self, student: NewStudent) -> StoreResult<StudentId> {
        let fields = encode_student(&student.into_student(StudentId::new("")));
        let id = self.remote.create(STUDENTS, &fields).await?;
        self.remote.refresh_after_write(STUDENTS).await;
        Ok(StudentId::new(id))
    }

    async fn update_student(&self, id: &StudentId, patch: StudentPatch) -> StoreResult<()> {
        let current = self.remote.fetch(STUDENTS, id.as_str()).await?;
        let mut student = decode_student(id.as_str(), current)?;
        patch.apply(&mut student);
        self.remote
            .overwrite(STUDENTS, id.as_str(), &encode_student(&student))
            .await?;
        self.remote.refresh_after_write(STUDENTS).await;
        Ok(())
    }

    async fn delete_student(&self, id: &StudentId) -> StoreResult<()> {
        self.remote.remove(STUDENTS, id.as_str()).await?;
        self.remote.refresh_after_write(STUDENTS).await;
        Ok(())
    }

    async fn add_class(&self, class: NewClass) -> StoreResult<ClassId> {
        let fields = encode_class(&class.into_class(ClassId::new("")));
        let id = self.remote.create(CLASSES, &fields).await?;
        self.remote.refresh_after_write(CLASSES).await;
        Ok(ClassId::new(id))
    }

    async fn update_class(&self, id: &ClassId, patch: ClassPatch) -> StoreResult<()> {
        let current = self.remote.fetch(CLASSES, id.as_str()).await?;
        let mut class = decode_class(id.as_str(), current)?;
        patch.apply(&mut class);
        self.remote
            .overwrite(CLASSES, id.as_str(), &encode_class(&class))
            .await?;
        self.remote.refresh_after_write(CLASSES).await;
        Ok(())
    }

    async fn delete_class(&self, id: &ClassId) -> StoreResult<()> {
        self.remote.remove(CLASSES, id.as_str()).await?;
        self.remote.refresh_after_write(CLASSES).await;
        Ok(())
    }

    async fn add_payment(&self, payment: NewPayment) -> StoreResult<PaymentId> {
        let fields = encode_payment(&payment.into_payment(PaymentId::new("")));
        let id = self.remote.create(PAYMENTS, &fields).await?;
        self.remote.refresh_after_write(PAYMENTS).await;
        Ok(PaymentId::new(id))
    }

    async fn delete_payment(&self, id: &PaymentId) -> StoreResult<()> {
        self.remote.remove(PAYMENTS, id.as_str()).await?;
        self.remote.refresh_after_write(PAYMENTS).await;
        Ok(())
    }
}
