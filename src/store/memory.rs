use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::store::adapter::{BatchWrite, Document, OrderBy, RemoteStore, StoreError};
use crate::store::path::{CollectionPath, DocumentPath};

/// In-memory `RemoteStore`.
///
/// Backs the test suite and local development. Collections are keyed by
/// their full path string; each holds documents keyed by id. Fault and
/// latency injection let tests exercise timeout and partial-failure
/// behavior without a real backend.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, BTreeMap<String, serde_json::Value>>>,
    /// Collections (by path substring) whose reads fail.
    failing_paths: Mutex<Vec<String>>,
    /// Artificial delay applied to every call.
    latency: Mutex<Option<Duration>>,
    commit_count: AtomicUsize,
    commit_sizes: Mutex<Vec<usize>>,
    /// Commits after this many successful ones fail. `usize::MAX` = never.
    fail_commits_after: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            fail_commits_after: AtomicUsize::new(usize::MAX),
            ..Self::default()
        }
    }

    /// Make every read touching a path containing `fragment` fail.
    pub fn fail_reads_matching(&self, fragment: impl Into<String>) {
        self.failing_paths.lock().unwrap().push(fragment.into());
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    /// Let the first `n` commits succeed, fail the rest.
    pub fn fail_commits_after(&self, n: usize) {
        self.fail_commits_after.store(n, Ordering::SeqCst);
    }

    pub fn commit_count(&self) -> usize {
        self.commit_count.load(Ordering::SeqCst)
    }

    pub fn commit_sizes(&self) -> Vec<usize> {
        self.commit_sizes.lock().unwrap().clone()
    }

    /// Number of documents currently stored in a collection.
    pub fn document_count(&self, collection: &CollectionPath) -> usize {
        self.collections
            .lock()
            .unwrap()
            .get(collection.as_str())
            .map(|c| c.len())
            .unwrap_or(0)
    }

    /// Seed a document directly, bypassing the engine's write path.
    pub fn insert_document(&self, doc: &DocumentPath, fields: serde_json::Value) {
        let (collection, id) = split_doc_path(doc.as_str());
        self.collections
            .lock()
            .unwrap()
            .entry(collection)
            .or_default()
            .insert(id, fields);
    }

    pub fn get_document(&self, doc: &DocumentPath) -> Option<serde_json::Value> {
        let (collection, id) = split_doc_path(doc.as_str());
        self.collections
            .lock()
            .unwrap()
            .get(&collection)
            .and_then(|c| c.get(&id).cloned())
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn check_read(&self, path: &str) -> Result<(), StoreError> {
        let failing = self.failing_paths.lock().unwrap();
        if failing.iter().any(|fragment| path.contains(fragment.as_str())) {
            return Err(StoreError::Unavailable(format!("injected failure: {}", path)));
        }
        Ok(())
    }
}

fn split_doc_path(path: &str) -> (String, String) {
    match path.rsplit_once('/') {
        Some((collection, id)) => (collection.to_string(), id.to_string()),
        None => (String::new(), path.to_string()),
    }
}

fn order_key(fields: &serde_json::Value, order_by: OrderBy) -> Option<DateTime<Utc>> {
    fields
        .get(order_by.field_name())
        .and_then(|v| serde_json::from_value::<DateTime<Utc>>(v.clone()).ok())
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn fetch(
        &self,
        collection: &CollectionPath,
        order_by: OrderBy,
        descending: bool,
    ) -> Result<Vec<Document>, StoreError> {
        self.simulate_latency().await;
        self.check_read(collection.as_str())?;

        let mut docs: Vec<Document> = self
            .collections
            .lock()
            .unwrap()
            .get(collection.as_str())
            .map(|c| {
                c.iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        // Documents without the order field sort last, like the real store.
        docs.sort_by_key(|d| {
            let key = order_key(&d.fields, order_by);
            if descending {
                std::cmp::Reverse(key.map(|k| k.timestamp_micros()).unwrap_or(i64::MIN))
            } else {
                std::cmp::Reverse(key.map(|k| -k.timestamp_micros()).unwrap_or(i64::MIN))
            }
        });
        Ok(docs)
    }

    async fn fetch_children(
        &self,
        doc: &DocumentPath,
        child_collection: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let child = doc.child(child_collection);
        self.simulate_latency().await;
        self.check_read(child.as_str())?;

        let docs = self
            .collections
            .lock()
            .unwrap()
            .get(child.as_str())
            .map(|c| {
                c.iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(docs)
    }

    async fn commit_batch(&self, writes: Vec<BatchWrite>) -> Result<(), StoreError> {
        self.simulate_latency().await;

        let allowed = self.fail_commits_after.load(Ordering::SeqCst);
        if self.commit_count.load(Ordering::SeqCst) >= allowed {
            return Err(StoreError::Unavailable("injected commit failure".into()));
        }

        // Whole-batch atomicity: nothing is applied before this point, so
        // a failed commit leaves the store untouched.
        let mut collections = self.collections.lock().unwrap();
        let size = writes.len();
        for write in writes {
            let (collection, id) = split_doc_path(write.path.as_str());
            collections.entry(collection).or_default().insert(id, write.fields);
        }
        self.commit_count.fetch_add(1, Ordering::SeqCst);
        self.commit_sizes.lock().unwrap().push(size);
        Ok(())
    }

    async fn exists(&self, doc: &DocumentPath) -> Result<bool, StoreError> {
        self.simulate_latency().await;
        self.check_read(doc.as_str())?;
        Ok(self.get_document(doc).is_some())
    }
}
