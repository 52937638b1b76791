use async_trait::async_trait;
use thiserror::Error as ThisError;

use crate::store::path::{CollectionPath, DocumentPath};

/// One remote document: its id within the collection plus its field map.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub fields: serde_json::Value,
}

/// One staged write inside an atomic batch commit.
#[derive(Debug, Clone)]
pub struct BatchWrite {
    pub path: DocumentPath,
    pub fields: serde_json::Value,
}

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

/// Field the documents are ordered by in a collection query.
#[derive(Debug, Clone, Copy)]
pub enum OrderBy {
    CreatedAt,
    Timestamp,
}

impl OrderBy {
    pub fn field_name(&self) -> &'static str {
        match self {
            OrderBy::CreatedAt => "created_at",
            OrderBy::Timestamp => "timestamp",
        }
    }
}

/// The engine's only view of the remote document store.
///
/// The store is assumed to offer single-document atomic writes, ordered
/// per-collection queries and whole-batch atomic commits. Everything else
/// (consistency model, transport, auth tokens) is the adapter's problem.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Ordered query over one collection. `descending` applies to `order_by`.
    async fn fetch(
        &self,
        collection: &CollectionPath,
        order_by: OrderBy,
        descending: bool,
    ) -> Result<Vec<Document>, StoreError>;

    /// Fetch a document's child collection, in store order.
    async fn fetch_children(
        &self,
        doc: &DocumentPath,
        child_collection: &str,
    ) -> Result<Vec<Document>, StoreError>;

    /// Commit all staged writes atomically: either every write becomes
    /// visible or none do.
    async fn commit_batch(&self, writes: Vec<BatchWrite>) -> Result<(), StoreError>;

    async fn exists(&self, doc: &DocumentPath) -> Result<bool, StoreError>;
}
