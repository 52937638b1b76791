use thiserror::Error as ThisError;

use crate::models::metric::Metric;
use crate::models::profile::Profile;
use crate::models::reading::ReadingSession;
use crate::models::record::RecordType;
use crate::models::workout::WorkoutSession;
use crate::store::adapter::StoreError;

// Error types for the sync engine
#[derive(Debug, ThisError)]
pub enum SyncError {
    #[error("No authenticated account")]
    NoUser,

    #[error("Request timeout")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Batch commit failed at chunk {chunk} ({types:?}): {source}")]
    Batch {
        chunk: usize,
        types: Vec<RecordType>,
        #[source]
        source: StoreError,
    },
}

// Network failures get their own variant; everything else the store
// reports passes through as-is.
impl From<StoreError> for SyncError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Network(message) => SyncError::Network(message),
            other => SyncError::Store(other),
        }
    }
}

/// Locally held state the orchestrator pushes to the remote store.
#[derive(Debug, Clone, Default)]
pub struct LocalState {
    pub reading_sessions: Vec<ReadingSession>,
    pub workout_sessions: Vec<WorkoutSession>,
    pub metrics: Vec<Metric>,
    pub profile: Option<Profile>,
}

/// Everything the remote store knows about an account, one field per
/// record family. Domains that failed with no usable partial data are
/// simply empty here; the first such failure is surfaced as the call's
/// error instead.
#[derive(Debug, Clone, Default)]
pub struct AggregateState {
    pub reading_sessions: Vec<ReadingSession>,
    pub workout_sessions: Vec<WorkoutSession>,
    pub metrics: Vec<Metric>,
    pub profile: Option<Profile>,
}
