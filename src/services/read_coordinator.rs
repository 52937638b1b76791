use std::sync::Arc;

use futures::future::join_all;
use uuid::Uuid;

use crate::auth::AuthProvider;
use crate::config::SyncSettings;
use crate::crypto::CryptoProvider;
use crate::models::{
    ExerciseRecord, Metric, Profile, ReadingSession, Record, RecordType, SetRecord, SetSource,
    SyncError, WorkoutSession,
};
use crate::store::{CollectionPath, Document, DocumentPath, OrderBy, RemoteStore, EXERCISES, SETS};

/// Fetches record collections with bounded timeouts, fans out across all
/// record families and reconstructs the nested workout hierarchy.
pub struct ReadCoordinator {
    store: Arc<dyn RemoteStore>,
    auth: Arc<dyn AuthProvider>,
    crypto: Arc<dyn CryptoProvider>,
    settings: SyncSettings,
}

impl ReadCoordinator {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        auth: Arc<dyn AuthProvider>,
        crypto: Arc<dyn CryptoProvider>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            store,
            auth,
            crypto,
            settings,
        }
    }

    /// Load one record family, racing the query against the per-branch
    /// deadline. The losing side of the race is dropped, so a late store
    /// response after a timeout can never resolve the call a second time.
    pub async fn load_one(&self, record_type: RecordType) -> Result<Vec<Record>, SyncError> {
        if record_type == RecordType::WorkoutSession {
            return Ok(self
                .load_workout_sessions()
                .await?
                .into_iter()
                .map(Record::WorkoutSession)
                .collect());
        }

        let account_id = self.auth.current_account().ok_or(SyncError::NoUser)?;
        tokio::time::timeout(
            self.settings.read_timeout(),
            self.fetch_and_decode(account_id, record_type),
        )
        .await
        .map_err(|_| SyncError::Timeout)?
    }

    /// Fan out across all record families concurrently and merge.
    ///
    /// Succeeds with the concatenation of every successful branch, sorted
    /// descending by recency; a branch error is surfaced only when no
    /// branch produced any records. The whole fan-out is additionally
    /// raced against the aggregate deadline.
    pub async fn load_all(&self) -> Result<Vec<Record>, SyncError> {
        let branches = RecordType::all();
        let results = tokio::time::timeout(
            self.settings.aggregate_timeout(),
            join_all(branches.iter().map(|rt| self.load_one(*rt))),
        )
        .await
        .map_err(|_| SyncError::Timeout)?;

        let mut merged = Vec::new();
        let mut first_error = None;
        for (record_type, result) in branches.iter().zip(results) {
            match result {
                Ok(records) => merged.extend(records),
                Err(e) => {
                    tracing::warn!("Branch {} failed during fan-out: {}", record_type, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if merged.is_empty() {
            if let Some(e) = first_error {
                return Err(e);
            }
        }
        merged.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        Ok(merged)
    }

    pub async fn load_reading_sessions(&self) -> Result<Vec<ReadingSession>, SyncError> {
        Ok(self
            .load_one(RecordType::ReadingSession)
            .await?
            .into_iter()
            .filter_map(|r| match r {
                Record::ReadingSession(s) => Some(s),
                _ => None,
            })
            .collect())
    }

    pub async fn load_metrics(&self) -> Result<Vec<Metric>, SyncError> {
        Ok(self
            .load_one(RecordType::Metric)
            .await?
            .into_iter()
            .filter_map(|r| match r {
                Record::Metric(m) => Some(m),
                _ => None,
            })
            .collect())
    }

    /// The profile collection holds at most one document, keyed by the
    /// account id itself.
    pub async fn load_profile(&self) -> Result<Option<Profile>, SyncError> {
        let account_id = self.auth.current_account().ok_or(SyncError::NoUser)?;
        let records = tokio::time::timeout(
            self.settings.read_timeout(),
            self.fetch_and_decode(account_id, RecordType::Profile),
        )
        .await
        .map_err(|_| SyncError::Timeout)??;

        Ok(records.into_iter().find_map(|r| match r {
            Record::Profile(p) => Some(p),
            _ => None,
        }))
    }

    /// Existence probe for the profile document, without fetching it.
    /// The application uses this to decide between onboarding and sync.
    pub async fn profile_exists(&self) -> Result<bool, SyncError> {
        let account_id = self.auth.current_account().ok_or(SyncError::NoUser)?;
        let doc = CollectionPath::items(account_id, RecordType::Profile).doc(account_id);
        Ok(self.store.exists(&doc).await?)
    }

    /// Reconstruct workout sessions from their three-tier layout:
    /// session documents, exercise child documents and, for exercises
    /// without inline sets, set child documents.
    ///
    /// Each session's exercises resolve in parallel and a session is
    /// complete only when all of them have, whichever set path each took.
    /// Malformed documents are dropped at their own tier without aborting
    /// siblings. The final list is sorted descending by creation time,
    /// matching every other load path.
    pub async fn load_workout_sessions(&self) -> Result<Vec<WorkoutSession>, SyncError> {
        let account_id = self.auth.current_account().ok_or(SyncError::NoUser)?;
        tokio::time::timeout(
            self.settings.read_timeout(),
            self.fetch_workout_sessions(account_id),
        )
        .await
        .map_err(|_| SyncError::Timeout)?
    }

    async fn fetch_workout_sessions(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<WorkoutSession>, SyncError> {
        let collection = CollectionPath::items(account_id, RecordType::WorkoutSession);
        let docs = self
            .store
            .fetch(&collection, OrderBy::CreatedAt, true)
            .await?;

        let sessions = join_all(
            docs.into_iter()
                .map(|doc| self.reconstruct_session(&collection, doc)),
        )
        .await;

        let mut sessions: Vec<WorkoutSession> = sessions.into_iter().flatten().collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    /// One session document -> fully resolved session, or `None` when the
    /// header itself is malformed.
    async fn reconstruct_session(
        &self,
        collection: &CollectionPath,
        doc: Document,
    ) -> Option<WorkoutSession> {
        let doc_id = doc.id.clone();
        let fields = match self.decode_fields(&doc) {
            Ok(fields) => fields,
            Err(e) => {
                tracing::warn!("Dropping undecodable workout session {}: {}", doc_id, e);
                return None;
            }
        };

        let mut header = fields;
        if let Some(obj) = header.as_object_mut() {
            obj.remove("exercises");
        }
        let mut session: WorkoutSession = match serde_json::from_value(header) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Dropping malformed workout session {}: {}", doc_id, e);
                return None;
            }
        };

        let session_doc = collection.doc(session.id);
        let exercise_docs = match self.store.fetch_children(&session_doc, EXERCISES).await {
            Ok(docs) => docs,
            Err(e) => {
                tracing::warn!("Failed to fetch exercises for session {}: {}", session.id, e);
                return None;
            }
        };

        let exercises = join_all(
            exercise_docs
                .into_iter()
                .map(|doc| self.reconstruct_exercise(&session_doc, doc)),
        )
        .await;

        session.exercises = exercises.into_iter().flatten().collect();
        Some(session)
    }

    /// One exercise document -> exercise with its sets resolved from
    /// whichever representation the document uses.
    async fn reconstruct_exercise(
        &self,
        session_doc: &DocumentPath,
        doc: Document,
    ) -> Option<ExerciseRecord> {
        let doc_id = doc.id.clone();
        let fields = match self.decode_fields(&doc) {
            Ok(fields) => fields,
            Err(e) => {
                tracing::warn!("Dropping undecodable exercise {}: {}", doc_id, e);
                return None;
            }
        };

        let source = SetSource::resolve(&fields);

        let mut header = fields;
        if let Some(obj) = header.as_object_mut() {
            obj.remove("sets");
        }
        let mut exercise: ExerciseRecord = match serde_json::from_value(header) {
            Ok(exercise) => exercise,
            Err(e) => {
                tracing::warn!("Dropping malformed exercise {}: {}", doc_id, e);
                return None;
            }
        };

        exercise.sets = match source {
            SetSource::Inline(sets) => sets,
            SetSource::Subcollection => {
                let exercise_doc = session_doc.child(EXERCISES).doc(exercise.id);
                match self.store.fetch_children(&exercise_doc, SETS).await {
                    Ok(docs) => docs
                        .into_iter()
                        .filter_map(|doc| self.decode_set(doc))
                        .collect(),
                    Err(e) => {
                        tracing::warn!(
                            "Failed to fetch sets for exercise {}: {}",
                            exercise.id,
                            e
                        );
                        return None;
                    }
                }
            }
        };
        Some(exercise)
    }

    fn decode_set(&self, doc: Document) -> Option<SetRecord> {
        let doc_id = doc.id.clone();
        let fields = match self.decode_fields(&doc) {
            Ok(fields) => fields,
            Err(e) => {
                tracing::warn!("Dropping undecodable set {}: {}", doc_id, e);
                return None;
            }
        };
        match serde_json::from_value(fields) {
            Ok(set) => Some(set),
            Err(e) => {
                tracing::warn!("Dropping malformed set {}: {}", doc_id, e);
                None
            }
        }
    }

    async fn fetch_and_decode(
        &self,
        account_id: Uuid,
        record_type: RecordType,
    ) -> Result<Vec<Record>, SyncError> {
        let collection = CollectionPath::items(account_id, record_type);
        let docs = self
            .store
            .fetch(&collection, OrderBy::CreatedAt, true)
            .await?;

        // Store order (descending) is preserved through decoding.
        let mut records = Vec::with_capacity(docs.len());
        for doc in docs {
            let doc_id = doc.id.clone();
            let fields = match self.decode_fields(&doc) {
                Ok(fields) => fields,
                Err(e) => {
                    tracing::warn!("Dropping undecodable {} document {}: {}", record_type, doc_id, e);
                    continue;
                }
            };
            match decode_record(record_type, fields) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Dropping malformed {} document {}: {}", record_type, doc_id, e);
                }
            }
        }
        Ok(records)
    }

    /// Unwrap the encryption envelope when the document carries one;
    /// plain documents pass through untouched.
    fn decode_fields(&self, doc: &Document) -> Result<serde_json::Value, SyncError> {
        let encrypted = doc
            .fields
            .get("is_encrypted")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if !encrypted {
            return Ok(doc.fields.clone());
        }

        let payload = doc
            .fields
            .get("payload")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SyncError::Crypto("encrypted document without payload".into()))?;
        self.crypto
            .decrypt(payload)
            .map_err(|e| SyncError::Crypto(e.to_string()))
    }
}

fn decode_record(
    record_type: RecordType,
    fields: serde_json::Value,
) -> Result<Record, serde_json::Error> {
    Ok(match record_type {
        RecordType::ReadingSession => Record::ReadingSession(serde_json::from_value(fields)?),
        RecordType::WorkoutSession => Record::WorkoutSession(serde_json::from_value(fields)?),
        RecordType::Metric => Record::Metric(serde_json::from_value(fields)?),
        RecordType::Profile => Record::Profile(serde_json::from_value(fields)?),
    })
}
