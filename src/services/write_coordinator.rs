use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::AuthProvider;
use crate::config::SyncSettings;
use crate::crypto::CryptoProvider;
use crate::models::{Record, RecordType, SyncError};
use crate::store::{BatchWrite, CollectionPath, RemoteStore, EXERCISES};

/// Groups heterogeneous records by type, stages them as one logical batch
/// and commits in store-sized chunks.
pub struct WriteCoordinator {
    store: Arc<dyn RemoteStore>,
    auth: Arc<dyn AuthProvider>,
    crypto: Arc<dyn CryptoProvider>,
    settings: SyncSettings,
}

impl WriteCoordinator {
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

    /// Upsert every record. Each chunk of staged writes is atomic; chunks
    /// commit sequentially, so an earlier chunk stays applied when a later
    /// one fails. A record that fails to serialize is logged and skipped
    /// rather than blocking the rest.
    pub async fn save(&self, records: &[Record]) -> Result<(), SyncError> {
        let account_id = self.auth.current_account().ok_or(SyncError::NoUser)?;

        let mut grouped: HashMap<RecordType, Vec<&Record>> = HashMap::new();
        for record in records {
            grouped.entry(record.record_type()).or_default().push(record);
        }

        // Staging order is fixed by type so chunk boundaries are
        // deterministic for a given input set.
        let mut staged: Vec<(RecordType, BatchWrite)> = Vec::new();
        for record_type in [
            RecordType::ReadingSession,
            RecordType::WorkoutSession,
            RecordType::Metric,
            RecordType::Profile,
        ] {
            let Some(group) = grouped.get(&record_type) else {
                continue;
            };
            for &record in group {
                match self.stage_record(account_id, record) {
                    Ok(writes) => staged.extend(writes.into_iter().map(|w| (record_type, w))),
                    Err(e) => {
                        tracing::error!(
                            "Skipping unserializable {} record {}: {}",
                            record_type,
                            record.id(),
                            e
                        );
                    }
                }
            }
        }

        if staged.is_empty() {
            return Ok(());
        }

        // A misconfigured zero would panic `chunks`; one write per commit
        // is the smallest batch the store accepts.
        let chunk_size = self.settings.max_batch_ops.max(1);
        let chunk_count = staged.len().div_ceil(chunk_size);
        for (index, chunk) in staged.chunks(chunk_size).enumerate() {
            let mut types: Vec<RecordType> = Vec::new();
            let mut writes = Vec::with_capacity(chunk.len());
            for (record_type, write) in chunk {
                if !types.contains(record_type) {
                    types.push(*record_type);
                }
                writes.push(write.clone());
            }

            let size = writes.len();
            if let Err(source) = self.store.commit_batch(writes).await {
                tracing::error!(
                    "Batch chunk {}/{} failed ({} writes, {:?}): {}",
                    index + 1,
                    chunk_count,
                    size,
                    types,
                    source
                );
                return Err(SyncError::Batch {
                    chunk: index + 1,
                    types,
                    source,
                });
            }
            tracing::info!(
                "Committed batch chunk {}/{} ({} writes)",
                index + 1,
                chunk_count,
                size
            );
        }
        Ok(())
    }

    /// Serialize one record into its document writes. A workout session
    /// becomes a header document plus one child document per exercise,
    /// each carrying its sets inline.
    fn stage_record(&self, account_id: Uuid, record: &Record) -> Result<Vec<BatchWrite>, SyncError> {
        let collection = CollectionPath::items(account_id, record.record_type());
        let mut writes = Vec::new();

        match record {
            Record::WorkoutSession(session) => {
                let session_doc = collection.doc(session.id);
                let mut header = serde_json::to_value(session)?;
                if let Some(obj) = header.as_object_mut() {
                    obj.remove("exercises");
                }
                writes.push(BatchWrite {
                    path: session_doc.clone(),
                    fields: self.stamp_and_seal(header, record)?,
                });

                let exercises = session_doc.child(EXERCISES);
                for exercise in &session.exercises {
                    writes.push(BatchWrite {
                        path: exercises.doc(exercise.id),
                        fields: self.stamp_and_seal(serde_json::to_value(exercise)?, record)?,
                    });
                }
            }
            _ => {
                writes.push(BatchWrite {
                    path: collection.doc(record.id()),
                    fields: self.stamp_and_seal(serde_json::to_value(record)?, record)?,
                });
            }
        }
        Ok(writes)
    }

    /// Stamp timestamps and the type discriminator, then wrap the payload
    /// in an encryption envelope when encrypt-at-rest is on. The envelope
    /// keeps the stamps in the clear so ordered queries still work.
    fn stamp_and_seal(
        &self,
        mut fields: serde_json::Value,
        record: &Record,
    ) -> Result<serde_json::Value, SyncError> {
        let updated_at = Utc::now();
        if let Some(obj) = fields.as_object_mut() {
            obj.insert(
                "created_at".into(),
                serde_json::to_value(record.created_at())?,
            );
            obj.insert("updated_at".into(), serde_json::to_value(updated_at)?);
            obj.insert(
                "record_type".into(),
                serde_json::to_value(record.record_type())?,
            );
        }

        if !self.settings.encrypt_at_rest {
            return Ok(fields);
        }

        let payload = self
            .crypto
            .encrypt(&fields)
            .map_err(|e| SyncError::Crypto(e.to_string()))?;
        Ok(serde_json::json!({
            "is_encrypted": true,
            "payload": payload,
            "record_type": record.record_type(),
            "created_at": record.created_at(),
            "updated_at": updated_at,
        }))
    }
}
