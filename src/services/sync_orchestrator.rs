use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::config::SyncSettings;
use crate::crypto::CryptoProvider;
use crate::models::{AggregateState, LocalState, Record, SyncError};
use crate::services::read_coordinator::ReadCoordinator;
use crate::services::write_coordinator::WriteCoordinator;
use crate::store::RemoteStore;

/// Top-level entry point: drives save and load roundtrips across the
/// independent record domains. Domain fan-outs are joined, never raced;
/// a failing sibling does not cancel the others.
pub struct SyncOrchestrator {
    writer: WriteCoordinator,
    reader: ReadCoordinator,
}

impl SyncOrchestrator {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        auth: Arc<dyn AuthProvider>,
        crypto: Arc<dyn CryptoProvider>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            writer: WriteCoordinator::new(
                store.clone(),
                auth.clone(),
                crypto.clone(),
                settings.clone(),
            ),
            reader: ReadCoordinator::new(store, auth, crypto, settings),
        }
    }

    pub fn writer(&self) -> &WriteCoordinator {
        &self.writer
    }

    pub fn reader(&self) -> &ReadCoordinator {
        &self.reader
    }

    /// Push all locally held state. Each domain's batch is independently
    /// atomic; there is no transaction across domains. Every save runs to
    /// completion even when a sibling fails, and the last observed error
    /// is returned.
    pub async fn sync_all(&self, state: &LocalState) -> Result<(), SyncError> {
        let readings: Vec<Record> = state
            .reading_sessions
            .iter()
            .cloned()
            .map(Record::ReadingSession)
            .collect();
        let workouts: Vec<Record> = state
            .workout_sessions
            .iter()
            .cloned()
            .map(Record::WorkoutSession)
            .collect();
        let metrics: Vec<Record> = state.metrics.iter().cloned().map(Record::Metric).collect();
        let profile: Vec<Record> = state
            .profile
            .iter()
            .cloned()
            .map(Record::Profile)
            .collect();

        let (readings, workouts, metrics, profile) = tokio::join!(
            self.writer.save(&readings),
            self.writer.save(&workouts),
            self.writer.save(&metrics),
            self.writer.save(&profile),
        );

        let mut last_error = None;
        for (domain, result) in [
            ("reading_sessions", readings),
            ("workout_sessions", workouts),
            ("metrics", metrics),
            ("profile", profile),
        ] {
            if let Err(e) = result {
                tracing::error!("Sync of {} failed: {}", domain, e);
                last_error = Some(e);
            }
        }
        match last_error {
            Some(e) => Err(e),
            None => {
                tracing::info!("Sync completed for all domains");
                Ok(())
            }
        }
    }

    /// Pull every domain into one aggregate. A domain that fails comes
    /// back empty; its error is surfaced only when no domain produced any
    /// usable data at all.
    pub async fn load_all_domains(&self) -> Result<AggregateState, SyncError> {
        let (readings, workouts, metrics, profile) = tokio::join!(
            self.reader.load_reading_sessions(),
            self.reader.load_workout_sessions(),
            self.reader.load_metrics(),
            self.reader.load_profile(),
        );

        let mut state = AggregateState::default();
        let mut first_error = None;
        let mut any_data = false;

        match readings {
            Ok(sessions) => {
                any_data |= !sessions.is_empty();
                state.reading_sessions = sessions;
            }
            Err(e) => {
                tracing::warn!("Loading reading sessions failed: {}", e);
                first_error.get_or_insert(e);
            }
        }
        match workouts {
            Ok(sessions) => {
                any_data |= !sessions.is_empty();
                state.workout_sessions = sessions;
            }
            Err(e) => {
                tracing::warn!("Loading workout sessions failed: {}", e);
                first_error.get_or_insert(e);
            }
        }
        match metrics {
            Ok(metrics) => {
                any_data |= !metrics.is_empty();
                state.metrics = metrics;
            }
            Err(e) => {
                tracing::warn!("Loading metrics failed: {}", e);
                first_error.get_or_insert(e);
            }
        }
        match profile {
            Ok(profile) => {
                any_data |= profile.is_some();
                state.profile = profile;
            }
            Err(e) => {
                tracing::warn!("Loading profile failed: {}", e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) if !any_data => Err(e),
            _ => Ok(state),
        }
    }
}
