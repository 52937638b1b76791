use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use uuid::Uuid;

use vitalsync::config::SyncSettings;
use vitalsync::models::{Metric, Reading, ReadingSession};
use vitalsync::services::telemetry::{get_subscriber, init_subscriber};
use vitalsync::store::{CollectionPath, MemoryStore};
use vitalsync::{PassthroughCrypto, RecordType, StaticAuth, SyncOrchestrator};

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub struct TestEngine {
    pub store: Arc<MemoryStore>,
    pub account_id: Uuid,
    pub orchestrator: SyncOrchestrator,
}

impl TestEngine {
    pub fn items(&self, record_type: RecordType) -> CollectionPath {
        CollectionPath::items(self.account_id, record_type)
    }
}

pub fn spawn_engine() -> TestEngine {
    spawn_engine_with(SyncSettings::default())
}

pub fn spawn_engine_with(settings: SyncSettings) -> TestEngine {
    Lazy::force(&TRACING);

    let store = Arc::new(MemoryStore::new());
    let account_id = Uuid::new_v4();
    let orchestrator = SyncOrchestrator::new(
        store.clone(),
        Arc::new(StaticAuth::logged_in(account_id)),
        Arc::new(PassthroughCrypto),
        settings,
    );
    TestEngine {
        store,
        account_id,
        orchestrator,
    }
}

pub fn spawn_logged_out_engine() -> TestEngine {
    Lazy::force(&TRACING);

    let store = Arc::new(MemoryStore::new());
    let orchestrator = SyncOrchestrator::new(
        store.clone(),
        Arc::new(StaticAuth::logged_out()),
        Arc::new(PassthroughCrypto),
        SyncSettings::default(),
    );
    TestEngine {
        store,
        account_id: Uuid::nil(),
        orchestrator,
    }
}

pub fn reading_session_at(start_time: DateTime<Utc>) -> ReadingSession {
    let mut session = ReadingSession::new(start_time);
    session.created_at = start_time;
    session.updated_at = start_time;
    session.readings = vec![
        Reading {
            systolic: 121,
            diastolic: 79,
            pulse: Some(64),
            timestamp: start_time,
        },
        Reading {
            systolic: 118,
            diastolic: 76,
            pulse: None,
            timestamp: start_time + Duration::minutes(2),
        },
    ];
    session.end_time = Some(start_time + Duration::minutes(5));
    session
}

pub fn metric_at(kind: &str, value: f64, timestamp: DateTime<Utc>) -> Metric {
    let mut metric = Metric::new(kind, value, "kg");
    metric.timestamp = timestamp;
    metric.created_at = timestamp;
    metric.updated_at = timestamp;
    metric
}
