use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

mod common;
use common::utils::{metric_at, reading_session_at, spawn_engine, spawn_engine_with, spawn_logged_out_engine};

use vitalsync::config::SyncSettings;
use vitalsync::models::{Record, SyncError};
use vitalsync::RecordType;

#[tokio::test]
async fn load_one_preserves_descending_store_order() {
    let engine = spawn_engine();
    let base = Utc::now();

    let records: Vec<Record> = (0..4)
        .map(|i| Record::Metric(metric_at("weight", 80.0 + i as f64, base - Duration::days(i))))
        .collect();
    engine
        .orchestrator
        .writer()
        .save(&records)
        .await
        .expect("save failed");

    let loaded = engine
        .orchestrator
        .reader()
        .load_metrics()
        .await
        .expect("load failed");
    assert_eq!(loaded.len(), 4);
    for pair in loaded.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}

#[tokio::test(start_paused = true)]
async fn slow_store_resolves_exactly_once_with_timeout() {
    let settings = SyncSettings {
        read_timeout_secs: 1,
        ..SyncSettings::default()
    };
    let engine = spawn_engine_with(settings);
    // The store responds long after the deadline; the response must be
    // discarded, not delivered as a second resolution.
    engine.store.set_latency(StdDuration::from_secs(30));

    let result = engine.orchestrator.reader().load_one(RecordType::Metric).await;
    assert!(matches!(result, Err(SyncError::Timeout)));
}

#[tokio::test(start_paused = true)]
async fn aggregate_deadline_fires_even_when_every_branch_is_within_its_own() {
    // Branches would each finish inside their 10s budget, but the whole
    // fan-out is raced against its own, here shorter, deadline.
    let settings = SyncSettings {
        read_timeout_secs: 10,
        aggregate_timeout_secs: 1,
        ..SyncSettings::default()
    };
    let engine = spawn_engine_with(settings);
    engine.store.set_latency(StdDuration::from_secs(5));

    let result = engine.orchestrator.reader().load_all().await;
    assert!(matches!(result, Err(SyncError::Timeout)));
}

#[tokio::test]
async fn partial_branch_failure_still_merges_successful_branches() {
    let engine = spawn_engine();
    let base = Utc::now();

    let mut records: Vec<Record> = (0..2)
        .map(|i| Record::ReadingSession(reading_session_at(base - Duration::hours(4 * i + 1))))
        .collect();
    records.extend((0..3).map(|i| {
        Record::Metric(metric_at("glucose", 5.0 + i as f64, base - Duration::hours(2 * i)))
    }));
    engine
        .orchestrator
        .writer()
        .save(&records)
        .await
        .expect("save failed");

    engine.store.fail_reads_matching("workout_sessions");

    let merged = engine
        .orchestrator
        .reader()
        .load_all()
        .await
        .expect("partial failure must not fail the aggregate");
    assert_eq!(merged.len(), 5);
    for pair in merged.windows(2) {
        assert!(pair[0].timestamp() >= pair[1].timestamp());
    }
}

#[tokio::test]
async fn aggregate_fails_only_when_every_branch_is_empty_handed() {
    let engine = spawn_engine();
    engine.store.fail_reads_matching("records/");

    let err = engine
        .orchestrator
        .reader()
        .load_all()
        .await
        .expect_err("all branches failed, aggregate must fail");
    assert!(matches!(err, SyncError::Store(_)));
}

#[tokio::test]
async fn malformed_documents_are_dropped_not_fatal() {
    let engine = spawn_engine();
    let base = Utc::now();

    let records: Vec<Record> = (0..5)
        .map(|i| Record::Metric(metric_at("weight", 80.0 + i as f64, base - Duration::days(i))))
        .collect();
    engine
        .orchestrator
        .writer()
        .save(&records)
        .await
        .expect("save failed");

    // A sixth document missing its value and timestamp.
    let collection = engine.items(RecordType::Metric);
    engine.store.insert_document(
        &collection.doc(Uuid::new_v4()),
        json!({ "kind": "weight", "created_at": base }),
    );

    let loaded = engine
        .orchestrator
        .reader()
        .load_metrics()
        .await
        .expect("load failed");
    assert_eq!(loaded.len(), 5);
}

#[tokio::test]
async fn encrypted_documents_are_routed_through_the_crypto_contract() {
    let settings = SyncSettings {
        encrypt_at_rest: true,
        ..SyncSettings::default()
    };
    let engine = spawn_engine_with(settings);

    let metric = metric_at("weight", 79.4, Utc::now());
    engine
        .orchestrator
        .writer()
        .save(&[Record::Metric(metric.clone())])
        .await
        .expect("save failed");

    // On disk the document is an opaque envelope...
    let collection = engine.items(RecordType::Metric);
    let raw = engine
        .store
        .get_document(&collection.doc(metric.id))
        .expect("document missing");
    assert_eq!(raw.get("is_encrypted").and_then(|v| v.as_bool()), Some(true));
    assert!(raw.get("value").is_none());

    // ...but reads come back decrypted.
    let loaded = engine
        .orchestrator
        .reader()
        .load_metrics()
        .await
        .expect("load failed");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].value, 79.4);
}

#[tokio::test]
async fn load_without_authenticated_account_fails_with_no_user() {
    let engine = spawn_logged_out_engine();
    let err = engine
        .orchestrator
        .reader()
        .load_one(RecordType::ReadingSession)
        .await
        .expect_err("load should fail");
    assert!(matches!(err, SyncError::NoUser));
}
