use chrono::{Duration, Utc};
use uuid::Uuid;

mod common;
use common::utils::{metric_at, reading_session_at, spawn_engine, spawn_logged_out_engine};

use vitalsync::models::{
    ExerciseRecord, LocalState, Profile, SetRecord, SyncError, WorkoutSession,
};
use vitalsync::RecordType;

fn sample_state(account_id: Uuid) -> LocalState {
    let now = Utc::now();

    let mut workout = WorkoutSession::new(now - Duration::hours(2));
    workout.is_active = false;
    workout.is_completed = true;
    workout.exercises.push(ExerciseRecord {
        id: Uuid::new_v4(),
        exercise_kind: "deadlift".into(),
        start_time: now - Duration::hours(2),
        end_time: Some(now - Duration::hours(1)),
        is_completed: true,
        sets: vec![SetRecord {
            id: Uuid::new_v4(),
            reps: Some(5),
            weight: Some(120.0),
            duration_seconds: None,
            timestamp: now - Duration::hours(2),
        }],
    });

    let mut profile = Profile::new(account_id, "ada@example.com");
    profile.display_name = Some("Ada".into());

    LocalState {
        reading_sessions: vec![
            reading_session_at(now - Duration::hours(6)),
            reading_session_at(now - Duration::hours(30)),
        ],
        workout_sessions: vec![workout],
        metrics: vec![
            metric_at("weight", 64.2, now - Duration::hours(1)),
            metric_at("glucose", 5.1, now - Duration::hours(3)),
        ],
        profile: Some(profile),
    }
}

#[tokio::test]
async fn sync_then_load_roundtrips_every_domain() {
    let engine = spawn_engine();
    let state = sample_state(engine.account_id);

    engine
        .orchestrator
        .sync_all(&state)
        .await
        .expect("sync failed");

    let aggregate = engine
        .orchestrator
        .load_all_domains()
        .await
        .expect("load failed");

    assert_eq!(aggregate.reading_sessions.len(), 2);
    assert_eq!(aggregate.workout_sessions.len(), 1);
    assert_eq!(aggregate.workout_sessions[0].exercises.len(), 1);
    assert_eq!(aggregate.metrics.len(), 2);
    let profile = aggregate.profile.expect("profile missing");
    assert_eq!(profile.id, engine.account_id);
    assert_eq!(profile.email, "ada@example.com");
}

#[tokio::test]
async fn failing_domain_does_not_cancel_sibling_saves() {
    let engine = spawn_engine();
    let state = sample_state(engine.account_id);

    // Two domain commits go through, then the store starts failing.
    engine.store.fail_commits_after(2);

    let err = engine
        .orchestrator
        .sync_all(&state)
        .await
        .expect_err("sync should report the failure");
    assert!(matches!(err, SyncError::Batch { .. }));

    // Every domain attempted its commit; exactly two landed.
    assert_eq!(engine.store.commit_count(), 2);
    let committed: usize = [
        RecordType::ReadingSession,
        RecordType::WorkoutSession,
        RecordType::Metric,
        RecordType::Profile,
    ]
    .iter()
    .filter(|rt| engine.store.document_count(&engine.items(**rt)) > 0)
    .count();
    assert_eq!(committed, 2);
}

#[tokio::test]
async fn unloadable_domain_comes_back_empty_when_others_have_data() {
    let engine = spawn_engine();
    let state = sample_state(engine.account_id);
    engine
        .orchestrator
        .sync_all(&state)
        .await
        .expect("sync failed");

    engine.store.fail_reads_matching("metrics");

    let aggregate = engine
        .orchestrator
        .load_all_domains()
        .await
        .expect("partial domain failure must not fail the aggregate");
    assert_eq!(aggregate.reading_sessions.len(), 2);
    assert_eq!(aggregate.workout_sessions.len(), 1);
    assert!(aggregate.metrics.is_empty());
}

#[tokio::test]
async fn profile_existence_probe_tracks_sync_state() {
    let engine = spawn_engine();
    let reader = engine.orchestrator.reader();
    assert!(!reader.profile_exists().await.expect("probe failed"));

    engine
        .orchestrator
        .sync_all(&sample_state(engine.account_id))
        .await
        .expect("sync failed");
    assert!(reader.profile_exists().await.expect("probe failed"));
}

#[tokio::test]
async fn load_all_domains_without_account_surfaces_no_user() {
    let engine = spawn_logged_out_engine();
    let err = engine
        .orchestrator
        .load_all_domains()
        .await
        .expect_err("load should fail");
    assert!(matches!(err, SyncError::NoUser));
}
