use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::metric::Metric;
use crate::models::profile::Profile;
use crate::models::reading::ReadingSession;
use crate::models::workout::WorkoutSession;

/// Discriminator stored on every persisted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    ReadingSession,
    WorkoutSession,
    Metric,
    Profile,
}

impl RecordType {
    /// Static type -> collection mapping used by the write coordinator.
    pub fn collection_name(&self) -> &'static str {
        match self {
            RecordType::ReadingSession => "reading_sessions",
            RecordType::WorkoutSession => "workout_sessions",
            RecordType::Metric => "metrics",
            RecordType::Profile => "profile",
        }
    }

    /// The record families the read coordinator fans out across.
    pub fn all() -> [RecordType; 3] {
        [
            RecordType::ReadingSession,
            RecordType::WorkoutSession,
            RecordType::Metric,
        ]
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.collection_name())
    }
}

/// Any persisted health/fitness entity with a stable id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record {
    ReadingSession(ReadingSession),
    WorkoutSession(WorkoutSession),
    Metric(Metric),
    Profile(Profile),
}

impl Record {
    pub fn id(&self) -> Uuid {
        match self {
            Record::ReadingSession(r) => r.id,
            Record::WorkoutSession(w) => w.id,
            Record::Metric(m) => m.id,
            Record::Profile(p) => p.id,
        }
    }

    pub fn record_type(&self) -> RecordType {
        match self {
            Record::ReadingSession(_) => RecordType::ReadingSession,
            Record::WorkoutSession(_) => RecordType::WorkoutSession,
            Record::Metric(_) => RecordType::Metric,
            Record::Profile(_) => RecordType::Profile,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Record::ReadingSession(r) => r.created_at,
            Record::WorkoutSession(w) => w.created_at,
            Record::Metric(m) => m.created_at,
            Record::Profile(p) => p.created_at,
        }
    }

    /// Recency key used when merging fan-out branches.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Record::ReadingSession(r) => r.start_time,
            Record::WorkoutSession(w) => w.start_time,
            Record::Metric(m) => m.timestamp,
            Record::Profile(p) => p.updated_at,
        }
    }
}
