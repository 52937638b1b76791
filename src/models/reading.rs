use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One blood pressure measurement inside a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub systolic: i32,
    pub diastolic: i32,
    #[serde(default)]
    pub pulse: Option<i32>,
    pub timestamp: DateTime<Utc>,
}

/// A measurement session, e.g. the morning blood pressure routine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingSession {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    pub readings: Vec<Reading>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReadingSession {
    pub fn new(start_time: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            start_time,
            end_time: None,
            readings: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
