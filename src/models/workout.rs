use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One set performed within an exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRecord {
    pub id: Uuid,
    #[serde(default)]
    pub reps: Option<i32>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub duration_seconds: Option<i32>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseRecord {
    pub id: Uuid,
    pub exercise_kind: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub sets: Vec<SetRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_paused: bool,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub exercises: Vec<ExerciseRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkoutSession {
    pub fn new(start_time: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            start_time,
            end_time: None,
            is_active: true,
            is_paused: false,
            is_completed: false,
            exercises: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Where an exercise document keeps its sets.
///
/// Older writers embedded the sets array on the exercise document, newer
/// ones moved them into a `sets` child collection. Exactly one
/// representation is authoritative per document and the decision is made
/// here, once, instead of deep inside the fetch path.
#[derive(Debug, Clone)]
pub enum SetSource {
    Inline(Vec<SetRecord>),
    Subcollection,
}

impl SetSource {
    pub fn resolve(exercise_fields: &serde_json::Value) -> Self {
        match exercise_fields.get("sets") {
            Some(serde_json::Value::Array(raw)) => {
                let sets = raw
                    .iter()
                    .filter_map(|v| match serde_json::from_value::<SetRecord>(v.clone()) {
                        Ok(set) => Some(set),
                        Err(e) => {
                            tracing::warn!("Dropping undecodable inline set: {}", e);
                            None
                        }
                    })
                    .collect();
                SetSource::Inline(sets)
            }
            _ => SetSource::Subcollection,
        }
    }
}
