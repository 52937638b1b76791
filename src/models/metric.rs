use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single point-in-time body measurement (weight, glucose, SpO2, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metric {
    pub id: Uuid,
    pub kind: String,
    pub value: f64,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Metric {
    pub fn new(kind: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind: kind.into(),
            value,
            unit: unit.into(),
            timestamp: now,
            created_at: now,
            updated_at: now,
        }
    }
}
