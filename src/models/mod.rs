pub mod metric;
pub mod profile;
pub mod reading;
pub mod record;
pub mod sync;
pub mod workout;

pub use metric::Metric;
pub use profile::Profile;
pub use reading::{Reading, ReadingSession};
pub use record::{Record, RecordType};
pub use sync::{AggregateState, LocalState, SyncError};
pub use workout::{ExerciseRecord, SetRecord, SetSource, WorkoutSession};
