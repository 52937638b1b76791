pub mod settings;

pub use settings::{get_config, ApplicationSettings, Settings, SyncSettings};
