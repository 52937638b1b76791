use std::env;
use std::time::Duration;

use config::{Config, ConfigError, File};
use dotenv::dotenv;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub sync: SyncSettings,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ApplicationSettings {
    pub log_level: String,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct SyncSettings {
    /// Per-branch deadline for a single-type load.
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    /// Deadline for a whole fan-out across all record types.
    #[serde(default = "default_aggregate_timeout_secs")]
    pub aggregate_timeout_secs: u64,
    /// Store-imposed maximum operations per batch commit.
    #[serde(default = "default_max_batch_ops")]
    pub max_batch_ops: usize,
    #[serde(default)]
    pub encrypt_at_rest: bool,
}

fn default_read_timeout_secs() -> u64 {
    10
}

fn default_aggregate_timeout_secs() -> u64 {
    30
}

fn default_max_batch_ops() -> usize {
    500
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            read_timeout_secs: default_read_timeout_secs(),
            aggregate_timeout_secs: default_aggregate_timeout_secs(),
            max_batch_ops: default_max_batch_ops(),
            encrypt_at_rest: false,
        }
    }
}

impl SyncSettings {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn aggregate_timeout(&self) -> Duration {
        Duration::from_secs(self.aggregate_timeout_secs)
    }
}

pub fn get_config() -> Result<Settings, ConfigError> {
    let base_path = std::env::current_dir()
        .expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    dotenv().ok();

    let environment: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT.");

    let env_filename = format!("{}.yml", environment.as_str());
    let config = Config::builder()
        .add_source(File::from(configuration_directory.join("base.yml")))
        .add_source(File::from(configuration_directory.join(env_filename)))
        .add_source(
            config::Environment::default()
                .prefix("SYNC")
                .prefix_separator("__")
                .separator("__"),
        )
        .add_source(
            config::Environment::default()
                .prefix("APP")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    config.try_deserialize::<Settings>()
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. \
                Use either `local` or `production`.",
                other
            )),
        }
    }
}
