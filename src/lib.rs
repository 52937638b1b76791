pub mod auth;
pub mod config;
pub mod crypto;
pub mod models;
pub mod services;
pub mod store;

pub use auth::{AuthProvider, StaticAuth};
pub use config::{Settings, SyncSettings};
pub use crypto::{CryptoProvider, PassthroughCrypto};
pub use models::{AggregateState, LocalState, Record, RecordType, SyncError};
pub use services::{ReadCoordinator, SyncOrchestrator, WriteCoordinator};
pub use store::{MemoryStore, RemoteStore};
