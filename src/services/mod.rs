pub mod read_coordinator;
pub mod sync_orchestrator;
pub mod telemetry;
pub mod write_coordinator;

pub use read_coordinator::ReadCoordinator;
pub use sync_orchestrator::SyncOrchestrator;
pub use write_coordinator::WriteCoordinator;
