// flowctl - typed client for the workflow engine REST API
// Exposes the engine client, the lifecycle contract and the CLI building blocks

pub mod cli;
pub mod config;
pub mod engine;
pub mod http;
pub mod lifecycle;
pub mod telemetry;

// Re-export key types for easy access
pub use config::FlowctlConfig;
pub use engine::{Credential, EngineClient, EngineError, ErrorKind, Page, PageRequest};
pub use lifecycle::{LifecycleCoordinator, LifecycleOps, TransitionError};
pub use telemetry::{create_operation_span, generate_correlation_id, init_telemetry};
