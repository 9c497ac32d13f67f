use async_trait::async_trait;

use crate::engine::types::{ProcessInstance, Task, Variables};
use crate::engine::{Credential, EngineError};

/// The engine calls the lifecycle coordinator depends on.
///
/// Implemented by [`crate::engine::EngineClient`]; tests substitute an
/// in-memory engine.
#[async_trait]
pub trait LifecycleOps: Send + Sync {
    async fn fetch_instance(&self, credential: &Credential, id: &str) -> Result<ProcessInstance, EngineError>;

    async fn suspend_instance(&self, credential: &Credential, id: &str) -> Result<(), EngineError>;

    async fn activate_instance(&self, credential: &Credential, id: &str) -> Result<(), EngineError>;

    async fn terminate_instance(
        &self,
        credential: &Credential,
        id: &str,
        reason: Option<&str>,
    ) -> Result<(), EngineError>;

    async fn fetch_task(&self, credential: &Credential, id: &str) -> Result<Task, EngineError>;

    async fn claim_task(&self, credential: &Credential, id: &str) -> Result<(), EngineError>;

    async fn unclaim_task(&self, credential: &Credential, id: &str) -> Result<(), EngineError>;

    /// Complete the task, merging `variables` into its process instance.
    async fn complete_task(
        &self,
        credential: &Credential,
        id: &str,
        variables: &Variables,
    ) -> Result<(), EngineError>;
}
