use async_trait::async_trait;
use std::time::Duration;

use super::decisions::DecisionHandler;
use super::definitions::DefinitionHandler;
use super::deployments::DeploymentHandler;
use super::errors::EngineError;
use super::forms::FormHandler;
use super::instances::InstanceHandler;
use super::retry::RetryPolicy;
use super::system::SystemHandler;
use super::tasks::TaskHandler;
use super::types::{ProcessInstance, Task, Variables};
use super::users::UserHandler;
use super::Credential;
use crate::config::FlowctlConfig;
use crate::http::client::{EngineTransport, TransportSettings};
use crate::lifecycle::LifecycleOps;

/// Entry point to the engine API.
///
/// Cheap to clone and safe to share between tasks. Holds no credential:
/// every call takes one explicitly.
#[derive(Debug, Clone)]
pub struct EngineClient {
    transport: EngineTransport,
}

impl EngineClient {
    pub fn new(settings: TransportSettings) -> Result<Self, EngineError> {
        Ok(Self {
            transport: EngineTransport::new(settings)?,
        })
    }

    pub fn from_config(config: &FlowctlConfig) -> Result<Self, EngineError> {
        let engine = &config.engine;
        Self::new(TransportSettings {
            base_url: engine.base_url.clone(),
            timeout: Duration::from_secs(engine.timeout_seconds),
            requests_per_second: engine.rate_limit.requests_per_second,
            burst: engine.rate_limit.burst,
            retry: RetryPolicy {
                max_attempts: config.retry.max_attempts.max(1),
                base_delay: Duration::from_millis(config.retry.base_delay_ms),
                max_delay: Duration::from_millis(config.retry.max_delay_ms),
                jitter: config.retry.jitter,
            },
        })
    }

    pub fn transport(&self) -> &EngineTransport {
        &self.transport
    }

    pub fn definitions(&self) -> DefinitionHandler<'_> {
        DefinitionHandler::new(&self.transport)
    }

    pub fn deployments(&self) -> DeploymentHandler<'_> {
        DeploymentHandler::new(&self.transport)
    }

    pub fn instances(&self) -> InstanceHandler<'_> {
        InstanceHandler::new(&self.transport)
    }

    pub fn tasks(&self) -> TaskHandler<'_> {
        TaskHandler::new(&self.transport)
    }

    pub fn decisions(&self) -> DecisionHandler<'_> {
        DecisionHandler::new(&self.transport)
    }

    pub fn forms(&self) -> FormHandler<'_> {
        FormHandler::new(&self.transport)
    }

    pub fn users(&self) -> UserHandler<'_> {
        UserHandler::new(&self.transport)
    }

    pub fn system(&self) -> SystemHandler<'_> {
        SystemHandler::new(&self.transport)
    }
}

#[async_trait]
impl LifecycleOps for EngineClient {
    async fn fetch_instance(&self, credential: &Credential, id: &str) -> Result<ProcessInstance, EngineError> {
        self.instances().get(credential, id).await
    }

    async fn suspend_instance(&self, credential: &Credential, id: &str) -> Result<(), EngineError> {
        self.instances().suspend(credential, id).await
    }

    async fn activate_instance(&self, credential: &Credential, id: &str) -> Result<(), EngineError> {
        self.instances().activate(credential, id).await
    }

    async fn terminate_instance(
        &self,
        credential: &Credential,
        id: &str,
        reason: Option<&str>,
    ) -> Result<(), EngineError> {
        self.instances().terminate(credential, id, reason).await
    }

    async fn fetch_task(&self, credential: &Credential, id: &str) -> Result<Task, EngineError> {
        self.tasks().get(credential, id).await
    }

    async fn claim_task(&self, credential: &Credential, id: &str) -> Result<(), EngineError> {
        self.tasks().claim(credential, id).await
    }

    async fn unclaim_task(&self, credential: &Credential, id: &str) -> Result<(), EngineError> {
        self.tasks().unclaim(credential, id).await
    }

    async fn complete_task(
        &self,
        credential: &Credential,
        id: &str,
        variables: &Variables,
    ) -> Result<(), EngineError> {
        self.tasks().complete(credential, id, variables).await
    }
}
