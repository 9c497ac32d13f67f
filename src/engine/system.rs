use super::errors::EngineError;
use super::types::HealthStatus;
use super::Credential;
use crate::http::client::EngineTransport;

#[derive(Debug, Clone, Copy)]
pub struct SystemHandler<'a> {
    transport: &'a EngineTransport,
}

impl<'a> SystemHandler<'a> {
    pub(crate) fn new(transport: &'a EngineTransport) -> Self {
        Self { transport }
    }

    /// Spring actuator health, served under the API root.
    pub async fn health(&self, credential: &Credential) -> Result<HealthStatus, EngineError> {
        self.transport
            .get_json(credential, &["actuator", "health"], &[])
            .await
    }
}
