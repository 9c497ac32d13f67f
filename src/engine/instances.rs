use reqwest::Method;
use tracing::info;

use super::errors::EngineError;
use super::page::{Page, PageRequest};
use super::types::{CountBody, HistoryEntry, InstanceStatus, ProcessInstance, Variables};
use super::Credential;
use crate::http::client::EngineTransport;

/// Optional filters for listing process instances.
#[derive(Debug, Clone, Default)]
pub struct InstanceFilter {
    pub status: Option<InstanceStatus>,
    /// Substring of the process definition key.
    pub process_key: Option<String>,
}

impl InstanceFilter {
    fn is_empty(&self) -> bool {
        self.status.is_none() && self.process_key.is_none()
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(status) = self.status {
            query.push(("status", status.as_str().to_string()));
        }
        if let Some(key) = &self.process_key {
            query.push(("processKey", key.clone()));
        }
        query
    }
}

/// Handler for process instance operations.
///
/// These are the raw engine calls: each transition is one request, sent once,
/// with no local prediction. [`crate::lifecycle::LifecycleCoordinator`] adds
/// the refresh-and-verify contract on top.
#[derive(Debug, Clone, Copy)]
pub struct InstanceHandler<'a> {
    transport: &'a EngineTransport,
}

impl<'a> InstanceHandler<'a> {
    pub(crate) fn new(transport: &'a EngineTransport) -> Self {
        Self { transport }
    }

    /// List instances. The `/count` endpoint counts every instance, so it is
    /// only consulted for unfiltered listings.
    pub async fn list(
        &self,
        credential: &Credential,
        page: PageRequest,
        filter: &InstanceFilter,
    ) -> Result<Page<ProcessInstance>, EngineError> {
        let mut result = self
            .transport
            .get_page(credential, &["process-instances"], page, &filter.query())
            .await?;
        if result.total.is_none() && filter.is_empty() {
            result.total = Some(self.count(credential).await?);
        }
        Ok(result)
    }

    pub async fn count(&self, credential: &Credential) -> Result<u64, EngineError> {
        let body: CountBody = self
            .transport
            .get_json(credential, &["process-instances", "count"], &[])
            .await?;
        Ok(body.count)
    }

    pub async fn get(&self, credential: &Credential, id: &str) -> Result<ProcessInstance, EngineError> {
        self.transport
            .get_json(credential, &["process-instances", id], &[])
            .await
    }

    pub async fn variables(&self, credential: &Credential, id: &str) -> Result<Variables, EngineError> {
        self.transport
            .get_json(credential, &["process-instances", id, "variables"], &[])
            .await
    }

    pub async fn set_variables(
        &self,
        credential: &Credential,
        id: &str,
        variables: &Variables,
    ) -> Result<(), EngineError> {
        self.transport
            .send_json::<_, serde_json::Value>(
                Method::PUT,
                credential,
                &["process-instances", id, "variables"],
                &[],
                variables,
            )
            .await?;
        info!(instance.id = id, count = variables.len(), "Instance variables updated");
        Ok(())
    }

    pub async fn history(&self, credential: &Credential, id: &str) -> Result<Vec<HistoryEntry>, EngineError> {
        self.transport
            .get_json(credential, &["process-instances", id, "history"], &[])
            .await
    }

    pub async fn suspend(&self, credential: &Credential, id: &str) -> Result<(), EngineError> {
        self.action(credential, id, "suspend").await
    }

    pub async fn activate(&self, credential: &Credential, id: &str) -> Result<(), EngineError> {
        self.action(credential, id, "activate").await
    }

    /// Terminate (DELETE) an instance with an optional reason.
    pub async fn terminate(
        &self,
        credential: &Credential,
        id: &str,
        reason: Option<&str>,
    ) -> Result<(), EngineError> {
        let query: Vec<(&str, String)> = reason
            .map(|r| vec![("reason", r.to_string())])
            .unwrap_or_default();
        self.transport
            .send_empty::<serde_json::Value>(
                Method::DELETE,
                credential,
                &["process-instances", id],
                &query,
            )
            .await?;
        info!(instance.id = id, reason = ?reason, "Terminate accepted by engine");
        Ok(())
    }

    async fn action(&self, credential: &Credential, id: &str, action: &str) -> Result<(), EngineError> {
        self.transport
            .send_empty::<serde_json::Value>(
                Method::POST,
                credential,
                &["process-instances", id, action],
                &[],
            )
            .await?;
        info!(instance.id = id, action, "Instance action accepted by engine");
        Ok(())
    }
}
