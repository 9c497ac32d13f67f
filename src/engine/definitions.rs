use reqwest::Method;
use tracing::info;

use super::errors::EngineError;
use super::page::{Page, PageRequest};
use super::types::{CountBody, ProcessDefinition, ProcessInstance, StartProcessRequest};
use super::Credential;
use crate::http::client::{required, EngineTransport};

/// Optional filters for listing process definitions.
#[derive(Debug, Clone, Default)]
pub struct DefinitionFilter {
    /// Substring of the definition key.
    pub key_like: Option<String>,
    /// Only the latest version of each key.
    pub latest_only: bool,
}

impl DefinitionFilter {
    fn is_empty(&self) -> bool {
        self.key_like.is_none() && !self.latest_only
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(key) = &self.key_like {
            query.push(("keyLike", key.clone()));
        }
        if self.latest_only {
            query.push(("latest", "true".to_string()));
        }
        query
    }
}

/// Handler for process definition operations
#[derive(Debug, Clone, Copy)]
pub struct DefinitionHandler<'a> {
    transport: &'a EngineTransport,
}

impl<'a> DefinitionHandler<'a> {
    pub(crate) fn new(transport: &'a EngineTransport) -> Self {
        Self { transport }
    }

    /// List definitions. When the engine omits the total and no filter is
    /// applied, the total comes from `/process-definitions/count`.
    pub async fn list(
        &self,
        credential: &Credential,
        page: PageRequest,
        filter: &DefinitionFilter,
    ) -> Result<Page<ProcessDefinition>, EngineError> {
        let mut result = self
            .transport
            .get_page(credential, &["process-definitions"], page, &filter.query())
            .await?;
        if result.total.is_none() && filter.is_empty() {
            result.total = Some(self.count(credential).await?);
        }
        Ok(result)
    }

    pub async fn count(&self, credential: &Credential) -> Result<u64, EngineError> {
        let body: CountBody = self
            .transport
            .get_json(credential, &["process-definitions", "count"], &[])
            .await?;
        Ok(body.count)
    }

    pub async fn get(&self, credential: &Credential, id: &str) -> Result<ProcessDefinition, EngineError> {
        self.transport
            .get_json(credential, &["process-definitions", id], &[])
            .await
    }

    /// Latest version for a key.
    pub async fn get_by_key(
        &self,
        credential: &Credential,
        key: &str,
    ) -> Result<ProcessDefinition, EngineError> {
        self.transport
            .get_json(credential, &["process-definitions", "key", key], &[])
            .await
    }

    /// BPMN XML of a deployed definition.
    pub async fn xml(&self, credential: &Credential, id: &str) -> Result<String, EngineError> {
        self.transport
            .get_text(credential, &["process-definitions", id, "xml"])
            .await
    }

    /// Start a new instance of the latest definition with `key`.
    pub async fn start_by_key(
        &self,
        credential: &Credential,
        key: &str,
        request: &StartProcessRequest,
    ) -> Result<ProcessInstance, EngineError> {
        let segments = ["process-definitions", "key", key, "start"];
        let instance = self
            .transport
            .send_json(Method::POST, credential, &segments, &[], request)
            .await?;
        let instance: ProcessInstance = required("POST /process-definitions/key/{key}/start", instance)?;
        info!(
            process.key = key,
            instance.id = %instance.id,
            business_key = ?request.business_key,
            "Started process instance"
        );
        Ok(instance)
    }
}
