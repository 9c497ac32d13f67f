use reqwest::Method;
use serde::Serialize;
use tracing::info;

use super::errors::EngineError;
use super::page::{Page, PageRequest};
use super::types::{Decision, DecisionExecution, DeploymentReceipt, ValidationReport, Variables};
use super::Credential;
use crate::http::client::{required, EngineTransport};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DecisionDeployRequest<'r> {
    name: &'r str,
    dmn_xml: &'r str,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'r str>,
}

/// Handler for DMN decision operations. Decisions follow the same
/// deploy/supersede lifecycle as process definitions.
#[derive(Debug, Clone, Copy)]
pub struct DecisionHandler<'a> {
    transport: &'a EngineTransport,
}

impl<'a> DecisionHandler<'a> {
    pub(crate) fn new(transport: &'a EngineTransport) -> Self {
        Self { transport }
    }

    pub async fn list(&self, credential: &Credential, page: PageRequest) -> Result<Page<Decision>, EngineError> {
        self.transport.get_page(credential, &["decisions"], page, &[]).await
    }

    pub async fn get(&self, credential: &Credential, id: &str) -> Result<Decision, EngineError> {
        self.transport.get_json(credential, &["decisions", id], &[]).await
    }

    pub async fn get_by_key(&self, credential: &Credential, key: &str) -> Result<Decision, EngineError> {
        self.transport
            .get_json(credential, &["decisions", "key", key], &[])
            .await
    }

    pub async fn xml(&self, credential: &Credential, id: &str) -> Result<String, EngineError> {
        self.transport.get_text(credential, &["decisions", id, "xml"]).await
    }

    /// Deploy a DMN document. Engine parse errors are returned verbatim.
    pub async fn deploy(
        &self,
        credential: &Credential,
        name: &str,
        dmn_xml: &str,
        category: Option<&str>,
    ) -> Result<DeploymentReceipt, EngineError> {
        let body = DecisionDeployRequest {
            name,
            dmn_xml,
            category,
        };
        let receipt = self
            .transport
            .send_json(Method::POST, credential, &["decisions", "deploy"], &[], &body)
            .await?;
        let receipt: DeploymentReceipt = required("POST /decisions/deploy", receipt)?;
        info!(deployment.id = %receipt.id, decision.name = name, "Decision deployed");
        Ok(receipt)
    }

    pub async fn delete_deployment(&self, credential: &Credential, deployment_id: &str) -> Result<(), EngineError> {
        self.transport
            .send_empty::<serde_json::Value>(
                Method::DELETE,
                credential,
                &["decisions", "deployments", deployment_id],
                &[],
            )
            .await?;
        info!(deployment.id = deployment_id, "Decision deployment deleted");
        Ok(())
    }

    /// Evaluate the latest version of a decision against `inputs`.
    pub async fn execute_by_key(
        &self,
        credential: &Credential,
        key: &str,
        inputs: &Variables,
    ) -> Result<DecisionExecution, EngineError> {
        let execution = self
            .transport
            .send_json(Method::POST, credential, &["decisions", "key", key, "execute"], &[], inputs)
            .await?;
        required("POST /decisions/key/{key}/execute", execution)
    }

    /// Validate DMN XML without deploying it.
    pub async fn validate(&self, credential: &Credential, dmn_xml: &str) -> Result<ValidationReport, EngineError> {
        let report = self
            .transport
            .send_text(credential, &["decisions", "validate"], dmn_xml.to_string(), "application/xml")
            .await?;
        required("POST /decisions/validate", report)
    }
}
