use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use tracing::info;

use super::errors::EngineError;
use super::page::{Page, PageRequest};
use super::types::{CountBody, Deployment, DeploymentReceipt, DeploymentResource};
use super::Credential;
use crate::http::client::{required, EngineTransport};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct XmlDeployRequest<'r> {
    name: &'r str,
    bpmn_xml: &'r str,
    resource_name: &'r str,
}

/// Handler for deployment operations
#[derive(Debug, Clone, Copy)]
pub struct DeploymentHandler<'a> {
    transport: &'a EngineTransport,
}

impl<'a> DeploymentHandler<'a> {
    pub(crate) fn new(transport: &'a EngineTransport) -> Self {
        Self { transport }
    }

    pub async fn list(
        &self,
        credential: &Credential,
        page: PageRequest,
    ) -> Result<Page<Deployment>, EngineError> {
        let mut result = self
            .transport
            .get_page(credential, &["deployments"], page, &[])
            .await?;
        if result.total.is_none() {
            result.total = Some(self.count(credential).await?);
        }
        Ok(result)
    }

    pub async fn count(&self, credential: &Credential) -> Result<u64, EngineError> {
        let body: CountBody = self
            .transport
            .get_json(credential, &["deployments", "count"], &[])
            .await?;
        Ok(body.count)
    }

    pub async fn get(&self, credential: &Credential, id: &str) -> Result<Deployment, EngineError> {
        self.transport.get_json(credential, &["deployments", id], &[]).await
    }

    /// Names of the resources bundled in a deployment.
    pub async fn resources(&self, credential: &Credential, id: &str) -> Result<Vec<String>, EngineError> {
        self.transport
            .get_json(credential, &["deployments", id, "resources"], &[])
            .await
    }

    /// Upload one or more resources as a multipart form (`name` + `files`).
    ///
    /// Resources are sent verbatim. Engine validation failures, such as
    /// malformed diagram XML, come back as [`EngineError::Validation`] with
    /// the engine's own message.
    pub async fn deploy(
        &self,
        credential: &Credential,
        name: &str,
        resources: &[DeploymentResource],
    ) -> Result<DeploymentReceipt, EngineError> {
        if resources.is_empty() {
            return Err(EngineError::Config(
                "a deployment needs at least one resource".to_string(),
            ));
        }

        let mut form = Form::new().text("name", name.to_string());
        for resource in resources {
            let part = Part::text(resource.content.clone())
                .file_name(resource.name.clone())
                .mime_str(resource.content_type())
                .map_err(|e| EngineError::Config(format!("bad content type: {e}")))?;
            form = form.part("files", part);
        }

        let receipt = self
            .transport
            .send_multipart(credential, &["deployments"], form)
            .await?;
        let receipt: DeploymentReceipt = required("POST /deployments", receipt)?;
        info!(
            deployment.id = %receipt.id,
            deployment.name = name,
            resources = resources.len(),
            "Deployment created"
        );
        Ok(receipt)
    }

    /// Deploy a single BPMN document as JSON (`name` + `bpmnXml`).
    pub async fn deploy_xml(
        &self,
        credential: &Credential,
        name: &str,
        resource: &DeploymentResource,
    ) -> Result<DeploymentReceipt, EngineError> {
        let body = XmlDeployRequest {
            name,
            bpmn_xml: &resource.content,
            resource_name: &resource.name,
        };
        let receipt = self
            .transport
            .send_json(Method::POST, credential, &["deployments"], &[], &body)
            .await?;
        let receipt: DeploymentReceipt = required("POST /deployments", receipt)?;
        info!(deployment.id = %receipt.id, deployment.name = name, "Deployment created");
        Ok(receipt)
    }

    /// Delete a deployment. With `cascade == false` the engine refuses while
    /// definitions or instances still reference it.
    pub async fn delete(&self, credential: &Credential, id: &str, cascade: bool) -> Result<(), EngineError> {
        self.transport
            .send_empty::<serde_json::Value>(
                Method::DELETE,
                credential,
                &["deployments", id],
                &[("cascade", cascade.to_string())],
            )
            .await?;
        info!(deployment.id = id, cascade, "Deployment deleted");
        Ok(())
    }
}
