use reqwest::Method;
use serde::Serialize;
use tracing::info;

use super::errors::EngineError;
use super::page::{Page, PageRequest};
use super::types::{Form, FormDraft, FormSubmission, ValidationReport, Variables};
use super::Credential;
use crate::http::client::{required, EngineTransport};

#[derive(Debug, Serialize)]
struct DataBody<'d> {
    data: &'d Variables,
}

/// Handler for form definitions and submissions.
#[derive(Debug, Clone, Copy)]
pub struct FormHandler<'a> {
    transport: &'a EngineTransport,
}

impl<'a> FormHandler<'a> {
    pub(crate) fn new(transport: &'a EngineTransport) -> Self {
        Self { transport }
    }

    pub async fn list(&self, credential: &Credential, page: PageRequest) -> Result<Page<Form>, EngineError> {
        self.transport.get_page(credential, &["forms"], page, &[]).await
    }

    pub async fn get(&self, credential: &Credential, id: &str) -> Result<Form, EngineError> {
        self.transport.get_json(credential, &["forms", id], &[]).await
    }

    /// Every version published under `key`.
    pub async fn get_by_key(&self, credential: &Credential, key: &str) -> Result<Vec<Form>, EngineError> {
        self.transport.get_json(credential, &["forms", "key", key], &[]).await
    }

    pub async fn latest(&self, credential: &Credential, key: &str) -> Result<Form, EngineError> {
        self.transport
            .get_json(credential, &["forms", "key", key, "latest"], &[])
            .await
    }

    /// Form referenced by a task's form key, resolved by the engine.
    pub async fn for_task(&self, credential: &Credential, task_id: &str) -> Result<Form, EngineError> {
        self.transport
            .get_json(credential, &["forms", "task", task_id], &[])
            .await
    }

    pub async fn create(&self, credential: &Credential, draft: &FormDraft) -> Result<Form, EngineError> {
        let form = self
            .transport
            .send_json(Method::POST, credential, &["forms"], &[], draft)
            .await?;
        let form: Form = required("POST /forms", form)?;
        info!(form.id = %form.id, form.key = %form.key, "Form created");
        Ok(form)
    }

    pub async fn update(&self, credential: &Credential, id: &str, draft: &FormDraft) -> Result<Form, EngineError> {
        let form = self
            .transport
            .send_json(Method::PUT, credential, &["forms", id], &[], draft)
            .await?;
        required("PUT /forms/{id}", form)
    }

    pub async fn delete(&self, credential: &Credential, id: &str) -> Result<(), EngineError> {
        self.transport
            .send_empty::<serde_json::Value>(Method::DELETE, credential, &["forms", id], &[])
            .await?;
        info!(form.id = id, "Form deleted");
        Ok(())
    }

    pub async fn publish(&self, credential: &Credential, id: &str) -> Result<Form, EngineError> {
        let form = self
            .transport
            .send_empty(Method::POST, credential, &["forms", id, "publish"], &[])
            .await?;
        let form: Form = required("POST /forms/{id}/publish", form)?;
        info!(form.id = id, form.version = form.version, "Form published");
        Ok(form)
    }

    pub async fn submit(
        &self,
        credential: &Credential,
        id: &str,
        data: &Variables,
    ) -> Result<FormSubmission, EngineError> {
        let submission = self
            .transport
            .send_json(Method::POST, credential, &["forms", id, "submit"], &[], &DataBody { data })
            .await?;
        required("POST /forms/{id}/submit", submission)
    }

    /// Server-side validation of `data` against the form schema.
    pub async fn validate(
        &self,
        credential: &Credential,
        id: &str,
        data: &Variables,
    ) -> Result<ValidationReport, EngineError> {
        let report = self
            .transport
            .send_json(Method::POST, credential, &["forms", id, "validate"], &[], &DataBody { data })
            .await?;
        required("POST /forms/{id}/validate", report)
    }
}
