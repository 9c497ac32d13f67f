use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use tracing::info;

use super::errors::EngineError;
use super::page::{Page, PageRequest};
use super::types::{Task, TaskAttachment, TaskComment, Variables};
use super::Credential;
use crate::http::client::{required, EngineTransport};

/// Optional filters for the general task query.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub assignee: Option<String>,
    pub candidate_user: Option<String>,
    pub process_instance_id: Option<String>,
    /// Substring of the task name.
    pub name_like: Option<String>,
    /// Only tasks without an assignee.
    pub unassigned: bool,
}

impl TaskFilter {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(value) = &self.assignee {
            query.push(("assignee", value.clone()));
        }
        if let Some(value) = &self.candidate_user {
            query.push(("candidateUser", value.clone()));
        }
        if let Some(value) = &self.process_instance_id {
            query.push(("processInstanceId", value.clone()));
        }
        if let Some(value) = &self.name_like {
            query.push(("nameLike", value.clone()));
        }
        if self.unassigned {
            query.push(("unassigned", "true".to_string()));
        }
        query
    }
}

#[derive(Debug, Serialize)]
struct CommentBody<'m> {
    message: &'m str,
}

/// Handler for user task operations.
///
/// Claim, unclaim and complete are single engine calls. The engine enforces
/// who may perform them; nothing here assumes the outcome.
#[derive(Debug, Clone, Copy)]
pub struct TaskHandler<'a> {
    transport: &'a EngineTransport,
}

impl<'a> TaskHandler<'a> {
    pub(crate) fn new(transport: &'a EngineTransport) -> Self {
        Self { transport }
    }

    pub async fn list(
        &self,
        credential: &Credential,
        page: PageRequest,
        filter: &TaskFilter,
    ) -> Result<Page<Task>, EngineError> {
        self.transport
            .get_page(credential, &["tasks"], page, &filter.query())
            .await
    }

    /// Tasks assigned to the caller.
    pub async fn inbox(&self, credential: &Credential, page: PageRequest) -> Result<Page<Task>, EngineError> {
        self.transport
            .get_page(credential, &["tasks", "inbox"], page, &[])
            .await
    }

    /// Unassigned tasks the caller is a candidate for.
    pub async fn claimable(
        &self,
        credential: &Credential,
        page: PageRequest,
    ) -> Result<Page<Task>, EngineError> {
        self.transport
            .get_page(credential, &["tasks", "claimable"], page, &[])
            .await
    }

    pub async fn get(&self, credential: &Credential, id: &str) -> Result<Task, EngineError> {
        self.transport.get_json(credential, &["tasks", id], &[]).await
    }

    pub async fn variables(&self, credential: &Credential, id: &str) -> Result<Variables, EngineError> {
        self.transport
            .get_json(credential, &["tasks", id, "variables"], &[])
            .await
    }

    pub async fn set_variables(
        &self,
        credential: &Credential,
        id: &str,
        variables: &Variables,
    ) -> Result<(), EngineError> {
        self.transport
            .send_json::<_, serde_json::Value>(Method::PUT, credential, &["tasks", id, "variables"], &[], variables)
            .await?;
        Ok(())
    }

    /// Claim for the caller.
    ///
    /// Whatever body the engine answers with is discarded; callers re-fetch
    /// the task to see its state.
    pub async fn claim(&self, credential: &Credential, id: &str) -> Result<(), EngineError> {
        self.transport
            .send_empty::<serde_json::Value>(Method::POST, credential, &["tasks", id, "claim"], &[])
            .await?;
        info!(task.id = id, user = ?credential.user_id(), "Claim accepted by engine");
        Ok(())
    }

    pub async fn unclaim(&self, credential: &Credential, id: &str) -> Result<(), EngineError> {
        self.transport
            .send_empty::<serde_json::Value>(Method::POST, credential, &["tasks", id, "unclaim"], &[])
            .await?;
        info!(task.id = id, "Unclaim accepted by engine");
        Ok(())
    }

    /// Complete with output variables, merged by the engine into the owning
    /// process instance.
    pub async fn complete(
        &self,
        credential: &Credential,
        id: &str,
        variables: &Variables,
    ) -> Result<(), EngineError> {
        self.transport
            .send_json::<_, serde_json::Value>(Method::POST, credential, &["tasks", id, "complete"], &[], variables)
            .await?;
        info!(task.id = id, variables = variables.len(), "Complete accepted by engine");
        Ok(())
    }

    pub async fn comments(&self, credential: &Credential, id: &str) -> Result<Vec<TaskComment>, EngineError> {
        self.transport
            .get_json(credential, &["tasks", id, "comments"], &[])
            .await
    }

    pub async fn add_comment(
        &self,
        credential: &Credential,
        id: &str,
        message: &str,
    ) -> Result<TaskComment, EngineError> {
        let comment = self
            .transport
            .send_json(
                Method::POST,
                credential,
                &["tasks", id, "comments"],
                &[],
                &CommentBody { message },
            )
            .await?;
        required("POST /tasks/{id}/comments", comment)
    }

    pub async fn attachments(
        &self,
        credential: &Credential,
        id: &str,
    ) -> Result<Vec<TaskAttachment>, EngineError> {
        self.transport
            .get_json(credential, &["tasks", id, "attachments"], &[])
            .await
    }

    pub async fn upload_attachment(
        &self,
        credential: &Credential,
        id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<TaskAttachment, EngineError> {
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_string()));
        let attachment = self
            .transport
            .send_multipart(credential, &["tasks", id, "attachments"], form)
            .await?;
        let attachment: TaskAttachment = required("POST /tasks/{id}/attachments", attachment)?;
        info!(task.id = id, attachment.id = %attachment.id, "Attachment uploaded");
        Ok(attachment)
    }
}
