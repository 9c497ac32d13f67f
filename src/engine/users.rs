use reqwest::Method;
use tracing::info;

use super::errors::EngineError;
use super::page::{Page, PageRequest};
use super::types::{NewUser, User, UserUpdate};
use super::Credential;
use crate::http::client::{required, EngineTransport};

/// Handler for user administration.
#[derive(Debug, Clone, Copy)]
pub struct UserHandler<'a> {
    transport: &'a EngineTransport,
}

impl<'a> UserHandler<'a> {
    pub(crate) fn new(transport: &'a EngineTransport) -> Self {
        Self { transport }
    }

    pub async fn list(
        &self,
        credential: &Credential,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<Page<User>, EngineError> {
        let filters: Vec<(&str, String)> = search
            .map(|s| vec![("search", s.to_string())])
            .unwrap_or_default();
        self.transport.get_page(credential, &["users"], page, &filters).await
    }

    pub async fn get(&self, credential: &Credential, id: &str) -> Result<User, EngineError> {
        self.transport.get_json(credential, &["users", id], &[]).await
    }

    pub async fn create(&self, credential: &Credential, user: &NewUser) -> Result<User, EngineError> {
        let created = self
            .transport
            .send_json(Method::POST, credential, &["users"], &[], user)
            .await?;
        let created: User = required("POST /users", created)?;
        info!(user.id = %created.id, user.name = %created.username, "User created");
        Ok(created)
    }

    pub async fn update(&self, credential: &Credential, id: &str, update: &UserUpdate) -> Result<User, EngineError> {
        let updated = self
            .transport
            .send_json(Method::PUT, credential, &["users", id], &[], update)
            .await?;
        required("PUT /users/{id}", updated)
    }

    pub async fn delete(&self, credential: &Credential, id: &str) -> Result<(), EngineError> {
        self.transport
            .send_empty::<serde_json::Value>(Method::DELETE, credential, &["users", id], &[])
            .await?;
        info!(user.id = id, "User deleted");
        Ok(())
    }
}
