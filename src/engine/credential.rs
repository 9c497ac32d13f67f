use std::fmt;

/// Request-scoped authentication for a single caller.
///
/// Every engine call takes a `&Credential` explicitly; the client itself
/// holds no token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: Option<String>,
    user_id: Option<String>,
}

impl Credential {
    /// Bearer token credential.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            user_id: None,
        }
    }

    /// No `Authorization` header. Only useful for public endpoints such as
    /// published forms and health checks.
    pub fn anonymous() -> Self {
        Self {
            token: None,
            user_id: None,
        }
    }

    /// Attach the user id the token belongs to. The engine remains the
    /// authority on identity; this is only used to check claim results.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.token.is_none()
    }

    pub(crate) fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user_id", &self.user_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_never_prints_token() {
        let credential = Credential::bearer("s3cr3t").with_user("alice");
        let printed = format!("{credential:?}");
        assert!(!printed.contains("s3cr3t"));
        assert!(printed.contains("alice"));
    }

    #[test]
    fn test_anonymous() {
        assert!(Credential::anonymous().is_anonymous());
        assert!(!Credential::bearer("t").is_anonymous());
    }
}
