use serde_json::Value;
use thiserror::Error;

/// Broad class of an [`EngineError`], used by callers that only need to
/// decide how to present or react to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No usable response arrived (connection, DNS, TLS, timeout).
    Transport,
    /// The engine refused the credential; the caller must re-authenticate.
    Unauthorized,
    /// 4xx with a structured message that must be shown verbatim.
    Validation,
    /// 409/422: a lifecycle rule was violated.
    Conflict,
    /// 404: the entity was removed or never existed.
    NotFound,
    /// 5xx from the engine.
    Server,
    /// The response could not be understood, or contradicted the lifecycle contract.
    Contract,
    /// Local misconfiguration, nothing was sent.
    Client,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("network failure during {operation}: {source}")]
    Transport {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} timed out after {duration_ms}ms")]
    Timeout { operation: String, duration_ms: u64 },

    #[error("authentication required: {message}")]
    Unauthorized { message: String },

    #[error("permission denied: {message}")]
    Forbidden { message: String },

    #[error("{message}")]
    Validation { status: u16, message: String },

    #[error("{message}")]
    Conflict { status: u16, message: String },

    #[error("{resource} not found")]
    NotFound { resource: String, message: String },

    #[error("engine failure (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("unreadable response from {operation}: {message}")]
    Decode { operation: String, message: String },

    #[error("lifecycle contract violated: {0}")]
    ContractViolation(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl EngineError {
    /// Map a non-success HTTP response onto the error taxonomy.
    ///
    /// The engine's own message is preserved verbatim; when the body is not
    /// JSON the raw text is used instead.
    pub fn from_status(status: u16, body: &str, operation: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("HTTP {status} from {operation}")
            } else {
                body.trim().to_string()
            }
        });

        match status {
            401 => EngineError::Unauthorized { message },
            403 => EngineError::Forbidden { message },
            404 => EngineError::NotFound {
                resource: operation.to_string(),
                message,
            },
            409 | 422 => EngineError::Conflict { status, message },
            400..=499 => EngineError::Validation { status, message },
            _ => EngineError::Server { status, message },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Transport { .. } | EngineError::Timeout { .. } => ErrorKind::Transport,
            EngineError::Unauthorized { .. } => ErrorKind::Unauthorized,
            EngineError::Forbidden { .. } | EngineError::Validation { .. } => ErrorKind::Validation,
            EngineError::Conflict { .. } => ErrorKind::Conflict,
            EngineError::NotFound { .. } => ErrorKind::NotFound,
            EngineError::Server { .. } => ErrorKind::Server,
            EngineError::Decode { .. } | EngineError::ContractViolation(_) => ErrorKind::Contract,
            EngineError::Config(_) => ErrorKind::Client,
        }
    }

    /// True when the engine answered with a business outcome, as opposed to
    /// the request never completing.
    pub fn is_business(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Transport | ErrorKind::Client)
    }

    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Whether repeating the same idempotent request could succeed.
    /// State-changing calls are never retried regardless of this value.
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Transport { .. } | EngineError::Timeout { .. } => true,
            EngineError::Server { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    /// The engine-supplied message, when there is one.
    pub fn engine_message(&self) -> Option<&str> {
        match self {
            EngineError::Unauthorized { message }
            | EngineError::Forbidden { message }
            | EngineError::Validation { message, .. }
            | EngineError::Conflict { message, .. }
            | EngineError::NotFound { message, .. }
            | EngineError::Server { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Short operator-facing remedy printed under the error by the CLI.
    pub fn hint(&self) -> Option<&'static str> {
        match self.kind() {
            ErrorKind::Transport => Some("check engine.base_url and that the engine is reachable"),
            ErrorKind::Unauthorized => {
                Some("token rejected: log in again and export FLOWCTL_TOKEN=<token>")
            }
            ErrorKind::Conflict => Some("refresh the entity; the requested transition is not legal from its current state"),
            ErrorKind::NotFound => Some("the entity was removed or never existed"),
            ErrorKind::Client => Some("see flowctl.toml or FLOWCTL_* environment variables"),
            _ => None,
        }
    }

    pub(crate) fn transport(operation: &str, source: reqwest::Error, timeout_ms: u64) -> Self {
        if source.is_timeout() {
            EngineError::Timeout {
                operation: operation.to_string(),
                duration_ms: timeout_ms,
            }
        } else {
            EngineError::Transport {
                operation: operation.to_string(),
                source,
            }
        }
    }
}

/// Pull a human readable message out of an engine error body.
///
/// Recognises `message`, `error`, `detail` and an `errors` array whose
/// entries are strings or objects with `message`/`defaultMessage`.
fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    let headline = ["message", "detail", "error"]
        .iter()
        .find_map(|field| object.get(*field).and_then(Value::as_str))
        .map(str::to_string);

    let details: Vec<String> = object
        .get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(|entry| match entry {
                    Value::String(text) => Some(text.clone()),
                    Value::Object(map) => map
                        .get("message")
                        .or_else(|| map.get("defaultMessage"))
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    match (headline, details.is_empty()) {
        (Some(headline), true) => Some(headline),
        (Some(headline), false) => Some(format!("{headline}: {}", details.join("; "))),
        (None, false) => Some(details.join("; ")),
        (None, true) => None,
    }
}
