//! Wire models shared by every engine resource.
//!
//! Field names follow the engine's camelCase JSON. Unknown fields are
//! ignored so newer engine versions keep deserializing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Variables exchanged with the engine (process, task and form payloads).
pub type Variables = Map<String, Value>;

/// Observable status of a process instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceStatus {
    Running,
    Suspended,
    Completed,
    Terminated,
}

impl InstanceStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, InstanceStatus::Completed | InstanceStatus::Terminated)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InstanceStatus::Running => "RUNNING",
            InstanceStatus::Suspended => "SUSPENDED",
            InstanceStatus::Completed => "COMPLETED",
            InstanceStatus::Terminated => "TERMINATED",
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InstanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RUNNING" | "ACTIVE" => Ok(InstanceStatus::Running),
            "SUSPENDED" => Ok(InstanceStatus::Suspended),
            "COMPLETED" => Ok(InstanceStatus::Completed),
            "TERMINATED" | "CANCELLED" => Ok(InstanceStatus::Terminated),
            other => Err(format!("unknown instance status '{other}'")),
        }
    }
}

/// Observable status of a user task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Unassigned,
    Assigned,
    Completed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskStatus::Unassigned => "UNASSIGNED",
            TaskStatus::Assigned => "ASSIGNED",
            TaskStatus::Completed => "COMPLETED",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDefinition {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub version: i32,
    #[serde(default)]
    pub deployment_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub suspended: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "deploymentTime", deserialize_with = "timestamp::optional")]
    pub deployed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deployed_by: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInstance {
    pub id: String,
    #[serde(default)]
    pub process_definition_id: Option<String>,
    #[serde(default)]
    pub process_definition_key: Option<String>,
    #[serde(default)]
    pub process_definition_name: Option<String>,
    #[serde(default)]
    pub process_definition_version: Option<i32>,
    #[serde(default)]
    pub business_key: Option<String>,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_user_id: Option<String>,
    #[serde(default)]
    pub suspended: Option<bool>,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub variables: HashMap<String, Value>,
}

impl ProcessInstance {
    /// Status derived purely from `(endTime, suspended)`.
    ///
    /// Any `status` string the engine sends alongside is ignored.
    pub fn status(&self) -> InstanceStatus {
        if self.end_time.is_some() {
            InstanceStatus::Completed
        } else if self.suspended.unwrap_or(false) {
            InstanceStatus::Suspended
        } else {
            InstanceStatus::Running
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub claim_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub process_instance_id: Option<String>,
    #[serde(default)]
    pub process_definition_id: Option<String>,
    #[serde(default)]
    pub process_definition_key: Option<String>,
    #[serde(default)]
    pub form_key: Option<String>,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub candidate_users: Vec<String>,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub candidate_groups: Vec<String>,
    /// Engine-reported status. Only `COMPLETED` is meaningful to the client;
    /// assignment is read from `assignee`.
    #[serde(default)]
    pub status: Option<String>,
}

impl Task {
    /// Current assignee, treating an empty string as unassigned.
    pub fn current_assignee(&self) -> Option<&str> {
        self.assignee.as_deref().filter(|a| !a.trim().is_empty())
    }

    pub fn lifecycle_status(&self) -> TaskStatus {
        if self
            .status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("completed"))
        {
            TaskStatus::Completed
        } else if self.current_assignee().is_some() {
            TaskStatus::Assigned
        } else {
            TaskStatus::Unassigned
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub version: i32,
    #[serde(default)]
    pub deployment_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub version: i32,
    #[serde(default)]
    pub schema: Option<Value>,
    #[serde(default)]
    pub fields: Option<Value>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub roles: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskComment {
    #[serde(default)]
    pub id: Option<String>,
    pub message: String,
    #[serde(default, alias = "userId")]
    pub author: Option<String>,
    #[serde(default, alias = "time", deserialize_with = "timestamp::optional")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAttachment {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "type")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "time", deserialize_with = "timestamp::optional")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One entry of an instance's activity history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(default)]
    pub activity_id: Option<String>,
    #[serde(default)]
    pub activity_name: Option<String>,
    #[serde(default)]
    pub activity_type: Option<String>,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assignee: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionExecution {
    #[serde(default)]
    pub decision_key: Option<String>,
    #[serde(default, alias = "results", alias = "output")]
    pub result: Value,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub executed_at: Option<DateTime<Utc>>,
}

/// Outcome of a validate-without-deploy call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub errors: Vec<String>,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub form_id: Option<String>,
    #[serde(default)]
    pub data: Value,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub components: Option<Value>,
}

impl HealthStatus {
    pub fn is_up(&self) -> bool {
        self.status.eq_ignore_ascii_case("up")
    }
}

/// Response of a deploy call; only the assigned id is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentReceipt {
    #[serde(alias = "deploymentId")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `{"count": n}` bodies returned by `/count` endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct CountBody {
    pub count: u64,
}

// ----------------------------------------------------------------------------
// Request payloads
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartProcessRequest {
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub variables: Variables,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_key: Option<String>,
}

/// A named resource uploaded as part of a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentResource {
    pub name: String,
    pub content: String,
}

impl DeploymentResource {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// MIME type guessed from the resource name.
    pub fn content_type(&self) -> &'static str {
        let lower = self.name.to_ascii_lowercase();
        if lower.ends_with(".json") || lower.ends_with(".form") {
            "application/json"
        } else {
            "application/xml"
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDraft {
    pub key: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: Value,
}

/// The engine serializes unset collections and numbers as `null` rather
/// than omitting them.
pub mod nullable {
    use serde::{Deserialize, Deserializer};

    pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }
}

/// Lenient timestamp parsing.
///
/// Accepts RFC 3339 with an offset, or a naive ISO-8601 date-time which is
/// read as UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(text) if text.trim().is_empty() => Ok(None),
            Some(text) => parse(&text)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{text}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn instance(end_time: Option<&str>, suspended: Option<bool>) -> ProcessInstance {
        serde_json::from_value(json!({
            "id": "inst-001",
            "processDefinitionKey": "invoice",
            "endTime": end_time,
            "suspended": suspended,
        }))
        .unwrap()
    }

    #[test]
    fn test_status_is_derived_from_end_time_and_suspended() {
        assert_eq!(instance(None, Some(false)).status(), InstanceStatus::Running);
        assert_eq!(instance(None, None).status(), InstanceStatus::Running);
        assert_eq!(instance(None, Some(true)).status(), InstanceStatus::Suspended);
        assert_eq!(
            instance(Some("2024-03-01T10:15:30"), Some(true)).status(),
            InstanceStatus::Completed
        );
        assert_eq!(
            instance(Some("2024-03-01T10:15:30Z"), Some(false)).status(),
            InstanceStatus::Completed
        );
    }

    #[test]
    fn test_status_field_from_engine_is_ignored() {
        let inst: ProcessInstance = serde_json::from_value(json!({
            "id": "inst-002",
            "status": "COMPLETED",
            "suspended": true
        }))
        .unwrap();
        assert_eq!(inst.status(), InstanceStatus::Suspended);
    }

    #[test]
    fn test_status_invariant_holds_for_all_combinations() {
        for end in [None, Some("2024-01-01T00:00:00")] {
            for suspended in [None, Some(false), Some(true)] {
                let inst = instance(end, suspended);
                let status = inst.status();
                assert_eq!(status == InstanceStatus::Completed, inst.end_time.is_some());
                assert_eq!(
                    status == InstanceStatus::Suspended,
                    inst.end_time.is_none() && suspended == Some(true)
                );
            }
        }
    }

    #[test]
    fn test_task_assignee_empty_string_is_unassigned() {
        let task: Task = serde_json::from_value(json!({"id": "t1", "assignee": ""})).unwrap();
        assert_eq!(task.current_assignee(), None);
        assert_eq!(task.lifecycle_status(), TaskStatus::Unassigned);

        let task: Task = serde_json::from_value(json!({"id": "t1", "assignee": "alice"})).unwrap();
        assert_eq!(task.lifecycle_status(), TaskStatus::Assigned);

        let task: Task =
            serde_json::from_value(json!({"id": "t1", "assignee": "alice", "status": "COMPLETED"}))
                .unwrap();
        assert_eq!(task.lifecycle_status(), TaskStatus::Completed);
    }

    #[test]
    fn test_deployment_accepts_deployment_time_alias() {
        let deployment: Deployment = serde_json::from_value(json!({
            "id": "dep-1",
            "name": "invoice",
            "deploymentTime": "2024-05-02T08:00:00.123+02:00"
        }))
        .unwrap();
        assert_eq!(
            deployment.deployed_at.unwrap().to_rfc3339(),
            "2024-05-02T06:00:00.123+00:00"
        );
    }

    #[test]
    fn test_bad_timestamp_is_rejected() {
        let result: Result<ProcessInstance, _> =
            serde_json::from_value(json!({"id": "x", "startTime": "yesterday"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_nulls_read_as_empty() {
        let inst: ProcessInstance = serde_json::from_value(json!({
            "id": "inst-001",
            "endTime": null,
            "suspended": null,
            "variables": null
        }))
        .unwrap();
        assert!(inst.variables.is_empty());
        assert_eq!(inst.status(), InstanceStatus::Running);

        let task: Task = serde_json::from_value(json!({
            "id": "task-1",
            "assignee": null,
            "candidateUsers": null,
            "candidateGroups": null,
            "dueDate": null
        }))
        .unwrap();
        assert!(task.candidate_users.is_empty());
        assert!(task.candidate_groups.is_empty());
        assert_eq!(task.lifecycle_status(), TaskStatus::Unassigned);

        let user: User =
            serde_json::from_value(json!({"id": "u1", "username": "alice", "roles": null})).unwrap();
        assert!(user.roles.is_empty());

        let deployment: Deployment =
            serde_json::from_value(json!({"id": "dep-1", "resources": null})).unwrap();
        assert!(deployment.resources.is_empty());

        let report: ValidationReport =
            serde_json::from_value(json!({"valid": true, "errors": null, "warnings": null})).unwrap();
        assert!(report.errors.is_empty() && report.warnings.is_empty());
    }

    #[test]
    fn test_null_versions_read_as_zero() {
        let definition: ProcessDefinition =
            serde_json::from_value(json!({"id": "orders:1:10", "key": "orders", "version": null})).unwrap();
        assert_eq!(definition.version, 0);

        let decision: Decision =
            serde_json::from_value(json!({"id": "risk:1", "key": "risk", "version": null})).unwrap();
        assert_eq!(decision.version, 0);

        let form: Form =
            serde_json::from_value(json!({"id": "f1", "key": "approval", "version": null})).unwrap();
        assert_eq!(form.version, 0);
    }

    #[test]
    fn test_instance_status_parsing() {
        assert_eq!("suspended".parse::<InstanceStatus>(), Ok(InstanceStatus::Suspended));
        assert_eq!("CANCELLED".parse::<InstanceStatus>(), Ok(InstanceStatus::Terminated));
        assert!("paused".parse::<InstanceStatus>().is_err());
    }

    #[test]
    fn test_resource_content_type() {
        assert_eq!(DeploymentResource::new("a.bpmn20.xml", "").content_type(), "application/xml");
        assert_eq!(DeploymentResource::new("order.form.json", "").content_type(), "application/json");
    }
}
