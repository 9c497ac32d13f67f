// In-memory engine for lifecycle tests - no network

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;

use super::traits::LifecycleOps;
use crate::engine::types::{ProcessInstance, Task, Variables};
use crate::engine::{Credential, EngineError};

pub fn instance(id: &str, ended: bool, suspended: bool) -> ProcessInstance {
    let end_time = ended.then(|| Utc::now().to_rfc3339());
    serde_json::from_value(json!({
        "id": id,
        "processDefinitionKey": "order-fulfilment",
        "startTime": "2024-03-01T10:15:30Z",
        "endTime": end_time,
        "suspended": suspended,
    }))
    .unwrap()
}

pub fn task(id: &str, assignee: Option<&str>) -> Task {
    serde_json::from_value(json!({
        "id": id,
        "name": "Review order",
        "assignee": assignee,
        "processInstanceId": "inst-001",
    }))
    .unwrap()
}

fn conflict(message: String) -> EngineError {
    EngineError::Conflict {
        status: 409,
        message,
    }
}

fn not_found(what: &str, id: &str) -> EngineError {
    EngineError::NotFound {
        resource: format!("{what} {id}"),
        message: format!("No {what} found with id '{id}'"),
    }
}

/// Behaves like a well-mannered engine unless built with
/// [`MockEngine::permissive`], in which case every action answers 204 and
/// nothing changes.
#[derive(Debug, Default)]
pub struct MockEngine {
    permissive: bool,
    instances: Mutex<HashMap<String, ProcessInstance>>,
    tasks: Mutex<HashMap<String, Task>>,
    completions: Mutex<HashMap<String, Variables>>,
    calls: Mutex<Vec<String>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn permissive() -> Self {
        Self {
            permissive: true,
            ..Self::default()
        }
    }

    pub fn put_instance(&self, instance: ProcessInstance) {
        self.instances
            .lock()
            .unwrap()
            .insert(instance.id.clone(), instance);
    }

    pub fn put_task(&self, task: Task) {
        self.tasks.lock().unwrap().insert(task.id.clone(), task);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn completed_with(&self, task_id: &str) -> Option<Variables> {
        self.completions.lock().unwrap().get(task_id).cloned()
    }

    pub fn task_assignee(&self, task_id: &str) -> Option<String> {
        self.tasks
            .lock()
            .unwrap()
            .get(task_id)
            .and_then(|t| t.assignee.clone())
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn with_instance<F>(&self, id: &str, change: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut HashMap<String, ProcessInstance>) -> Result<(), EngineError>,
    {
        let mut instances = self.instances.lock().unwrap();
        if !instances.contains_key(id) {
            return Err(not_found("process instance", id));
        }
        if self.permissive {
            return Ok(());
        }
        change(&mut instances)
    }

    fn with_task<F>(&self, id: &str, change: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut HashMap<String, Task>) -> Result<(), EngineError>,
    {
        let mut tasks = self.tasks.lock().unwrap();
        if !tasks.contains_key(id) {
            return Err(not_found("task", id));
        }
        if self.permissive {
            return Ok(());
        }
        change(&mut tasks)
    }
}

#[async_trait]
impl LifecycleOps for MockEngine {
    async fn fetch_instance(&self, _credential: &Credential, id: &str) -> Result<ProcessInstance, EngineError> {
        self.record(format!("fetch_instance {id}"));
        self.instances
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("process instance", id))
    }

    async fn suspend_instance(&self, _credential: &Credential, id: &str) -> Result<(), EngineError> {
        self.record(format!("suspend {id}"));
        self.with_instance(id, |instances| {
            let instance = instances.get_mut(id).unwrap();
            if instance.end_time.is_some() {
                return Err(conflict(format!("Process instance {id} has already ended")));
            }
            if instance.suspended == Some(true) {
                return Err(conflict(format!("Process instance {id} is already suspended")));
            }
            instance.suspended = Some(true);
            Ok(())
        })
    }

    async fn activate_instance(&self, _credential: &Credential, id: &str) -> Result<(), EngineError> {
        self.record(format!("activate {id}"));
        self.with_instance(id, |instances| {
            let instance = instances.get_mut(id).unwrap();
            if instance.end_time.is_some() {
                return Err(conflict(format!("Process instance {id} has already ended")));
            }
            if instance.suspended != Some(true) {
                return Err(conflict(format!("Process instance {id} is not suspended")));
            }
            instance.suspended = Some(false);
            Ok(())
        })
    }

    async fn terminate_instance(
        &self,
        _credential: &Credential,
        id: &str,
        reason: Option<&str>,
    ) -> Result<(), EngineError> {
        match reason {
            Some(reason) => self.record(format!("terminate {id} reason={reason}")),
            None => self.record(format!("terminate {id}")),
        }
        self.with_instance(id, |instances| {
            if instances[id].end_time.is_some() {
                return Err(conflict(format!("Process instance {id} has already ended")));
            }
            instances.remove(id);
            Ok(())
        })
    }

    async fn fetch_task(&self, _credential: &Credential, id: &str) -> Result<Task, EngineError> {
        self.record(format!("fetch_task {id}"));
        self.tasks
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("task", id))
    }

    async fn claim_task(&self, credential: &Credential, id: &str) -> Result<(), EngineError> {
        self.record(format!("claim {id}"));
        let user = credential.user_id().unwrap_or("anonymous").to_string();
        self.with_task(id, |tasks| {
            let task = tasks.get_mut(id).unwrap();
            if let Some(current) = task.current_assignee() {
                return Err(conflict(format!("Task {id} is already claimed by {current}")));
            }
            task.assignee = Some(user);
            Ok(())
        })
    }

    async fn unclaim_task(&self, credential: &Credential, id: &str) -> Result<(), EngineError> {
        self.record(format!("unclaim {id}"));
        let user = credential.user_id().unwrap_or("anonymous").to_string();
        self.with_task(id, |tasks| {
            let task = tasks.get_mut(id).unwrap();
            if task.current_assignee() != Some(user.as_str()) {
                return Err(conflict(format!("Task {id} is not assigned to {user}")));
            }
            task.assignee = None;
            Ok(())
        })
    }

    async fn complete_task(
        &self,
        credential: &Credential,
        id: &str,
        variables: &Variables,
    ) -> Result<(), EngineError> {
        self.record(format!("complete {id}"));
        let user = credential.user_id().unwrap_or("anonymous").to_string();
        let result = self.with_task(id, |tasks| {
            match tasks[id].current_assignee() {
                None => return Err(conflict(format!("Task {id} must be claimed before completion"))),
                Some(assignee) if assignee != user => {
                    return Err(conflict(format!("Task {id} is assigned to {assignee}")))
                }
                Some(_) => {}
            }
            tasks.remove(id);
            Ok(())
        });
        if result.is_ok() && !self.permissive {
            self.completions
                .lock()
                .unwrap()
                .insert(id.to_string(), variables.clone());
        }
        result
    }
}
