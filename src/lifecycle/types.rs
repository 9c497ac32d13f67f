use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::types::{InstanceStatus, ProcessInstance, Task, TaskStatus};

/// A client-triggered process instance transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstanceAction {
    Suspend,
    Activate,
    Terminate { reason: Option<String> },
}

impl InstanceAction {
    pub fn name(&self) -> &'static str {
        match self {
            InstanceAction::Suspend => "suspend",
            InstanceAction::Activate => "activate",
            InstanceAction::Terminate { .. } => "terminate",
        }
    }
}

/// A client-triggered task transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskAction {
    Claim,
    Unclaim,
    Complete,
}

impl TaskAction {
    pub fn name(self) -> &'static str {
        match self {
            TaskAction::Claim => "claim",
            TaskAction::Unclaim => "unclaim",
            TaskAction::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot {action}: entity is {from}, which is terminal")]
    Terminal { from: String, action: &'static str },

    #[error("cannot {action} from {from}")]
    Illegal { from: String, action: &'static str },

    #[error("only the assignee ({assignee}) may {action}; caller is {caller}")]
    NotAssignee {
        action: &'static str,
        assignee: String,
        caller: String,
    },

    #[error("cannot {action} before the entity has been fetched")]
    Unobserved { action: &'static str },
}

/// Result of a refreshed process instance transition.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceTransition {
    pub instance_id: String,
    pub from: InstanceStatus,
    /// Status observed after the refresh, not the predicted one.
    pub to: InstanceStatus,
    /// `None` once the engine no longer returns the instance.
    pub instance: Option<ProcessInstance>,
}

/// Result of a refreshed task transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskTransition {
    pub task_id: String,
    pub from: TaskStatus,
    pub to: TaskStatus,
    /// `None` once the task left the active task list.
    pub task: Option<Task>,
}
