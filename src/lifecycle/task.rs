use statig::prelude::*;
use std::fmt;
use tracing::debug;

use super::types::{TaskAction, TransitionError};
use crate::engine::types::{Task, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    Refreshed {
        status: TaskStatus,
        assignee: Option<String>,
    },
    Claim {
        user: String,
    },
    Unclaim {
        user: String,
    },
    Complete {
        user: String,
    },
}

impl TaskEvent {
    fn for_action(action: TaskAction, user: &str) -> Self {
        let user = user.to_string();
        match action {
            TaskAction::Claim => TaskEvent::Claim { user },
            TaskAction::Unclaim => TaskEvent::Unclaim { user },
            TaskAction::Complete => TaskEvent::Complete { user },
        }
    }
}

/// Legal task transitions: UNASSIGNED → ASSIGNED (claim),
/// ASSIGNED → UNASSIGNED (unclaim), ASSIGNED → COMPLETED (complete).
/// Unclaim and complete are reserved to the current assignee.
#[derive(Debug, Default)]
pub struct TaskLifecycle {
    pub task_id: String,
}

#[state_machine(
    initial = "State::unobserved()",
    state(derive(Debug, Clone, PartialEq, Eq))
)]
impl TaskLifecycle {
    #[state]
    fn unobserved(&mut self, event: &TaskEvent) -> Outcome<State> {
        match event {
            TaskEvent::Refreshed { status, assignee } => self.follow(*status, assignee.as_deref()),
            _ => Handled,
        }
    }

    #[state]
    fn unassigned(&mut self, event: &TaskEvent) -> Outcome<State> {
        match event {
            TaskEvent::Claim { user } => {
                debug!(task.id = %self.task_id, user = %user, "Claim");
                Transition(State::assigned(user.clone()))
            }
            TaskEvent::Refreshed { status, assignee } => self.follow(*status, assignee.as_deref()),
            _ => Handled,
        }
    }

    #[state]
    fn assigned(&mut self, assignee: &mut String, event: &TaskEvent) -> Outcome<State> {
        match event {
            TaskEvent::Unclaim { user } if user.as_str() == assignee.as_str() => {
                Transition(State::unassigned())
            }
            TaskEvent::Complete { user } if user.as_str() == assignee.as_str() => {
                Transition(State::completed())
            }
            TaskEvent::Refreshed { status, assignee } => self.follow(*status, assignee.as_deref()),
            _ => Handled,
        }
    }

    #[state]
    fn completed(&mut self, event: &TaskEvent) -> Outcome<State> {
        match event {
            TaskEvent::Refreshed { status, assignee } => self.follow(*status, assignee.as_deref()),
            _ => Handled,
        }
    }
}

impl TaskLifecycle {
    fn follow(&self, status: TaskStatus, assignee: Option<&str>) -> Outcome<State> {
        debug!(task.id = %self.task_id, %status, assignee = ?assignee, "Following engine-reported task");
        Transition(match (status, assignee) {
            (TaskStatus::Completed, _) => State::completed(),
            (TaskStatus::Assigned, Some(user)) => State::assigned(user.to_string()),
            _ => State::unassigned(),
        })
    }
}

fn status_of(state: &State) -> Option<TaskStatus> {
    match state {
        State::Unobserved { .. } => None,
        State::Unassigned { .. } => Some(TaskStatus::Unassigned),
        State::Assigned { .. } => Some(TaskStatus::Assigned),
        State::Completed { .. } => Some(TaskStatus::Completed),
    }
}

/// Local view of one task's lifecycle, driven by engine refreshes.
pub struct TaskTracker {
    machine: StateMachine<TaskLifecycle>,
}

impl TaskTracker {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            machine: TaskLifecycle {
                task_id: task_id.into(),
            }
            .state_machine(),
        }
    }

    /// Tracker positioned at the state of a fetched task.
    pub fn from_task(task: &Task) -> Self {
        let mut tracker = Self::new(task.id.clone());
        tracker.observe(task);
        tracker
    }

    pub fn observe(&mut self, task: &Task) {
        self.machine.handle(&TaskEvent::Refreshed {
            status: task.lifecycle_status(),
            assignee: task.current_assignee().map(str::to_string),
        });
    }

    pub fn status(&self) -> Option<TaskStatus> {
        status_of(self.machine.state())
    }

    pub fn assignee(&self) -> Option<&str> {
        match self.machine.state() {
            State::Assigned { assignee } => Some(assignee.as_str()),
            _ => None,
        }
    }

    /// Check `action` by `user` against the contract and advance the local
    /// view when it is legal.
    pub fn apply(&mut self, action: TaskAction, user: &str) -> Result<TaskStatus, TransitionError> {
        let name = action.name();
        let before = self.machine.state().clone();
        let from = status_of(&before).ok_or(TransitionError::Unobserved { action: name })?;
        if from == TaskStatus::Completed {
            return Err(TransitionError::Terminal {
                from: from.to_string(),
                action: name,
            });
        }

        self.machine.handle(&TaskEvent::for_action(action, user));

        if *self.machine.state() != before {
            if let Some(to) = self.status() {
                return Ok(to);
            }
        }

        Err(match (&before, action) {
            (State::Assigned { assignee }, TaskAction::Unclaim | TaskAction::Complete)
                if assignee.as_str() != user =>
            {
                TransitionError::NotAssignee {
                    action: name,
                    assignee: assignee.clone(),
                    caller: user.to_string(),
                }
            }
            _ => TransitionError::Illegal {
                from: from.to_string(),
                action: name,
            },
        })
    }
}

impl fmt::Debug for TaskTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskTracker")
            .field("status", &self.status())
            .field("assignee", &self.assignee())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task(assignee: Option<&str>) -> Task {
        serde_json::from_value(json!({"id": "task-7", "name": "Approve invoice", "assignee": assignee}))
            .unwrap()
    }

    #[test]
    fn test_claim_then_unclaim_returns_to_unassigned() {
        let mut tracker = TaskTracker::from_task(&task(None));
        assert_eq!(tracker.apply(TaskAction::Claim, "alice"), Ok(TaskStatus::Assigned));
        assert_eq!(tracker.assignee(), Some("alice"));
        assert_eq!(tracker.apply(TaskAction::Unclaim, "alice"), Ok(TaskStatus::Unassigned));
        assert_eq!(tracker.assignee(), None);
    }

    #[test]
    fn test_complete_requires_claim() {
        let mut tracker = TaskTracker::from_task(&task(None));
        assert_eq!(
            tracker.apply(TaskAction::Complete, "alice"),
            Err(TransitionError::Illegal {
                from: "UNASSIGNED".to_string(),
                action: "complete"
            })
        );
        assert_eq!(tracker.status(), Some(TaskStatus::Unassigned));
    }

    #[test]
    fn test_only_assignee_may_unclaim_or_complete() {
        let mut tracker = TaskTracker::from_task(&task(Some("alice")));
        for action in [TaskAction::Unclaim, TaskAction::Complete] {
            assert_eq!(
                tracker.apply(action, "bob"),
                Err(TransitionError::NotAssignee {
                    action: action.name(),
                    assignee: "alice".to_string(),
                    caller: "bob".to_string(),
                })
            );
        }
        assert_eq!(tracker.assignee(), Some("alice"));
    }

    #[test]
    fn test_claim_of_assigned_task_is_illegal() {
        let mut tracker = TaskTracker::from_task(&task(Some("alice")));
        assert!(matches!(
            tracker.apply(TaskAction::Claim, "bob"),
            Err(TransitionError::Illegal { .. })
        ));
        assert!(matches!(
            tracker.apply(TaskAction::Claim, "alice"),
            Err(TransitionError::Illegal { .. })
        ));
    }

    #[test]
    fn test_completion_is_terminal() {
        let mut tracker = TaskTracker::from_task(&task(Some("alice")));
        assert_eq!(tracker.apply(TaskAction::Complete, "alice"), Ok(TaskStatus::Completed));
        for action in [TaskAction::Claim, TaskAction::Unclaim, TaskAction::Complete] {
            assert!(matches!(
                tracker.apply(action, "alice"),
                Err(TransitionError::Terminal { .. })
            ));
        }
    }

    #[test]
    fn test_refresh_follows_engine() {
        let mut tracker = TaskTracker::from_task(&task(None));
        tracker.observe(&task(Some("carol")));
        assert_eq!(tracker.status(), Some(TaskStatus::Assigned));
        assert_eq!(tracker.assignee(), Some("carol"));
    }

    #[test]
    fn test_unobserved_task_rejects_actions() {
        let mut tracker = TaskTracker::new("task-8");
        assert_eq!(
            tracker.apply(TaskAction::Claim, "alice"),
            Err(TransitionError::Unobserved { action: "claim" })
        );
    }
}
