use tracing::{info, warn};

use super::instance::InstanceTracker;
use super::task::TaskTracker;
use super::traits::LifecycleOps;
use super::types::{
    InstanceAction, InstanceTransition, TaskAction, TaskTransition, TransitionError,
};
use crate::engine::types::{InstanceStatus, ProcessInstance, Task, TaskStatus, Variables};
use crate::engine::{Credential, EngineError};

/// Issues lifecycle calls and reports the state the engine ends up in.
///
/// Every call follows the same steps: fetch the entity, issue the action
/// exactly once, fetch again, then compare what was observed with what the
/// state machine predicts. The engine is the authority: its rejections are
/// returned unchanged and a local prediction never blocks a call. The only
/// thing the coordinator refuses to accept is an engine that reports success
/// for a transition the contract forbids.
#[derive(Debug, Clone)]
pub struct LifecycleCoordinator<O> {
    ops: O,
}

impl<O: LifecycleOps> LifecycleCoordinator<O> {
    pub fn new(ops: O) -> Self {
        Self { ops }
    }

    pub fn ops(&self) -> &O {
        &self.ops
    }

    pub async fn suspend(&self, credential: &Credential, instance_id: &str) -> Result<InstanceTransition, EngineError> {
        self.transition_instance(credential, instance_id, InstanceAction::Suspend)
            .await
    }

    pub async fn activate(&self, credential: &Credential, instance_id: &str) -> Result<InstanceTransition, EngineError> {
        self.transition_instance(credential, instance_id, InstanceAction::Activate)
            .await
    }

    pub async fn terminate(
        &self,
        credential: &Credential,
        instance_id: &str,
        reason: Option<&str>,
    ) -> Result<InstanceTransition, EngineError> {
        let action = InstanceAction::Terminate {
            reason: reason.map(str::to_string),
        };
        self.transition_instance(credential, instance_id, action).await
    }

    pub async fn claim(&self, credential: &Credential, task_id: &str) -> Result<TaskTransition, EngineError> {
        self.transition_task(credential, task_id, TaskAction::Claim, None)
            .await
    }

    pub async fn unclaim(&self, credential: &Credential, task_id: &str) -> Result<TaskTransition, EngineError> {
        self.transition_task(credential, task_id, TaskAction::Unclaim, None)
            .await
    }

    pub async fn complete(
        &self,
        credential: &Credential,
        task_id: &str,
        variables: &Variables,
    ) -> Result<TaskTransition, EngineError> {
        self.transition_task(credential, task_id, TaskAction::Complete, Some(variables))
            .await
    }

    async fn transition_instance(
        &self,
        credential: &Credential,
        instance_id: &str,
        action: InstanceAction,
    ) -> Result<InstanceTransition, EngineError> {
        let current = self.ops.fetch_instance(credential, instance_id).await?;
        let from = current.status();
        let predicted = InstanceTracker::observed(instance_id, from).apply(&action);

        info!(instance.id = %instance_id, action = action.name(), %from, "Issuing instance transition");
        match &action {
            InstanceAction::Suspend => self.ops.suspend_instance(credential, instance_id).await?,
            InstanceAction::Activate => self.ops.activate_instance(credential, instance_id).await?,
            InstanceAction::Terminate { reason } => {
                self.ops
                    .terminate_instance(credential, instance_id, reason.as_deref())
                    .await?
            }
        }

        let expected = match predicted {
            Ok(to) => Some(to),
            Err(err @ TransitionError::Terminal { .. }) => {
                return Err(accepted_forbidden("instance", instance_id, err));
            }
            Err(err) => {
                warn!(instance.id = %instance_id, error = %err, "Engine accepted a transition the contract does not allow");
                None
            }
        };

        let (to, instance) = self.refresh_instance(credential, instance_id, &action).await?;
        if expected.is_some_and(|expected| expected != to) {
            warn!(
                instance.id = %instance_id,
                action = action.name(),
                expected = ?expected,
                observed = %to,
                "Refreshed instance status differs from the predicted one"
            );
        }

        info!(instance.id = %instance_id, %from, %to, "Instance transition observed");
        Ok(InstanceTransition {
            instance_id: instance_id.to_string(),
            from,
            to,
            instance,
        })
    }

    async fn refresh_instance(
        &self,
        credential: &Credential,
        instance_id: &str,
        action: &InstanceAction,
    ) -> Result<(InstanceStatus, Option<ProcessInstance>), EngineError> {
        let terminating = matches!(action, InstanceAction::Terminate { .. });
        match self.ops.fetch_instance(credential, instance_id).await {
            // Terminated instances leave the runtime tables.
            Err(err) if terminating && err.is_not_found() => Ok((InstanceStatus::Terminated, None)),
            Err(err) => Err(err),
            Ok(instance) => {
                let status = if terminating && instance.end_time.is_some() {
                    InstanceStatus::Terminated
                } else {
                    instance.status()
                };
                Ok((status, Some(instance)))
            }
        }
    }

    async fn transition_task(
        &self,
        credential: &Credential,
        task_id: &str,
        action: TaskAction,
        variables: Option<&Variables>,
    ) -> Result<TaskTransition, EngineError> {
        let current = self.ops.fetch_task(credential, task_id).await?;
        let mut tracker = TaskTracker::from_task(&current);
        let from = current.lifecycle_status();

        // Without a known caller, assume the engine will see the current assignee.
        let caller = credential
            .user_id()
            .or_else(|| current.current_assignee())
            .unwrap_or_default()
            .to_string();
        let predicted = tracker.apply(action, &caller);

        info!(task.id = %task_id, action = action.name(), %from, "Issuing task transition");
        match action {
            TaskAction::Claim => self.ops.claim_task(credential, task_id).await?,
            TaskAction::Unclaim => self.ops.unclaim_task(credential, task_id).await?,
            TaskAction::Complete => {
                let empty = Variables::new();
                self.ops
                    .complete_task(credential, task_id, variables.unwrap_or(&empty))
                    .await?
            }
        }

        let expected = match predicted {
            Ok(to) => Some(to),
            Err(err @ TransitionError::Terminal { .. }) => {
                return Err(accepted_forbidden("task", task_id, err));
            }
            Err(err) if action == TaskAction::Complete && from == TaskStatus::Unassigned => {
                return Err(accepted_forbidden("task", task_id, err));
            }
            Err(err) => {
                warn!(task.id = %task_id, error = %err, "Engine accepted a transition the contract does not allow");
                None
            }
        };

        let (to, task) = self.refresh_task(credential, task_id, action).await?;
        if expected.is_some_and(|expected| expected != to) {
            warn!(
                task.id = %task_id,
                action = action.name(),
                expected = ?expected,
                observed = %to,
                "Refreshed task status differs from the predicted one"
            );
        }

        info!(task.id = %task_id, %from, %to, "Task transition observed");
        Ok(TaskTransition {
            task_id: task_id.to_string(),
            from,
            to,
            task,
        })
    }

    async fn refresh_task(
        &self,
        credential: &Credential,
        task_id: &str,
        action: TaskAction,
    ) -> Result<(TaskStatus, Option<Task>), EngineError> {
        match self.ops.fetch_task(credential, task_id).await {
            // Completed tasks leave the active task list.
            Err(err) if action == TaskAction::Complete && err.is_not_found() => {
                Ok((TaskStatus::Completed, None))
            }
            Err(err) => Err(err),
            Ok(task) => Ok((task.lifecycle_status(), Some(task))),
        }
    }
}

fn accepted_forbidden(entity: &str, id: &str, err: TransitionError) -> EngineError {
    EngineError::ContractViolation(format!(
        "engine accepted a forbidden transition of {entity} {id}: {err}"
    ))
}
