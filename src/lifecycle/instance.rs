use statig::prelude::*;
use std::fmt;
use tracing::debug;

use super::types::{InstanceAction, TransitionError};
use crate::engine::types::InstanceStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceEvent {
    /// The engine reported this status on a fetch.
    Refreshed(InstanceStatus),
    Suspend,
    Activate,
    Terminate,
    /// Reached the end event. Engine-internal, never sent by a client.
    EngineCompleted,
}

impl From<&InstanceAction> for InstanceEvent {
    fn from(action: &InstanceAction) -> Self {
        match action {
            InstanceAction::Suspend => InstanceEvent::Suspend,
            InstanceAction::Activate => InstanceEvent::Activate,
            InstanceAction::Terminate { .. } => InstanceEvent::Terminate,
        }
    }
}

/// Legal process instance transitions.
///
/// RUNNING ⇄ SUSPENDED, either of them → TERMINATED, RUNNING → COMPLETED.
/// COMPLETED and TERMINATED accept nothing but a refresh.
#[derive(Debug, Default)]
pub struct InstanceLifecycle {
    pub instance_id: String,
}

#[state_machine(
    initial = "State::unobserved()",
    state(derive(Debug, Clone, PartialEq, Eq))
)]
impl InstanceLifecycle {
    #[state]
    fn unobserved(&mut self, event: &InstanceEvent) -> Outcome<State> {
        match event {
            InstanceEvent::Refreshed(status) => self.follow(*status),
            _ => Handled,
        }
    }

    #[state]
    fn running(&mut self, event: &InstanceEvent) -> Outcome<State> {
        match event {
            InstanceEvent::Suspend => Transition(State::suspended()),
            InstanceEvent::Terminate => Transition(State::terminated()),
            InstanceEvent::EngineCompleted => Transition(State::completed()),
            InstanceEvent::Refreshed(status) => self.follow(*status),
            InstanceEvent::Activate => Handled,
        }
    }

    #[state]
    fn suspended(&mut self, event: &InstanceEvent) -> Outcome<State> {
        match event {
            InstanceEvent::Activate => Transition(State::running()),
            InstanceEvent::Terminate => Transition(State::terminated()),
            InstanceEvent::Refreshed(status) => self.follow(*status),
            _ => Handled,
        }
    }

    #[state]
    fn completed(&mut self, event: &InstanceEvent) -> Outcome<State> {
        match event {
            InstanceEvent::Refreshed(status) => self.follow(*status),
            _ => Handled,
        }
    }

    #[state]
    fn terminated(&mut self, event: &InstanceEvent) -> Outcome<State> {
        match event {
            InstanceEvent::Refreshed(status) => self.follow(*status),
            _ => Handled,
        }
    }
}

impl InstanceLifecycle {
    fn follow(&self, status: InstanceStatus) -> Outcome<State> {
        debug!(instance.id = %self.instance_id, %status, "Following engine-reported status");
        Transition(match status {
            InstanceStatus::Running => State::running(),
            InstanceStatus::Suspended => State::suspended(),
            InstanceStatus::Completed => State::completed(),
            InstanceStatus::Terminated => State::terminated(),
        })
    }
}

fn status_of(state: &State) -> Option<InstanceStatus> {
    match state {
        State::Unobserved { .. } => None,
        State::Running { .. } => Some(InstanceStatus::Running),
        State::Suspended { .. } => Some(InstanceStatus::Suspended),
        State::Completed { .. } => Some(InstanceStatus::Completed),
        State::Terminated { .. } => Some(InstanceStatus::Terminated),
    }
}

/// Local view of one instance's lifecycle, driven by engine refreshes.
pub struct InstanceTracker {
    machine: StateMachine<InstanceLifecycle>,
}

impl InstanceTracker {
    pub fn new(instance_id: impl Into<String>) -> Self {
        Self {
            machine: InstanceLifecycle {
                instance_id: instance_id.into(),
            }
            .state_machine(),
        }
    }

    /// Tracker already positioned at an engine-reported status.
    pub fn observed(instance_id: impl Into<String>, status: InstanceStatus) -> Self {
        let mut tracker = Self::new(instance_id);
        tracker.observe(status);
        tracker
    }

    /// Adopt the engine's status, whatever the local state was.
    pub fn observe(&mut self, status: InstanceStatus) {
        self.machine.handle(&InstanceEvent::Refreshed(status));
    }

    /// `None` until the first refresh.
    pub fn status(&self) -> Option<InstanceStatus> {
        status_of(self.machine.state())
    }

    /// Check a client action against the contract and advance the local
    /// view when it is legal.
    pub fn apply(&mut self, action: &InstanceAction) -> Result<InstanceStatus, TransitionError> {
        self.step(action.name(), InstanceEvent::from(action))
    }

    /// Record the engine-internal RUNNING → COMPLETED transition.
    pub fn engine_completed(&mut self) -> Result<InstanceStatus, TransitionError> {
        self.step("complete", InstanceEvent::EngineCompleted)
    }

    fn step(&mut self, action: &'static str, event: InstanceEvent) -> Result<InstanceStatus, TransitionError> {
        let before = self.machine.state().clone();
        let from = status_of(&before).ok_or(TransitionError::Unobserved { action })?;
        if from.is_terminal() {
            return Err(TransitionError::Terminal {
                from: from.to_string(),
                action,
            });
        }

        self.machine.handle(&event);

        match status_of(self.machine.state()) {
            Some(to) if *self.machine.state() != before => Ok(to),
            _ => Err(TransitionError::Illegal {
                from: from.to_string(),
                action,
            }),
        }
    }
}

impl fmt::Debug for InstanceTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceTracker")
            .field("status", &self.status())
            .finish()
    }
}

/// Status the contract predicts after `action` from `from`.
pub fn predict(from: InstanceStatus, action: &InstanceAction) -> Result<InstanceStatus, TransitionError> {
    InstanceTracker::observed("", from).apply(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [InstanceStatus; 4] = [
        InstanceStatus::Running,
        InstanceStatus::Suspended,
        InstanceStatus::Completed,
        InstanceStatus::Terminated,
    ];

    fn terminate() -> InstanceAction {
        InstanceAction::Terminate {
            reason: Some("duplicate order".to_string()),
        }
    }

    #[test]
    fn test_suspend_activate_round_trip() {
        let mut tracker = InstanceTracker::observed("inst-001", InstanceStatus::Running);
        assert_eq!(tracker.apply(&InstanceAction::Suspend), Ok(InstanceStatus::Suspended));
        assert_eq!(tracker.apply(&InstanceAction::Activate), Ok(InstanceStatus::Running));
        assert_eq!(tracker.status(), Some(InstanceStatus::Running));
    }

    #[test]
    fn test_suspend_twice_is_illegal() {
        let mut tracker = InstanceTracker::observed("inst-001", InstanceStatus::Running);
        tracker.apply(&InstanceAction::Suspend).unwrap();
        let err = tracker.apply(&InstanceAction::Suspend).unwrap_err();
        assert_eq!(
            err,
            TransitionError::Illegal {
                from: "SUSPENDED".to_string(),
                action: "suspend"
            }
        );
        assert_eq!(tracker.status(), Some(InstanceStatus::Suspended));
    }

    #[test]
    fn test_activate_running_is_illegal() {
        assert!(matches!(
            predict(InstanceStatus::Running, &InstanceAction::Activate),
            Err(TransitionError::Illegal { .. })
        ));
    }

    #[test]
    fn test_terminate_from_running_and_suspended() {
        assert_eq!(predict(InstanceStatus::Running, &terminate()), Ok(InstanceStatus::Terminated));
        assert_eq!(predict(InstanceStatus::Suspended, &terminate()), Ok(InstanceStatus::Terminated));
    }

    #[test]
    fn test_terminal_states_reject_every_action() {
        for from in [InstanceStatus::Completed, InstanceStatus::Terminated] {
            for action in [InstanceAction::Suspend, InstanceAction::Activate, terminate()] {
                let err = predict(from, &action).unwrap_err();
                assert!(
                    matches!(err, TransitionError::Terminal { .. }),
                    "{action:?} from {from} gave {err:?}"
                );
            }
        }
    }

    #[test]
    fn test_engine_completion_only_from_running() {
        let mut tracker = InstanceTracker::observed("inst-002", InstanceStatus::Running);
        assert_eq!(tracker.engine_completed(), Ok(InstanceStatus::Completed));

        let mut tracker = InstanceTracker::observed("inst-003", InstanceStatus::Suspended);
        assert!(tracker.engine_completed().is_err());
    }

    #[test]
    fn test_unobserved_rejects_actions() {
        let mut tracker = InstanceTracker::new("inst-004");
        assert_eq!(tracker.status(), None);
        assert_eq!(
            tracker.apply(&InstanceAction::Suspend),
            Err(TransitionError::Unobserved { action: "suspend" })
        );
    }

    #[test]
    fn test_refresh_overrides_local_view() {
        for status in ALL {
            let mut tracker = InstanceTracker::observed("inst-005", InstanceStatus::Completed);
            tracker.observe(status);
            assert_eq!(tracker.status(), Some(status));
        }
    }

    #[test]
    fn test_exactly_the_documented_transitions_are_legal() {
        let actions = [InstanceAction::Suspend, InstanceAction::Activate, terminate()];
        let mut legal = Vec::new();
        for from in ALL {
            for action in &actions {
                if let Ok(to) = predict(from, action) {
                    legal.push((from, action.name(), to));
                }
            }
        }
        assert_eq!(
            legal,
            vec![
                (InstanceStatus::Running, "suspend", InstanceStatus::Suspended),
                (InstanceStatus::Running, "terminate", InstanceStatus::Terminated),
                (InstanceStatus::Suspended, "activate", InstanceStatus::Running),
                (InstanceStatus::Suspended, "terminate", InstanceStatus::Terminated),
            ]
        );
    }
}
