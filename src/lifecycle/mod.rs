// Lifecycle contract for process instances and tasks.
//
// The state machines encode which client actions are legal; the coordinator
// drives the engine through fetch → call → refresh and checks what it
// observes against the machines.

pub mod coordinator;
pub mod instance;
pub mod task;
pub mod traits;
pub mod types;

#[cfg(test)]
pub mod mocks;

pub use coordinator::LifecycleCoordinator;
pub use instance::{predict, InstanceLifecycle, InstanceTracker};
pub use task::{TaskLifecycle, TaskTracker};
pub use traits::LifecycleOps;
pub use types::{InstanceAction, InstanceTransition, TaskAction, TaskTransition, TransitionError};
