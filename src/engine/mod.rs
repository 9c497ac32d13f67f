pub mod client;
pub mod credential;
pub mod decisions;
pub mod definitions;
pub mod deployments;
pub mod errors;
pub mod forms;
pub mod instances;
pub mod page;
pub mod retry;
pub mod system;
pub mod tasks;
pub mod types;
pub mod users;

pub use client::EngineClient;
pub use credential::Credential;
pub use definitions::DefinitionFilter;
pub use errors::{EngineError, ErrorKind};
pub use instances::InstanceFilter;
pub use page::{Page, PageRequest};
pub use retry::RetryPolicy;
pub use tasks::TaskFilter;
pub use types::{InstanceStatus, ProcessInstance, Task, TaskStatus, Variables};
