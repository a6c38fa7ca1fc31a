pub mod messages;
pub mod task;

pub use messages::{CrossDomainEvent, DomainMessage, DomainUpdateResult};
pub use task::Task;
