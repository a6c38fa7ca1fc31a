use crate::common::task::Task;
use crate::domains::user_management;
use crate::infrastructure::navigation::Route;

/// Result of a domain update operation
#[derive(Debug)]
pub struct DomainUpdateResult {
    /// The task to execute (may produce more messages)
    pub task: Task<DomainMessage>,
    /// Events applied by the runtime, in order, before the next message
    pub events: Vec<CrossDomainEvent>,
}

impl DomainUpdateResult {
    /// Create a result with just a task
    pub fn task(task: Task<DomainMessage>) -> Self {
        Self {
            task,
            events: Vec::new(),
        }
    }

    pub fn none() -> Self {
        Self::task(Task::none())
    }

    /// Create a result with task and events
    pub fn with_events(task: Task<DomainMessage>, events: Vec<CrossDomainEvent>) -> Self {
        Self { task, events }
    }

    /// Add an event to this result
    pub fn add_event(mut self, event: CrossDomainEvent) -> Self {
        self.events.push(event);
        self
    }
}

/// The main domain message router
#[derive(Clone, Debug)]
pub enum DomainMessage {
    UserManagement(user_management::messages::Message),
}

impl DomainMessage {
    pub fn name(&self) -> &'static str {
        match self {
            DomainMessage::UserManagement(message) => message.name(),
        }
    }

    pub fn sanitized_display(&self) -> String {
        match self {
            DomainMessage::UserManagement(message) => message.sanitized_display(),
        }
    }
}

impl From<user_management::messages::Message> for DomainMessage {
    fn from(message: user_management::messages::Message) -> Self {
        DomainMessage::UserManagement(message)
    }
}

/// Effects on the outward-facing collaborators
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CrossDomainEvent {
    /// Mark every cached query under this root stale
    InvalidateQueries(&'static str),
    /// Move the router, then tell every domain
    NavigateTo(Route),
}
