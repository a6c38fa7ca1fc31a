//! Single-threaded message loop
//!
//! Each message is handled to completion, including the events it raises,
//! before the next one is taken. Async work returned by handlers is polled
//! only from [`Runtime::step`], so anything dispatched synchronously (a
//! double click on submit, a navigation) is seen before any response.

use std::collections::VecDeque;

use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use log::{debug, trace};

use crate::common::messages::{CrossDomainEvent, DomainMessage};
use crate::common::task::Task;
use crate::state::State;
use crate::update::update;

pub struct Runtime {
    state: State,
    queue: VecDeque<DomainMessage>,
    pending: FuturesUnordered<BoxFuture<'static, DomainMessage>>,
}

impl Runtime {
    pub fn new(state: State) -> Self {
        Self {
            state,
            queue: VecDeque::new(),
            pending: FuturesUnordered::new(),
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    pub fn into_state(self) -> State {
        self.state
    }

    /// Tasks started but not yet resolved
    pub fn pending_tasks(&self) -> usize {
        self.pending.len()
    }

    /// Handle `message` and everything it synchronously leads to
    pub fn dispatch(&mut self, message: impl Into<DomainMessage>) {
        self.queue.push_back(message.into());

        while let Some(message) = self.queue.pop_front() {
            trace!("Dispatching {}", message.sanitized_display());
            let result = update(&mut self.state, message);
            self.spawn(result.task);
            for event in result.events {
                self.apply_event(event);
            }
        }
    }

    fn spawn(&mut self, task: Task<DomainMessage>) {
        if let Some(future) = task.into_future() {
            self.pending.push(future);
        }
    }

    fn apply_event(&mut self, event: CrossDomainEvent) {
        debug!("Applying {:?}", event);
        match event {
            CrossDomainEvent::InvalidateQueries(root) => {
                let touched = self.state.cache_invalidator.invalidate(root);
                debug!("Invalidated {} cached '{}' queries", touched, root);
            }
            CrossDomainEvent::NavigateTo(route) => {
                self.state.route = route;
                self.state.navigator.navigate(route);
                let task = self
                    .state
                    .domains
                    .user_management
                    .handle_event(&event);
                self.spawn(task);
            }
        }
    }

    /// Wait for the next task to resolve and dispatch its message.
    /// Returns `false` when nothing is pending.
    pub async fn step(&mut self) -> bool {
        match self.pending.next().await {
            Some(message) => {
                self.dispatch(message);
                true
            }
            None => false,
        }
    }

    pub async fn run_until_idle(&mut self) {
        while self.step().await {}
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("state", &self.state)
            .field("queued", &self.queue.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}
