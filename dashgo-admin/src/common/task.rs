//! Deferred work produced by update handlers.
//!
//! Handlers never await. They return a [`Task`] wrapping the future to run
//! and a mapping of its output into the next message; the runtime polls it
//! and feeds the message back through `update`.

use std::fmt;
use std::future::Future;

use futures::FutureExt;
use futures::future::BoxFuture;

/// A unit of asynchronous work that resolves to exactly one message.
pub struct Task<M> {
    future: Option<BoxFuture<'static, M>>,
}

impl<M: Send + 'static> Task<M> {
    /// A task that does nothing
    pub fn none() -> Self {
        Self { future: None }
    }

    /// Run `future` and map its output into a message
    pub fn perform<T, F>(future: F, f: impl FnOnce(T) -> M + Send + 'static) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self {
            future: Some(future.map(f).boxed()),
        }
    }

    /// A task that resolves immediately to `message`
    pub fn done(message: M) -> Self {
        Self {
            future: Some(futures::future::ready(message).boxed()),
        }
    }

    pub fn map<N: Send + 'static>(
        self,
        f: impl FnOnce(M) -> N + Send + 'static,
    ) -> Task<N> {
        Task {
            future: self.future.map(|future| future.map(f).boxed()),
        }
    }

    pub fn is_none(&self) -> bool {
        self.future.is_none()
    }

    pub fn into_future(self) -> Option<BoxFuture<'static, M>> {
        self.future
    }
}

impl<M> fmt::Debug for Task<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("pending", &self.future.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn perform_maps_output() {
        let task = Task::perform(async { 20 }, |n: i32| n + 1).map(|n| n * 2);
        let output = task.into_future().expect("task is pending").await;
        assert_eq!(output, 42);
    }

    #[test]
    fn none_has_no_future() {
        let task: Task<()> = Task::none();
        assert!(task.is_none());
        assert!(task.into_future().is_none());
    }
}
