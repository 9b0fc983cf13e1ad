//! Single-shot task callables handed between the host and the wrappers.

use std::fmt;

use crate::error::StageResult;

type BoxedTask<A, R> = Box<dyn FnOnce(A) -> StageResult<R> + Send>;

/// A task body invoked exactly once with its arguments.
///
/// Wrapping a `Task` yields another `Task` of the same shape, so staging for
/// several files composes by nesting.
pub struct Task<A, R> {
    body: BoxedTask<A, R>,
}

impl<A: 'static, R: 'static> Task<A, R> {
    /// Wrap an infallible function.
    pub fn new<F>(body: F) -> Self
    where
        F: FnOnce(A) -> R + Send + 'static,
    {
        Self {
            body: Box::new(move |args| Ok(body(args))),
        }
    }

    /// Wrap a function that may fail with a staging error.
    pub fn fallible<F>(body: F) -> Self
    where
        F: FnOnce(A) -> StageResult<R> + Send + 'static,
    {
        Self {
            body: Box::new(body),
        }
    }

    /// Run the task, consuming it.
    ///
    /// # Errors
    ///
    /// Returns whatever the body (or any staging layer around it) reports.
    pub fn call(self, args: A) -> StageResult<R> {
        (self.body)(args)
    }
}

impl<A, R> fmt::Debug for Task<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StageError;

    #[test]
    fn task_returns_body_result() -> StageResult<()> {
        let task = Task::new(|(a, b): (i32, i32)| a + b);
        assert_eq!(task.call((2, 3))?, 5);
        Ok(())
    }

    #[test]
    fn fallible_task_propagates_errors() {
        let task: Task<(), ()> = Task::fallible(|()| Err(StageError::task("boom")));
        assert!(matches!(task.call(()), Err(StageError::Task { .. })));
    }
}
