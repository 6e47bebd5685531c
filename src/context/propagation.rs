use std::time::Duration;

use super::{SecurityContext, SecurityContextHolder};

/// A unit of work submitted to an executor.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks, typically on pooled threads that are reused across requests.
pub trait TaskExecutor: Send + Sync {
    /// Submits `task` for execution.
    fn execute(&self, task: Task);
}

/// An executor that can also run tasks after a delay.
pub trait SchedulingTaskExecutor: TaskExecutor {
    /// Submits `task` to run once `delay` has elapsed.
    fn schedule(&self, task: Task, delay: Duration);
}

/// Tasks run on the runtime's blocking pool.
impl TaskExecutor for tokio::runtime::Handle {
    fn execute(&self, task: Task) {
        drop(self.spawn_blocking(task));
    }
}

impl SchedulingTaskExecutor for tokio::runtime::Handle {
    fn schedule(&self, task: Task, delay: Duration) {
        drop(self.spawn(async move {
            tokio::time::sleep(delay).await;
            drop(tokio::task::spawn_blocking(task));
        }));
    }
}

/// A task that runs with a given security context installed on its thread.
///
/// Whatever the worker thread held before is restored once the task
/// returns or unwinds, so a reused pool thread never keeps the context.
///
/// # Examples
///
/// ```
/// use access_core::{Authentication, DelegatingSecurityContextTask, SecurityContextHolder};
///
/// SecurityContextHolder::set_authentication(Authentication::new("user", "pw", ["ROLE_USER"]));
/// let task = DelegatingSecurityContextTask::capture(|| {
///     SecurityContextHolder::authentication().map(|a| a.name().to_string())
/// });
/// SecurityContextHolder::clear_context();
///
/// let name = std::thread::spawn(move || task.run()).join().unwrap();
/// assert_eq!(name.as_deref(), Some("user"));
/// ```
#[derive(Debug)]
pub struct DelegatingSecurityContextTask<F> {
    task: F,
    context: Option<SecurityContext>,
}

impl<F> DelegatingSecurityContextTask<F> {
    /// Wraps `task` so it runs with `context`.
    pub fn new(task: F, context: Option<SecurityContext>) -> Self {
        Self { task, context }
    }

    /// Wraps `task` so it runs with the calling thread's current context.
    pub fn capture(task: F) -> Self {
        Self::new(task, SecurityContextHolder::get_context())
    }

    /// Runs the task with the captured context installed.
    pub fn run<R>(self) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = SecurityContextHolder::enter(self.context);
        (self.task)()
    }
}

/// Decorates an executor so every task carries a security context.
///
/// Without a fixed context, each task carries the submitting thread's
/// context as of the moment it was submitted.
#[derive(Debug, Clone)]
pub struct DelegatingSecurityContextExecutor<E> {
    delegate: E,
    fixed: Option<SecurityContext>,
}

impl<E> DelegatingSecurityContextExecutor<E> {
    /// Propagates the submitter's current context.
    pub fn new(delegate: E) -> Self {
        Self {
            delegate,
            fixed: None,
        }
    }

    /// Runs every task with `context`, regardless of the submitter.
    pub fn with_context(delegate: E, context: SecurityContext) -> Self {
        Self {
            delegate,
            fixed: Some(context),
        }
    }

    fn wrap(&self, task: Task) -> Task {
        let context = self
            .fixed
            .clone()
            .or_else(SecurityContextHolder::get_context);
        let wrapped = DelegatingSecurityContextTask::new(task, context);
        Box::new(move || wrapped.run())
    }
}

impl<E: TaskExecutor> TaskExecutor for DelegatingSecurityContextExecutor<E> {
    fn execute(&self, task: Task) {
        self.delegate.execute(self.wrap(task));
    }
}

impl<E: SchedulingTaskExecutor> SchedulingTaskExecutor for DelegatingSecurityContextExecutor<E> {
    fn schedule(&self, task: Task, delay: Duration) {
        self.delegate.schedule(self.wrap(task), delay);
    }
}
