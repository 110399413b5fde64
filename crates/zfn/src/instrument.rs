//! Instrumentation: mock, spy and error interception for wrapped functions.
//!
//! Each materialized function owns one [`ExecOptions`] record. Every clone of
//! the function shares it, sibling functions built from the same builder do
//! not. Calls re-read the record at each stage, so mutating it while calls
//! are in flight affects the stages those calls have not reached yet; nothing
//! orders a mutation against a concurrent call.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use zfn_types::{MaybeAsync, Value};

use crate::engine::Function;

/// What an implementation, mock, or error handler produces.
pub type Outcome = MaybeAsync<anyhow::Result<Value>>;

/// What a spy produces.
pub type SpyOutcome = MaybeAsync<anyhow::Result<()>>;

pub(crate) type ExecFn = Arc<dyn Fn(Vec<Value>) -> Outcome + Send + Sync>;
pub(crate) type ErrorFn = Arc<dyn Fn(anyhow::Error, Vec<Value>) -> Outcome + Send + Sync>;
pub(crate) type SpyFn = Arc<dyn Fn(Vec<Value>, Value, u64) -> SpyOutcome + Send + Sync>;

pub(crate) fn exec_fn<F, R>(f: F) -> ExecFn
where
    F: Fn(Vec<Value>) -> R + Send + Sync + 'static,
    R: Into<Outcome>,
{
    Arc::new(move |args| f(args).into())
}

/// Mutable per-function state.
pub(crate) struct ExecOptions {
    original: ExecFn,
    exec_fn: ExecFn,
    spy_fn: SpyFn,
    spy_count: u64,
    on_error_fn: ErrorFn,
}

impl ExecOptions {
    fn new(original: ExecFn) -> Self {
        Self {
            exec_fn: original.clone(),
            original,
            spy_fn: noop_spy(),
            spy_count: 0,
            on_error_fn: rethrow(),
        }
    }
}

impl fmt::Debug for ExecOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecOptions")
            .field("mocked", &!Arc::ptr_eq(&self.exec_fn, &self.original))
            .field("spy_count", &self.spy_count)
            .finish_non_exhaustive()
    }
}

fn noop_spy() -> SpyFn {
    Arc::new(|_, _, _| MaybeAsync::Ready(Ok(())))
}

fn rethrow() -> ErrorFn {
    Arc::new(|err, _| MaybeAsync::Ready(Err(err)))
}

/// Shared handle to a function's [`ExecOptions`].
#[derive(Clone)]
pub(crate) struct Instrumentation {
    options: Arc<Mutex<ExecOptions>>,
}

impl Instrumentation {
    pub(crate) fn new(original: ExecFn) -> Self {
        Self {
            options: Arc::new(Mutex::new(ExecOptions::new(original))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ExecOptions> {
        self.options.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn exec_fn(&self) -> ExecFn {
        self.lock().exec_fn.clone()
    }

    pub(crate) fn on_error_fn(&self) -> ErrorFn {
        self.lock().on_error_fn.clone()
    }

    /// Bump the counter and hand back the spy with the new count.
    pub(crate) fn next_spy(&self) -> (SpyFn, u64) {
        let mut options = self.lock();
        options.spy_count += 1;
        (options.spy_fn.clone(), options.spy_count)
    }

    pub(crate) fn spy_count(&self) -> u64 {
        self.lock().spy_count
    }
}

impl fmt::Debug for Instrumentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.lock(), f)
    }
}

impl<M> Function<M> {
    /// Replace the implementation.
    pub fn mock<F, R>(&self, f: F) -> &Self
    where
        F: Fn(Vec<Value>) -> R + Send + Sync + 'static,
        R: Into<Outcome>,
    {
        self.options.lock().exec_fn = exec_fn(f);
        self
    }

    /// Go back to the implementation the function was created with.
    pub fn reset_mock(&self) -> &Self {
        let mut options = self.options.lock();
        options.exec_fn = options.original.clone();
        self
    }

    /// Observe successful calls as `(args, result, count)`.
    ///
    /// The count starts over at 1 for the first call after installing.
    pub fn spy<F, R>(&self, f: F) -> &Self
    where
        F: Fn(Vec<Value>, Value, u64) -> R + Send + Sync + 'static,
        R: Into<SpyOutcome>,
    {
        let mut options = self.options.lock();
        options.spy_fn = Arc::new(move |args, result, count| f(args, result, count).into());
        options.spy_count = 0;
        self
    }

    /// Remove the spy and zero the counter.
    pub fn reset_spy(&self) -> &Self {
        let mut options = self.options.lock();
        options.spy_fn = noop_spy();
        options.spy_count = 0;
        self
    }

    /// Intercept implementation failures as `(error, args)`.
    ///
    /// The handler's value becomes the call's result; its error propagates
    /// as-is. Validation failures never reach it.
    pub fn on_error<F, R>(&self, f: F) -> &Self
    where
        F: Fn(anyhow::Error, Vec<Value>) -> R + Send + Sync + 'static,
        R: Into<Outcome>,
    {
        self.options.lock().on_error_fn = Arc::new(move |err, args| f(err, args).into());
        self
    }

    /// Successful calls observed since the spy was last installed or reset.
    pub fn spy_count(&self) -> u64 {
        self.options.spy_count()
    }
}
