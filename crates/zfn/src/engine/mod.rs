//! Execution engine: runs a call through validation and instrumentation.
//!
//! Every call moves through the same stages:
//!
//! ```text
//! ValidateArgs ─► Invoke ─┬─────────────────┬─► ValidateReturn ─► Spy ─► Done
//!                         └─► ErrorRecovery ─┘
//! ```
//!
//! The two modes differ only in how they treat suspension:
//!
//! - [`SyncFunction`] stays synchronous unless the implementation itself
//!   suspends. A schema, error handler or spy that suspends on the
//!   synchronous path is a contract violation, and its pending future is
//!   dropped.
//! - [`AsyncFunction`] always returns a future and awaits whatever suspends.
//!
//! In both modes validation failures go straight to the caller, only
//! implementation failures reach the error handler, and the spy only ever
//! sees a recovered, validated result.
//!
//! A call that hands back a future has already started: the pipeline runs as
//! a task on the ambient tokio runtime, and the future only waits for its
//! outcome. Dropping the future does not stop the implementation or the spy.
//! Without a runtime the pipeline runs when the future is polled.

mod async_call;
mod sync_call;

use std::fmt;
use std::marker::PhantomData;
use std::panic;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::runtime::Handle;
use zfn_types::{Error, Result, Value};

use crate::builder::FunctionBuilder;
use crate::instrument::Instrumentation;
use crate::schema::SchemaRef;

/// Raised when an error handler suspends on the synchronous path.
pub const ON_ERROR_PROMISE: &str = "onError handler function cannot return a promise in a synchronous context";

/// Raised when a spy suspends on the synchronous path.
pub const SPY_PROMISE: &str = "Spy handler function cannot return a promise in a synchronous context";

/// Marker for functions made by [`FunctionBuilder::create`].
#[derive(Debug, Clone, Copy)]
pub struct SyncMode;

/// Marker for functions made by [`FunctionBuilder::create_async`].
#[derive(Debug, Clone, Copy)]
pub struct AsyncMode;

/// A wrapped function.
///
/// Clones are handles onto the same function: they share one implementation
/// slot, spy, counter and error handler.
pub struct Function<M> {
    pub(crate) schemas: Arc<FunctionBuilder>,
    pub(crate) options: Instrumentation,
    pub(crate) mode: PhantomData<M>,
}

pub type SyncFunction = Function<SyncMode>;
pub type AsyncFunction = Function<AsyncMode>;

impl<M> Function<M> {
    /// The configuration this function was created from.
    pub fn schemas(&self) -> &FunctionBuilder {
        &self.schemas
    }

    fn arg_schema(&self, index: usize) -> Option<&SchemaRef> {
        self.schemas.arg_schemas().get(index)
    }
}

impl<M> Clone for Function<M> {
    fn clone(&self) -> Self {
        Self {
            schemas: self.schemas.clone(),
            options: self.options.clone(),
            mode: PhantomData,
        }
    }
}

impl<M> fmt::Debug for Function<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("mode", &std::any::type_name::<M>())
            .field("schemas", &self.schemas)
            .field("options", &self.options)
            .finish()
    }
}

/// Start `pipeline` now and return a future for its outcome.
fn detach(pipeline: BoxFuture<'static, Result<Value>>) -> BoxFuture<'static, Result<Value>> {
    let Ok(handle) = Handle::try_current() else {
        tracing::trace!("no tokio runtime, call runs when awaited");
        return pipeline;
    };
    let task = handle.spawn(pipeline);
    async move {
        match task.await {
            Ok(outcome) => outcome,
            Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
            Err(err) => Err(Error::Execution(err.into())),
        }
    }
    .boxed()
}
