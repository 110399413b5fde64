//! Calls through functions made by `create`.

use futures::future::{BoxFuture, FutureExt};
use zfn_types::{Error, MaybeAsync, Result, Value};

use super::{Function, ON_ERROR_PROMISE, SPY_PROMISE, SyncMode, detach};
use crate::schema::{Position, validate_sync};

impl Function<SyncMode> {
    /// Call the wrapped function.
    ///
    /// Answers `Ready` unless the implementation (or its mock) returned a
    /// pending outcome. Recovery, return validation and the spy then run as a
    /// detached task, and the returned future waits for it.
    pub fn call(&self, args: Vec<Value>) -> MaybeAsync<Result<Value>> {
        let args = match self.validate_args(args) {
            Ok(args) => args,
            Err(err) => return MaybeAsync::Ready(Err(err)),
        };

        let exec = self.options.exec_fn();
        match exec(args.clone()) {
            MaybeAsync::Ready(Ok(result)) => MaybeAsync::Ready(self.finish(args, result)),
            MaybeAsync::Ready(Err(err)) => {
                let recovered = self.recover(err, args.clone());
                MaybeAsync::Ready(recovered.and_then(|result| self.finish(args, result)))
            }
            MaybeAsync::Pending(pending) => {
                MaybeAsync::Pending(detach(self.clone().settle(args, pending).boxed()))
            }
        }
    }

    fn validate_args(&self, args: Vec<Value>) -> Result<Vec<Value>> {
        args.into_iter()
            .enumerate()
            .map(|(i, arg)| match self.arg_schema(i) {
                Some(schema) => validate_sync(schema.as_ref(), arg, Position::Argument(i + 1)),
                None => Ok(arg),
            })
            .collect()
    }

    fn validate_return(&self, result: Value) -> Result<Value> {
        match self.schemas.return_schema() {
            Some(schema) => validate_sync(schema.as_ref(), result, Position::Return),
            None => Ok(result),
        }
    }

    /// Hand a synchronous failure to the error handler.
    fn recover(&self, err: anyhow::Error, args: Vec<Value>) -> Result<Value> {
        tracing::debug!(error = %err, "implementation failed, dispatching to error handler");
        let handler = self.options.on_error_fn();
        match handler(err, args) {
            MaybeAsync::Ready(handled) => handled.map_err(Error::from_user),
            MaybeAsync::Pending(_) => {
                tracing::warn!("error handler suspended in a synchronous call, dropping its future");
                Err(Error::contract(ON_ERROR_PROMISE))
            }
        }
    }

    /// Validate the result and show it to the spy, synchronously.
    fn finish(&self, args: Vec<Value>, result: Value) -> Result<Value> {
        let result = self.validate_return(result)?;
        let (spy, count) = self.options.next_spy();
        tracing::trace!(count, "notifying spy");
        match spy(args, result.clone(), count) {
            MaybeAsync::Ready(observed) => observed.map_err(Error::from_user)?,
            MaybeAsync::Pending(_) => {
                tracing::warn!("spy suspended in a synchronous call, dropping its future");
                return Err(Error::contract(SPY_PROMISE));
            }
        }
        Ok(result)
    }

    /// The rest of the pipeline once the implementation has suspended.
    async fn settle(self, args: Vec<Value>, pending: BoxFuture<'static, anyhow::Result<Value>>) -> Result<Value> {
        let result = match pending.await {
            Ok(result) => result,
            Err(err) => {
                tracing::debug!(error = %err, "implementation failed, dispatching to error handler");
                let handler = self.options.on_error_fn();
                handler(err, args.clone()).resolve().await.map_err(Error::from_user)?
            }
        };
        let result = self.validate_return(result)?;
        let (spy, count) = self.options.next_spy();
        tracing::trace!(count, "notifying spy");
        spy(args, result.clone(), count).resolve().await.map_err(Error::from_user)?;
        Ok(result)
    }
}
