//! Calls through functions made by `create_async`.

use futures::future::{BoxFuture, FutureExt};
use zfn_types::{Error, Result, Value};

use super::{AsyncMode, Function, detach};
use crate::schema::{Position, validate_async};

impl Function<AsyncMode> {
    /// Call the wrapped function. The answer is always a future, even when
    /// nothing along the way suspends.
    ///
    /// The call starts right away; dropping the future does not cancel it.
    pub fn call(&self, args: Vec<Value>) -> BoxFuture<'static, Result<Value>> {
        detach(self.clone().run(args).boxed())
    }

    async fn run(self, args: Vec<Value>) -> Result<Value> {
        let mut validated = Vec::with_capacity(args.len());
        for (i, arg) in args.into_iter().enumerate() {
            let arg = match self.arg_schema(i) {
                Some(schema) => validate_async(schema.as_ref(), arg, Position::Argument(i + 1)).await?,
                None => arg,
            };
            validated.push(arg);
        }
        let args = validated;

        let exec = self.options.exec_fn();
        let result = match exec(args.clone()).resolve().await {
            Ok(result) => result,
            Err(err) => {
                tracing::debug!(error = %err, "implementation failed, dispatching to error handler");
                let handler = self.options.on_error_fn();
                handler(err, args.clone()).resolve().await.map_err(Error::from_user)?
            }
        };

        let result = match self.schemas.return_schema() {
            Some(schema) => validate_async(schema.as_ref(), result, Position::Return).await?,
            None => result,
        };

        let (spy, count) = self.options.next_spy();
        tracing::trace!(count, "notifying spy");
        spy(args, result.clone(), count).resolve().await.map_err(Error::from_user)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use zfn_types::{ErrorKind, MaybeAsync};

    use crate::builder::FunctionBuilder;
    use crate::validators::Validators;

    use super::*;

    #[tokio::test]
    async fn async_schemas_are_awaited() {
        let z = Validators;
        let f = FunctionBuilder::new()
            .args([z.string().transform_async(|v| async move { json!(v.as_str().map(str::len)) })])
            .unwrap()
            .create_async(|args: Vec<Value>| anyhow::Ok(args[0].clone()));
        assert_eq!(f.call(vec![json!("four")]).await.unwrap(), json!(4));
    }

    #[tokio::test]
    async fn suspending_handler_is_legal() {
        let f = FunctionBuilder::new().create_async(|_| -> anyhow::Result<Value> { anyhow::bail!("boom") });
        f.on_error(|_, _| MaybeAsync::pending(async { anyhow::Ok(json!("recovered")) }));
        assert_eq!(f.call(vec![]).await.unwrap(), json!("recovered"));
    }

    #[tokio::test]
    async fn argument_failure_skips_handler() {
        let f = FunctionBuilder::new()
            .args([Validators.number()])
            .unwrap()
            .create_async(|_| anyhow::Ok(json!(null)));
        f.on_error(|_, _| anyhow::Ok(json!("should not run")));
        let err = f.call(vec![json!("x")]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.message().starts_with("Validation failed for 1st argument"));
    }

    #[tokio::test]
    async fn spy_error_propagates() {
        let f = FunctionBuilder::new().create_async(|_| anyhow::Ok(json!(1)));
        f.spy(|_, _, _| -> anyhow::Result<()> { anyhow::bail!("spy broke") });
        let err = f.call(vec![]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Execution);
        assert_eq!(err.message(), "spy broke");
    }
}
