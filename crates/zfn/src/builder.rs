//! FunctionBuilder: collects schemas, then wraps an implementation.
//!
//! Builders are values. Every configuration step returns a new builder that
//! starts from the old one and replaces what the step names, so a partially
//! configured builder can be shared and extended in different directions.
//!
//! ```ignore
//! use serde_json::json;
//! use zfn::{Signature, zfn};
//!
//! let add = zfn()
//!     .build(|z| Signature::new().args([z.number(), z.number()]).returns(z.number()))?
//!     .create(|args| {
//!         let sum: f64 = args.iter().filter_map(|v| v.as_f64()).sum();
//!         anyhow::Ok(json!(sum))
//!     });
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use zfn_types::{Error, Result, Value};

use crate::engine::{AsyncFunction, Function, SyncFunction};
use crate::instrument::{Instrumentation, Outcome, exec_fn};
use crate::schema::{SchemaRef, is_schema, ordinal};
use crate::validators::Validators;

/// Argument and return schemas for a wrapped function.
#[derive(Clone, Default)]
pub struct FunctionBuilder {
    args: Vec<SchemaRef>,
    returns: Option<SchemaRef>,
}

/// What a [`FunctionBuilder::build`] configurator asks for.
///
/// Unset fields leave the builder's existing configuration alone.
#[derive(Clone, Default)]
pub struct Signature {
    pub args: Option<Vec<SchemaRef>>,
    pub returns: Option<SchemaRef>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn args<I, S>(mut self, schemas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SchemaRef>,
    {
        self.args = Some(schemas.into_iter().map(Into::into).collect());
        self
    }

    pub fn returns(mut self, schema: impl Into<SchemaRef>) -> Self {
        self.returns = Some(schema.into());
        self
    }
}

impl FunctionBuilder {
    /// A builder with no schemas: arguments and results pass through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the argument schemas, position by position.
    ///
    /// Replaces any previous argument schemas. Requires at least one schema,
    /// and every schema must support asynchronous parsing.
    pub fn args<I, S>(&self, schemas: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<SchemaRef>,
    {
        let schemas: Vec<SchemaRef> = schemas.into_iter().map(Into::into).collect();
        if schemas.is_empty() {
            return Err(Error::configuration("args() requires at least one schema"));
        }
        if let Some(index) = schemas.iter().position(|s| !is_schema(s.as_ref())) {
            return Err(Error::configuration(format!(
                "args() received an invalid schema for the {} argument",
                ordinal(index + 1)
            )));
        }
        Ok(Self {
            args: schemas,
            returns: self.returns.clone(),
        })
    }

    /// Set the return schema, replacing any previous one.
    pub fn returns(&self, schema: impl Into<SchemaRef>) -> Result<Self> {
        let schema = schema.into();
        if !is_schema(schema.as_ref()) {
            return Err(Error::configuration("returns() requires a valid schema"));
        }
        Ok(Self {
            args: self.args.clone(),
            returns: Some(schema),
        })
    }

    /// Configure from a closure that is handed the bundled validators.
    pub fn build<F>(&self, configurator: F) -> Result<Self>
    where
        F: FnOnce(&Validators) -> Signature,
    {
        let signature = configurator(&Validators);
        let mut next = self.clone();
        if let Some(args) = signature.args {
            next = next.args(args)?;
        }
        if let Some(returns) = signature.returns {
            next = next.returns(returns)?;
        }
        Ok(next)
    }

    /// Wrap `f` in a synchronous function.
    ///
    /// The wrapper answers `Ready` whenever `f` does, and `Pending` only when
    /// `f` itself returns a pending outcome.
    pub fn create<F, R>(&self, f: F) -> SyncFunction
    where
        F: Fn(Vec<Value>) -> R + Send + Sync + 'static,
        R: Into<Outcome>,
    {
        self.materialize(f)
    }

    /// Wrap `f` in an asynchronous function. Every call returns a future.
    pub fn create_async<F, R>(&self, f: F) -> AsyncFunction
    where
        F: Fn(Vec<Value>) -> R + Send + Sync + 'static,
        R: Into<Outcome>,
    {
        self.materialize(f)
    }

    fn materialize<M, F, R>(&self, f: F) -> Function<M>
    where
        F: Fn(Vec<Value>) -> R + Send + Sync + 'static,
        R: Into<Outcome>,
    {
        tracing::debug!(
            args = self.args.len(),
            returns = self.returns.is_some(),
            "materializing wrapped function"
        );
        Function {
            schemas: Arc::new(self.clone()),
            options: Instrumentation::new(exec_fn(f)),
            mode: PhantomData,
        }
    }

    /// Argument schemas, in position order.
    pub fn arg_schemas(&self) -> &[SchemaRef] {
        &self.args
    }

    pub fn return_schema(&self) -> Option<&SchemaRef> {
        self.returns.as_ref()
    }
}

impl fmt::Debug for FunctionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionBuilder")
            .field("args", &self.args.len())
            .field("returns", &self.returns.is_some())
            .finish()
    }
}
