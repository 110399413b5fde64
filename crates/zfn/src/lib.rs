//! zfn: schema-validated function wrappers.
//!
//! Wrap a function once, get argument and return validation plus test
//! instrumentation on every call:
//!
//! - **Schema adapter**: capability-checked schemas, normalized validation errors
//! - **Builder**: immutable argument/return schema configuration
//! - **Engine**: synchronous and asynchronous call pipelines
//! - **Instrumentation**: `mock`, `spy` and `on_error` on every wrapped function
//! - **Validators**: a small bundled schema set for `build` configurators
//!
//! # Example
//!
//! ```ignore
//! use serde_json::json;
//! use zfn::{MaybeAsync, Validators, zfn};
//!
//! let z = Validators;
//! let add = zfn()
//!     .args([z.number(), z.number()])?
//!     .returns(z.number())?
//!     .create(|args| {
//!         let sum: i64 = args.iter().filter_map(|v| v.as_i64()).sum();
//!         anyhow::Ok(json!(sum))
//!     });
//!
//! assert_eq!(add.call(vec![json!(5), json!(13)]).into_ready().unwrap()?, json!(18));
//! ```

pub mod builder;
pub mod engine;
pub mod instrument;
pub mod schema;
pub mod validators;

pub use builder::{FunctionBuilder, Signature};
pub use engine::{AsyncFunction, AsyncMode, Function, ON_ERROR_PROMISE, SPY_PROMISE, SyncFunction, SyncMode};
pub use instrument::{Outcome, SpyOutcome};
pub use schema::{Capabilities, ParseResult, SYNC_PARSE_PROMISE, Schema, SchemaRef, is_schema};
pub use validators::{Validator, Validators};
pub use zfn_types::{Error, ErrorKind, Issue, MaybeAsync, PathSegment, Result, SchemaError, Value};

/// Start configuring a wrapped function.
pub fn zfn() -> FunctionBuilder {
    FunctionBuilder::new()
}
