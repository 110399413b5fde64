//! zfn-types: pure data types shared by the zfn crates.
//!
//! - **Value**: the dynamic value every wrapped function consumes and produces
//! - **Issue / SchemaError**: what a schema reports when it rejects a value
//! - **MaybeAsync**: a result that is either ready now or still pending
//! - **Error**: the one error type a wrapped call can fail with

mod error;
mod issue;
mod maybe_async;

pub use error::{Error, ErrorKind, Result};
pub use issue::{Issue, PathSegment, SchemaError};
pub use maybe_async::MaybeAsync;

/// Dynamic value passed into and out of wrapped functions.
pub use serde_json::Value;
