//! Schema adapter: the boundary between zfn and whatever validates values.
//!
//! A schema is anything implementing [`Schema`]. Acceptance is decided by the
//! capabilities a schema declares, not by its concrete type, so small
//! hand-written stand-ins are first-class citizens next to the bundled
//! [`Validator`](crate::validators::Validator).

mod adapter;
mod normalize;

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use zfn_types::{MaybeAsync, SchemaError, Value};

pub use adapter::{Mode, Position, ordinal, validate, validate_async, validate_sync};
pub use normalize::{SYNC_PARSE_PROMISE, normalize};

/// Outcome of a synchronous parse: ready, or unexpectedly pending.
pub type ParseResult = MaybeAsync<Result<Value, SchemaError>>;

/// Shared handle to a schema.
pub type SchemaRef = Arc<dyn Schema>;

/// Parse entry points a schema provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub parse: bool,
    pub parse_async: bool,
}

impl Capabilities {
    /// Both entry points.
    pub const FULL: Capabilities = Capabilities { parse: true, parse_async: true };
    /// Only the asynchronous entry point.
    pub const ASYNC_ONLY: Capabilities = Capabilities { parse: false, parse_async: true };
    /// Only the synchronous entry point.
    pub const SYNC_ONLY: Capabilities = Capabilities { parse: true, parse_async: false };
    /// Neither entry point.
    pub const NONE: Capabilities = Capabilities { parse: false, parse_async: false };
}

/// A validation schema.
///
/// Implementors declare which entry points they support through
/// [`capabilities`](Schema::capabilities) and override the matching methods.
/// The defaults report a missing synchronous parse as a plain message, and
/// route `parse_async` through `parse`.
pub trait Schema: Send + Sync {
    /// Declared entry points.
    fn capabilities(&self) -> Capabilities;

    /// Parse synchronously.
    ///
    /// Answers `Pending` when the schema has asynchronous refinements or
    /// transforms it cannot run to completion here.
    fn parse(&self, value: Value) -> ParseResult {
        let _ = value;
        MaybeAsync::Ready(Err(SchemaError::Message(
            "schema does not provide a synchronous parse".to_string(),
        )))
    }

    /// Parse asynchronously.
    fn parse_async(&self, value: Value) -> BoxFuture<'static, Result<Value, SchemaError>> {
        self.parse(value).into_future()
    }
}

impl fmt::Debug for dyn Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

/// Whether `schema` is usable for configuration.
///
/// Only the asynchronous entry point is checked. A schema without a
/// synchronous parse is still accepted and fails later, at call time, if a
/// synchronous wrapper tries to use it.
pub fn is_schema(schema: &dyn Schema) -> bool {
    schema.capabilities().parse_async
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Declared(Capabilities);

    impl Schema for Declared {
        fn capabilities(&self) -> Capabilities {
            self.0
        }
    }

    #[test]
    fn acceptance_depends_only_on_async_parse() {
        assert!(is_schema(&Declared(Capabilities::FULL)));
        assert!(is_schema(&Declared(Capabilities::ASYNC_ONLY)));
        assert!(!is_schema(&Declared(Capabilities::SYNC_ONLY)));
        assert!(!is_schema(&Declared(Capabilities::NONE)));
    }

    #[test]
    fn default_parse_reports_missing_entry_point() {
        let result = Declared(Capabilities::ASYNC_ONLY).parse(Value::Null);
        match result.into_ready() {
            Some(Err(SchemaError::Message(msg))) => assert!(msg.contains("synchronous parse")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn default_parse_async_routes_through_parse() {
        let result = Declared(Capabilities::NONE).parse_async(Value::Null).await;
        assert!(matches!(result, Err(SchemaError::Message(_))));
    }
}
