//! Minimal schema stand-ins.
//!
//! Each one exercises a single corner of the schema contract, so tests do not
//! depend on the bundled validators for edge cases.

use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use zfn::{Capabilities, MaybeAsync, ParseResult, Schema, SchemaError, SchemaRef, Value};

/// Accepts every value, but only through `parse_async`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsyncOnly;

impl Schema for AsyncOnly {
    fn capabilities(&self) -> Capabilities {
        Capabilities::ASYNC_ONLY
    }

    fn parse_async(&self, value: Value) -> BoxFuture<'static, Result<Value, SchemaError>> {
        future::ready(Ok(value)).boxed()
    }
}

/// Declares no entry points at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoParse;

impl Schema for NoParse {
    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE
    }
}

/// Accepts every value; its synchronous parse always suspends.
#[derive(Debug, Clone, Copy, Default)]
pub struct Suspending;

impl Schema for Suspending {
    fn capabilities(&self) -> Capabilities {
        Capabilities::FULL
    }

    fn parse(&self, value: Value) -> ParseResult {
        MaybeAsync::pending(async move { Ok(value) })
    }
}

/// Rejects every value with a fixed, unstructured message.
#[derive(Debug, Clone)]
pub struct Opaque(pub String);

impl Schema for Opaque {
    fn capabilities(&self) -> Capabilities {
        Capabilities::FULL
    }

    fn parse(&self, _value: Value) -> ParseResult {
        MaybeAsync::Ready(Err(SchemaError::Message(self.0.clone())))
    }
}

/// Rejects every value with a raw message, classified the way a foreign
/// validator's message would be.
#[derive(Debug, Clone)]
pub struct RawMessage(pub String);

impl Schema for RawMessage {
    fn capabilities(&self) -> Capabilities {
        Capabilities::FULL
    }

    fn parse(&self, _value: Value) -> ParseResult {
        MaybeAsync::Ready(Err(SchemaError::from_message(self.0.clone())))
    }
}

/// Wrap a stand-in for use with the builder.
pub fn shared(schema: impl Schema + 'static) -> SchemaRef {
    Arc::new(schema)
}
