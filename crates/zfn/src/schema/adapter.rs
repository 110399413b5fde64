//! Running a schema against one value in a chosen mode.

use std::fmt;

use futures::future::{BoxFuture, FutureExt};
use zfn_types::{Error, MaybeAsync, Result, Value};

use super::normalize::{SYNC_PARSE_PROMISE, normalize};
use super::Schema;

/// How a schema is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Synchronous parse; suspending is a contract violation.
    Sync,
    /// Asynchronous parse, always awaited.
    Async,
}

/// What is being validated. Argument positions are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Argument(usize),
    Return,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Argument(n) => write!(f, "{} argument", ordinal(*n)),
            Position::Return => f.write_str("return value"),
        }
    }
}

/// English ordinal for `n`: `1st`, `2nd`, `3rd`, `4th`, `11th`, `21st`, ...
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 100, n % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Validate `value` against `schema`.
///
/// `Mode::Sync` always answers `Ready`; `Mode::Async` always answers
/// `Pending`. See [`validate_sync`] and [`validate_async`].
pub fn validate(schema: &dyn Schema, value: Value, position: Position, mode: Mode) -> MaybeAsync<Result<Value>> {
    match mode {
        Mode::Sync => MaybeAsync::Ready(validate_sync(schema, value, position)),
        Mode::Async => MaybeAsync::Pending(validate_async(schema, value, position)),
    }
}

/// Validate with the schema's synchronous parse.
///
/// If the schema suspends, the pending parse is dropped and the answer is a
/// contract violation.
pub fn validate_sync(schema: &dyn Schema, value: Value, position: Position) -> Result<Value> {
    match schema.parse(value) {
        MaybeAsync::Ready(parsed) => parsed.map_err(|err| normalize(err, position)),
        MaybeAsync::Pending(_) => {
            tracing::warn!(%position, "schema suspended during synchronous parse");
            Err(Error::contract(SYNC_PARSE_PROMISE))
        }
    }
}

/// Validate with the schema's asynchronous parse.
pub fn validate_async(schema: &dyn Schema, value: Value, position: Position) -> BoxFuture<'static, Result<Value>> {
    let parsed = schema.parse_async(value);
    async move { parsed.await.map_err(|err| normalize(err, position)) }.boxed()
}
