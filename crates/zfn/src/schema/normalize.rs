//! Turning schema failures into validation errors.

use zfn_types::{Error, Issue, SchemaError};

use super::Position;

/// Raised when a synchronous parse suspends.
pub const SYNC_PARSE_PROMISE: &str = "Encountered Promise during synchronous parse. Use .createAsync() instead.";

/// Build the validation error for a schema failure at `position`.
///
/// Structured failures are reported by their first issue as
/// `Validation failed for <position> - Path: <a.b> - <message>`, where the
/// path part is left out for root issues. Opaque messages are forwarded with
/// asynchronous-parse references pointed at the asynchronous wrapper.
pub fn normalize(err: SchemaError, position: Position) -> Error {
    let message = match err.first_issue() {
        Some(issue) if !issue.message.is_empty() => describe(issue, position),
        _ => retarget_entry_points(&err.to_string()),
    };
    tracing::debug!(%position, %message, "validation failed");
    Error::validation(message)
}

fn describe(issue: &Issue, position: Position) -> String {
    if issue.path.is_empty() {
        format!("Validation failed for {} - {}", position, issue.message)
    } else {
        format!(
            "Validation failed for {} - Path: {} - {}",
            position,
            issue.dotted_path(),
            issue.message
        )
    }
}

fn retarget_entry_points(message: &str) -> String {
    message
        .replace("parseAsync", "createAsync")
        .replace("parse_async", "create_async")
}
