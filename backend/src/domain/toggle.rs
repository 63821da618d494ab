//! Add/remove semantics shared by favorites, the shopping cart and
//! subscriptions.
//!
//! Adding an existing pair and removing a missing pair are both conflicts;
//! the `details.code` field tells them apart.

use serde_json::json;

use crate::domain::Error;

/// Detail code for an ADD that found the pair already present.
pub const RELATION_EXISTS: &str = "relation_exists";
/// Detail code for a REMOVE that found no pair.
pub const RELATION_MISSING: &str = "relation_missing";

/// Requested membership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOp {
    /// Create the pair; fails if it already exists.
    Add,
    /// Delete the pair; fails if it is absent.
    Remove,
}

/// Result of a successful toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggled<T> {
    /// The pair was created; carries the view returned to the client.
    Added(T),
    /// The pair was deleted.
    Removed,
}

pub(crate) fn relation_exists(message: impl Into<String>) -> Error {
    Error::conflict(message).with_details(json!({ "code": RELATION_EXISTS }))
}

pub(crate) fn relation_missing(message: impl Into<String>) -> Error {
    Error::conflict(message).with_details(json!({ "code": RELATION_MISSING }))
}
