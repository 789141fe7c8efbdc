//! Scope normalization for storage.

use serde::{Deserialize, Serialize};

/// A single OAuth2 scope as the grant engine presents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub id: String,
}

impl Scope {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Flatten scope entities into their identifiers, preserving order.
pub fn scopes_to_vec(scopes: &[Scope]) -> Vec<String> {
    scopes.iter().map(|s| s.id.clone()).collect()
}

/// JSON form used by the relational store.
pub fn scopes_to_json(scopes: &[String]) -> String {
    serde_json::to_string(scopes).expect("scope list always serializes")
}

/// Parse the stored JSON form back into identifiers. A column that predates
/// the JSON format (or was truncated) reads as no scopes.
pub fn scopes_from_json(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}
