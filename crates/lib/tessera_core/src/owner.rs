//! Polymorphic account references.
//!
//! A token, code, or client may belong to a row in any of several account
//! tables, so an owner is a (kind, id) pair and every "for this user" query
//! matches both fields. The grant engine only carries a single string for
//! "who is this", so the pair crosses that boundary JSON-encoded;
//! [`OwnerRef::encode`] and [`OwnerRef::decode`] are the only two places
//! where that encoding exists.

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Reference to an owning account: table discriminator plus row id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRef {
    /// Account-table discriminator (e.g. `"users"`, `"service_accounts"`).
    pub kind: String,
    /// Row id within the `kind` table.
    pub id: i64,
}

impl OwnerRef {
    pub fn new(kind: impl Into<String>, id: i64) -> Self {
        Self {
            kind: kind.into(),
            id,
        }
    }

    /// Serialize for the grant engine's single-string user-identifier
    /// channel.
    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("OwnerRef always serializes")
    }

    /// Decode a payload received back from the grant engine. Malformed
    /// input is a hard error; the caller must fail the whole request rather
    /// than drop the owner silently.
    pub fn decode(payload: &str) -> Result<Self, BridgeError> {
        serde_json::from_str(payload)
            .map_err(|e| BridgeError::MalformedOwner(format!("{payload:?}: {e}")))
    }

    /// Rebuild a reference from the nullable column pair used by the store.
    pub fn from_columns(kind: Option<String>, id: Option<i64>) -> Option<Self> {
        match (kind, id) {
            (Some(kind), Some(id)) => Some(Self { kind, id }),
            _ => None,
        }
    }
}
