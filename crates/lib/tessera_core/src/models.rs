//! Persisted OAuth records.
//!
//! These are the rows the stores read and write, distinct from the
//! request-scoped entities in [`crate::grant::entities`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::owner::OwnerRef;

/// A registered OAuth client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    /// Owning account; `None` for system clients.
    pub owner: Option<OwnerRef>,
    pub name: String,
    /// Stored secret, plaintext or bcrypt hash depending on the configured
    /// policy. `None` for public clients.
    #[serde(skip_serializing)]
    pub secret: Option<String>,
    pub redirect: String,
    pub personal_access_client: bool,
    pub password_client: bool,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Plaintext secret, present only on the object returned by the write
    /// that generated it. Reloading the client never recovers it.
    #[serde(skip)]
    pub plain_secret: Option<String>,
}

impl Client {
    /// First-party clients are the application's own grant anchors.
    pub fn first_party(&self) -> bool {
        self.personal_access_client || self.password_client
    }

    /// A client is confidential when a secret is stored for it.
    pub fn confidential(&self) -> bool {
        self.secret.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// An issued access token, keyed by the grant engine's token id (the JWT
/// `jti` for JWT-issuing engines).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub id: String,
    pub client_id: String,
    pub owner: Option<OwnerRef>,
    /// Display name; set for personal access tokens.
    pub name: Option<String>,
    /// Ordered scope identifiers.
    pub scopes: Vec<String>,
    pub revoked: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TokenRecord {
    /// True once the expiry instant has passed.
    pub fn expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// An authorization code issued during the authorization_code grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCodeRecord {
    pub id: String,
    pub client_id: String,
    pub owner: Option<OwnerRef>,
    pub scopes: Vec<String>,
    pub revoked: bool,
    pub expires_at: DateTime<Utc>,
}
