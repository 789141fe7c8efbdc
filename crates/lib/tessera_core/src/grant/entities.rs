//! Request-scoped entities exchanged with the grant engine.
//!
//! These are not the persisted records: each lives for one grant-processing
//! request. The engine identifies the resource owner with nothing but a
//! single untyped string; see [`crate::owner`] for the payload that crosses
//! that channel.

use chrono::{DateTime, Utc};

use crate::scopes::Scope;

/// Client as the grant engine sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientEntity {
    pub id: String,
    pub name: String,
    pub redirect: String,
    pub confidential: bool,
}

/// Resource owner as the grant engine sees it: only the identifier channel.
#[derive(Debug, Clone)]
pub struct UserEntity {
    pub identifier: String,
}

/// Access token being issued. Built by
/// [`AccessTokenStorage::new_token`](crate::grant::AccessTokenStorage::new_token);
/// the engine assigns `id` and `expires_at` before handing it back for
/// persistence.
#[derive(Debug, Clone)]
pub struct AccessTokenEntity {
    /// Engine-assigned token id (the JWT `jti`).
    pub id: String,
    pub client: ClientEntity,
    pub scopes: Vec<Scope>,
    pub user_identifier: String,
    pub expires_at: DateTime<Utc>,
}

/// Authorization code being issued. Starts blank from
/// [`AuthCodeStorage::new_auth_code`](crate::grant::AuthCodeStorage::new_auth_code);
/// the engine populates every field before persistence.
#[derive(Debug, Clone)]
pub struct AuthCodeEntity {
    pub id: String,
    pub client: ClientEntity,
    pub scopes: Vec<Scope>,
    pub user_identifier: String,
    pub expires_at: DateTime<Utc>,
    pub redirect_uri: Option<String>,
}

impl AuthCodeEntity {
    /// A blank entity for the engine to populate.
    pub fn blank() -> Self {
        Self {
            id: String::new(),
            client: ClientEntity::default(),
            scopes: Vec::new(),
            user_identifier: String::new(),
            expires_at: Utc::now(),
            redirect_uri: None,
        }
    }
}
