//! Grant-engine contract.
//!
//! The OAuth2 state machine lives outside this crate. This module is the
//! boundary it is consumed through: the request-scoped entity shapes, the
//! storage capability sets the engine calls during grant processing, and
//! the token-issuance entry point the personal-access factory dispatches
//! synthetic requests to.

pub mod entities;

pub use entities::{AccessTokenEntity, AuthCodeEntity, ClientEntity, UserEntity};

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::scopes::Scope;

/// Storage capability for authorization codes.
#[async_trait]
pub trait AuthCodeStorage: Send + Sync {
    /// Hand the engine a blank code entity to populate.
    fn new_auth_code(&self) -> AuthCodeEntity;

    /// Persist a fully populated code entity.
    async fn persist_new_auth_code(&self, code: &AuthCodeEntity) -> Result<()>;

    async fn revoke_auth_code(&self, code_id: &str) -> Result<()>;

    /// Fails closed: an unknown code id reads as revoked.
    async fn is_auth_code_revoked(&self, code_id: &str) -> Result<bool>;
}

/// Storage capability for access tokens.
#[async_trait]
pub trait AccessTokenStorage: Send + Sync {
    /// Build a token entity for the engine to assign an id and expiry to.
    fn new_token(
        &self,
        client: &ClientEntity,
        scopes: &[Scope],
        user_identifier: &str,
    ) -> AccessTokenEntity;

    /// Persist a token entity after the engine has assigned its id and
    /// expiry. The entity's user identifier must decode to an owner
    /// reference; malformed payloads fail the whole request.
    async fn persist_new_access_token(&self, token: &AccessTokenEntity) -> Result<()>;

    async fn revoke_access_token(&self, token_id: &str) -> Result<()>;

    /// Fails closed: an unknown token id reads as revoked.
    async fn is_access_token_revoked(&self, token_id: &str) -> Result<bool>;
}

/// Resource-owner credential capability used by password-style grants.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Resolve and validate a resource owner. Absence is the only failure
    /// signal; bad username and bad password are indistinguishable.
    async fn user_by_credentials(
        &self,
        username: &str,
        password: &str,
        grant_type: &str,
        client: &ClientEntity,
    ) -> Result<Option<UserEntity>>;
}

/// Client resolution and authentication capability.
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Resolve an active client for the engine, or `None`.
    async fn client_entity(&self, client_id: &str) -> Result<Option<ClientEntity>>;

    /// Authenticate a client for a grant type.
    async fn validate_client(
        &self,
        client_id: &str,
        client_secret: Option<&str>,
        grant_type: &str,
    ) -> Result<bool>;
}

/// Form-shaped token request accepted by the issuance entry point.
#[derive(Debug, Clone, Serialize)]
pub struct TokenRequest {
    pub grant_type: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    /// The engine's single scalar channel for "who is this"; see
    /// [`crate::owner::OwnerRef::encode`].
    pub user_id: Option<String>,
    /// Space-joined scope identifiers.
    pub scope: String,
}

/// HTTP-shaped issuance response: `body` is the JSON document the engine
/// would have written to the wire, containing at least `access_token`.
#[derive(Debug, Clone)]
pub struct TokenResponse {
    pub body: String,
}

/// Token-issuance entry point of the grant engine.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn respond_to_access_token_request(
        &self,
        request: &TokenRequest,
    ) -> Result<TokenResponse>;
}
