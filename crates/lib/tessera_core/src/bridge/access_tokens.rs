//! Access-token adapter.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::accounts::AccountProvider;
use crate::error::{BridgeError, Result};
use crate::events::{AccessTokenCreated, TokenEvents};
use crate::grant::{AccessTokenEntity, AccessTokenStorage, ClientEntity};
use crate::owner::OwnerRef;
use crate::scopes::{self, Scope};
use crate::tokens::{NewToken, TokenStore};

/// Persistence adapter the grant engine calls when issuing access tokens.
///
/// The entity's user identifier arrives as the JSON owner payload; it is
/// decoded here, resolved to a live account, and written as typed
/// discriminator/id columns.
pub struct AccessTokenRepository {
    tokens: TokenStore,
    accounts: Arc<dyn AccountProvider>,
    events: TokenEvents,
}

impl AccessTokenRepository {
    pub fn new(tokens: TokenStore, accounts: Arc<dyn AccountProvider>, events: TokenEvents) -> Self {
        Self {
            tokens,
            accounts,
            events,
        }
    }
}

#[async_trait]
impl AccessTokenStorage for AccessTokenRepository {
    fn new_token(
        &self,
        client: &ClientEntity,
        scopes: &[Scope],
        user_identifier: &str,
    ) -> AccessTokenEntity {
        AccessTokenEntity {
            id: String::new(),
            client: client.clone(),
            scopes: scopes.to_vec(),
            user_identifier: user_identifier.to_string(),
            expires_at: Utc::now(),
        }
    }

    async fn persist_new_access_token(&self, token: &AccessTokenEntity) -> Result<()> {
        let owner = OwnerRef::decode(&token.user_identifier)?;
        let account = self
            .accounts
            .retrieve_by_id(&owner)
            .await?
            .ok_or_else(|| {
                BridgeError::Internal(format!(
                    "no account {}/{} for access token {}",
                    owner.kind, owner.id, token.id
                ))
            })?;

        self.tokens
            .create(NewToken {
                id: token.id.clone(),
                client_id: token.client.id.clone(),
                owner: Some(account.owner_ref()),
                name: None,
                scopes: scopes::scopes_to_vec(&token.scopes),
                revoked: false,
                expires_at: token.expires_at,
            })
            .await?;

        info!(token_id = %token.id, client_id = %token.client.id, "access token created");
        self.events
            .access_token_created(&AccessTokenCreated {
                token_id: token.id.clone(),
                user_identifier: token.user_identifier.clone(),
                client_id: token.client.id.clone(),
            })
            .await;

        Ok(())
    }

    async fn revoke_access_token(&self, token_id: &str) -> Result<()> {
        self.tokens.revoke_access_token(token_id).await
    }

    async fn is_access_token_revoked(&self, token_id: &str) -> Result<bool> {
        self.tokens.is_access_token_revoked(token_id).await
    }
}
