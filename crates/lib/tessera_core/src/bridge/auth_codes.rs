//! Authorization-code adapter.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::accounts::AccountProvider;
use crate::error::{BridgeError, Result};
use crate::grant::{AuthCodeEntity, AuthCodeStorage};
use crate::owner::OwnerRef;
use crate::scopes;

/// Persistence adapter the grant engine calls while processing the
/// authorization_code grant.
pub struct AuthCodeRepository {
    pool: SqlitePool,
    accounts: Arc<dyn AccountProvider>,
}

impl AuthCodeRepository {
    pub fn new(pool: SqlitePool, accounts: Arc<dyn AccountProvider>) -> Self {
        Self { pool, accounts }
    }
}

#[async_trait]
impl AuthCodeStorage for AuthCodeRepository {
    fn new_auth_code(&self) -> AuthCodeEntity {
        AuthCodeEntity::blank()
    }

    async fn persist_new_auth_code(&self, code: &AuthCodeEntity) -> Result<()> {
        let owner = OwnerRef::decode(&code.user_identifier)?;
        let account = self
            .accounts
            .retrieve_by_id(&owner)
            .await?
            .ok_or_else(|| {
                BridgeError::Internal(format!(
                    "no account {}/{} for auth code {}",
                    owner.kind, owner.id, code.id
                ))
            })?;

        let owner = account.owner_ref();
        sqlx::query(
            "INSERT INTO oauth_auth_codes \
                 (id, client_id, user_kind, user_id, scopes, revoked, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&code.id)
        .bind(&code.client.id)
        .bind(&owner.kind)
        .bind(owner.id)
        .bind(scopes::scopes_to_json(&scopes::scopes_to_vec(&code.scopes)))
        .bind(false)
        .bind(code.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn revoke_auth_code(&self, code_id: &str) -> Result<()> {
        sqlx::query("UPDATE oauth_auth_codes SET revoked = TRUE WHERE id = $1")
            .bind(code_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn is_auth_code_revoked(&self, code_id: &str) -> Result<bool> {
        let revoked = sqlx::query_scalar::<_, bool>(
            "SELECT revoked FROM oauth_auth_codes WHERE id = $1",
        )
        .bind(code_id)
        .fetch_optional(&self.pool)
        .await?;
        // Unknown codes read as revoked.
        Ok(revoked.unwrap_or(true))
    }
}
