//! Access token store.
//!
//! CRUD and lookup over issued token rows, keyed by the grant engine's
//! opaque token id. Tokens are never deleted; revocation flips a flag that
//! is never reset.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::error::{BridgeError, Result};
use crate::models::{Client, TokenRecord};
use crate::owner::OwnerRef;
use crate::scopes;

/// Attributes for a new token row.
#[derive(Debug, Clone)]
pub struct NewToken {
    pub id: String,
    pub client_id: String,
    pub owner: Option<OwnerRef>,
    pub name: Option<String>,
    pub scopes: Vec<String>,
    pub revoked: bool,
    pub expires_at: DateTime<Utc>,
}

fn token_from_row(row: &SqliteRow) -> std::result::Result<TokenRecord, sqlx::Error> {
    let raw_scopes: String = row.try_get("scopes")?;
    Ok(TokenRecord {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        owner: OwnerRef::from_columns(row.try_get("user_kind")?, row.try_get("user_id")?),
        name: row.try_get("name")?,
        scopes: scopes::scopes_from_json(&raw_scopes),
        revoked: row.try_get("revoked")?,
        expires_at: row.try_get("expires_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Store for issued access tokens.
#[derive(Clone)]
pub struct TokenStore {
    pool: SqlitePool,
}

impl TokenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new token row.
    pub async fn create(&self, attributes: NewToken) -> Result<TokenRecord> {
        let now = Utc::now();
        let token = TokenRecord {
            id: attributes.id,
            client_id: attributes.client_id,
            owner: attributes.owner,
            name: attributes.name,
            scopes: attributes.scopes,
            revoked: attributes.revoked,
            expires_at: attributes.expires_at,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO oauth_access_tokens \
                 (id, client_id, user_kind, user_id, name, scopes, revoked, \
                  expires_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&token.id)
        .bind(&token.client_id)
        .bind(token.owner.as_ref().map(|o| o.kind.as_str()))
        .bind(token.owner.as_ref().map(|o| o.id))
        .bind(&token.name)
        .bind(scopes::scopes_to_json(&token.scopes))
        .bind(token.revoked)
        .bind(token.expires_at)
        .bind(token.created_at)
        .bind(token.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(token)
    }

    /// Fetch a token by id.
    pub async fn find(&self, id: &str) -> Result<Option<TokenRecord>> {
        let row = sqlx::query(
            "SELECT id, client_id, user_kind, user_id, name, scopes, revoked, \
                    expires_at, created_at, updated_at \
             FROM oauth_access_tokens WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(token_from_row).transpose()?)
    }

    /// Fetch a token by id and owner. Both the discriminator and the row id
    /// must match.
    pub async fn find_for_user(&self, id: &str, owner: &OwnerRef) -> Result<Option<TokenRecord>> {
        let row = sqlx::query(
            "SELECT id, client_id, user_kind, user_id, name, scopes, revoked, \
                    expires_at, created_at, updated_at \
             FROM oauth_access_tokens \
             WHERE id = $1 AND user_kind = $2 AND user_id = $3",
        )
        .bind(id)
        .bind(&owner.kind)
        .bind(owner.id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(token_from_row).transpose()?)
    }

    /// All tokens belonging to an owner.
    pub async fn for_user(&self, owner: &OwnerRef) -> Result<Vec<TokenRecord>> {
        let rows = sqlx::query(
            "SELECT id, client_id, user_kind, user_id, name, scopes, revoked, \
                    expires_at, created_at, updated_at \
             FROM oauth_access_tokens \
             WHERE user_kind = $1 AND user_id = $2",
        )
        .bind(&owner.kind)
        .bind(owner.id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|r| token_from_row(r).map_err(BridgeError::from))
            .collect()
    }

    /// Some unrevoked, unexpired token for the owner/client pair. Which of
    /// several valid rows comes back is unspecified; callers that care use
    /// [`TokenStore::find_valid_token`].
    pub async fn get_valid_token(
        &self,
        owner: &OwnerRef,
        client: &Client,
    ) -> Result<Option<TokenRecord>> {
        let row = sqlx::query(
            "SELECT id, client_id, user_kind, user_id, name, scopes, revoked, \
                    expires_at, created_at, updated_at \
             FROM oauth_access_tokens \
             WHERE client_id = $1 AND user_kind = $2 AND user_id = $3 \
               AND revoked = FALSE AND expires_at > $4 \
             LIMIT 1",
        )
        .bind(&client.id)
        .bind(&owner.kind)
        .bind(owner.id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(token_from_row).transpose()?)
    }

    /// The unrevoked, unexpired token with the latest expiry for the
    /// owner/client pair.
    pub async fn find_valid_token(
        &self,
        owner: &OwnerRef,
        client: &Client,
    ) -> Result<Option<TokenRecord>> {
        let row = sqlx::query(
            "SELECT id, client_id, user_kind, user_id, name, scopes, revoked, \
                    expires_at, created_at, updated_at \
             FROM oauth_access_tokens \
             WHERE client_id = $1 AND user_kind = $2 AND user_id = $3 \
               AND revoked = FALSE AND expires_at > $4 \
             ORDER BY expires_at DESC \
             LIMIT 1",
        )
        .bind(&client.id)
        .bind(&owner.kind)
        .bind(owner.id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(token_from_row).transpose()?)
    }

    /// Persist mutations to a token's owner, name and scopes. The revoked
    /// flag is only ever set through [`TokenStore::revoke_access_token`],
    /// which keeps revocation one-way.
    pub async fn save(&self, token: &TokenRecord) -> Result<()> {
        sqlx::query(
            "UPDATE oauth_access_tokens \
             SET user_kind = $1, user_id = $2, name = $3, scopes = $4, updated_at = $5 \
             WHERE id = $6",
        )
        .bind(token.owner.as_ref().map(|o| o.kind.as_str()))
        .bind(token.owner.as_ref().map(|o| o.id))
        .bind(&token.name)
        .bind(scopes::scopes_to_json(&token.scopes))
        .bind(Utc::now())
        .bind(&token.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Revoke a token. Idempotent: concurrent revokes converge on
    /// revoked=true.
    pub async fn revoke_access_token(&self, id: &str) -> Result<()> {
        sqlx::query(
            "UPDATE oauth_access_tokens SET revoked = TRUE, updated_at = $1 WHERE id = $2",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Whether a token id should be treated as revoked. Missing rows read
    /// as revoked.
    pub async fn is_access_token_revoked(&self, id: &str) -> Result<bool> {
        Ok(self.find(id).await?.is_none_or(|t| t.revoked))
    }
}
