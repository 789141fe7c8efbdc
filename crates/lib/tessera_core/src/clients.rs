//! Client registration store.
//!
//! CRUD and lookup over OAuth client rows, secret generation and rotation,
//! and the designation of the system clients used for personal-access and
//! password grants. Clients are never deleted; revocation flips a flag and
//! cascades to the client's tokens.

use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;
use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{BridgeError, Result};
use crate::hashing;
use crate::models::Client;
use crate::owner::OwnerRef;

/// Generated client secret length.
const CLIENT_SECRET_LEN: usize = 40;

/// Generate a cryptographically random client secret (40 alphanumeric
/// chars).
fn generate_secret() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(CLIENT_SECRET_LEN)
        .map(char::from)
        .collect()
}

fn client_from_row(row: &SqliteRow) -> std::result::Result<Client, sqlx::Error> {
    Ok(Client {
        id: row.try_get("id")?,
        owner: OwnerRef::from_columns(row.try_get("user_kind")?, row.try_get("user_id")?),
        name: row.try_get("name")?,
        secret: row.try_get("secret")?,
        redirect: row.try_get("redirect")?,
        personal_access_client: row.try_get("personal_access_client")?,
        password_client: row.try_get("password_client")?,
        revoked: row.try_get("revoked")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        plain_secret: None,
    })
}

/// Store for OAuth client registrations.
#[derive(Clone)]
pub struct ClientStore {
    pool: SqlitePool,
    config: Config,
}

impl ClientStore {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        Self { pool, config }
    }

    /// The configuration this store was composed with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch a client by id.
    pub async fn find(&self, id: &str) -> Result<Option<Client>> {
        let row = sqlx::query(
            "SELECT id, user_kind, user_id, name, secret, redirect, \
                    personal_access_client, password_client, revoked, \
                    created_at, updated_at \
             FROM oauth_clients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(client_from_row).transpose()?)
    }

    /// Fetch a client by id, treating revoked clients as absent.
    pub async fn find_active(&self, id: &str) -> Result<Option<Client>> {
        Ok(self.find(id).await?.filter(|c| !c.revoked))
    }

    /// Fetch a client by id and owner. Both the discriminator and the row
    /// id must match.
    pub async fn find_for_user(&self, id: &str, owner: &OwnerRef) -> Result<Option<Client>> {
        let row = sqlx::query(
            "SELECT id, user_kind, user_id, name, secret, redirect, \
                    personal_access_client, password_client, revoked, \
                    created_at, updated_at \
             FROM oauth_clients \
             WHERE id = $1 AND user_kind = $2 AND user_id = $3",
        )
        .bind(id)
        .bind(&owner.kind)
        .bind(owner.id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(client_from_row).transpose()?)
    }

    /// All clients belonging to an owner, ordered by name.
    pub async fn for_user(&self, owner: &OwnerRef) -> Result<Vec<Client>> {
        let rows = sqlx::query(
            "SELECT id, user_kind, user_id, name, secret, redirect, \
                    personal_access_client, password_client, revoked, \
                    created_at, updated_at \
             FROM oauth_clients \
             WHERE user_kind = $1 AND user_id = $2 \
             ORDER BY name ASC",
        )
        .bind(&owner.kind)
        .bind(owner.id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|r| client_from_row(r).map_err(BridgeError::from))
            .collect()
    }

    /// Unrevoked clients belonging to an owner, ordered by name.
    pub async fn active_for_user(&self, owner: &OwnerRef) -> Result<Vec<Client>> {
        let mut clients = self.for_user(owner).await?;
        clients.retain(|c| !c.revoked);
        Ok(clients)
    }

    /// Resolve the designated personal access client.
    ///
    /// A fixed id in [`Config`] wins; otherwise the most recent designation
    /// row does. No designation (or a dangling one) is a configuration
    /// error, not an absent row.
    pub async fn personal_access_client(&self) -> Result<Client> {
        if let Some(id) = &self.config.personal_access_client_id {
            return self
                .find(id)
                .await?
                .ok_or(BridgeError::PersonalAccessClientNotFound);
        }

        let designated = sqlx::query_scalar::<_, String>(
            "SELECT client_id FROM oauth_personal_access_clients ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        match designated {
            None => Err(BridgeError::PersonalAccessClientNotFound),
            Some(client_id) => self
                .find(&client_id)
                .await?
                .ok_or(BridgeError::PersonalAccessClientNotFound),
        }
    }

    /// Register a new client.
    ///
    /// Confidential and personal-access clients get a generated secret,
    /// stored per the hashing policy; the plaintext is available once on
    /// the returned object's `plain_secret`.
    pub async fn create(
        &self,
        owner: Option<&OwnerRef>,
        name: &str,
        redirect: &str,
        personal_access: bool,
        password: bool,
        confidential: bool,
    ) -> Result<Client> {
        if !redirect.is_empty() {
            Url::parse(redirect)
                .map_err(|e| BridgeError::Validation(format!("invalid redirect URI: {e}")))?;
        }

        let plain = (confidential || personal_access).then(generate_secret);
        let stored = match plain.as_deref() {
            Some(s) if self.config.hash_client_secrets => Some(hashing::hash_secret(s)?),
            other => other.map(str::to_string),
        };

        let client = Client {
            id: Uuid::new_v4().to_string(),
            owner: owner.cloned(),
            name: name.to_string(),
            secret: stored,
            redirect: redirect.to_string(),
            personal_access_client: personal_access,
            password_client: password,
            revoked: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            plain_secret: plain,
        };

        sqlx::query(
            "INSERT INTO oauth_clients \
                 (id, user_kind, user_id, name, secret, redirect, \
                  personal_access_client, password_client, revoked, \
                  created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(&client.id)
        .bind(client.owner.as_ref().map(|o| o.kind.as_str()))
        .bind(client.owner.as_ref().map(|o| o.id))
        .bind(&client.name)
        .bind(&client.secret)
        .bind(&client.redirect)
        .bind(client.personal_access_client)
        .bind(client.password_client)
        .bind(client.revoked)
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(client)
    }

    /// Register the personal access system client and designate it as *the*
    /// one. The newest designation wins.
    pub async fn create_personal_access_client(
        &self,
        owner: Option<&OwnerRef>,
        name: &str,
        redirect: &str,
    ) -> Result<Client> {
        let client = self
            .create(owner, name, redirect, true, false, true)
            .await?;

        sqlx::query(
            "INSERT INTO oauth_personal_access_clients (client_id, created_at) VALUES ($1, $2)",
        )
        .bind(&client.id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(client_id = %client.id, "designated personal access client");
        Ok(client)
    }

    /// Register the password grant system client.
    pub async fn create_password_grant_client(
        &self,
        owner: Option<&OwnerRef>,
        name: &str,
        redirect: &str,
    ) -> Result<Client> {
        self.create(owner, name, redirect, false, true, true).await
    }

    /// Rename a client and/or change its redirect URI.
    pub async fn update(&self, client: &Client, name: &str, redirect: &str) -> Result<Client> {
        if !redirect.is_empty() {
            Url::parse(redirect)
                .map_err(|e| BridgeError::Validation(format!("invalid redirect URI: {e}")))?;
        }

        let updated_at = Utc::now();
        sqlx::query(
            "UPDATE oauth_clients SET name = $1, redirect = $2, updated_at = $3 WHERE id = $4",
        )
        .bind(name)
        .bind(redirect)
        .bind(updated_at)
        .bind(&client.id)
        .execute(&self.pool)
        .await?;

        Ok(Client {
            name: name.to_string(),
            redirect: redirect.to_string(),
            updated_at,
            ..client.clone()
        })
    }

    /// Replace the client's secret with a fresh random value. The id never
    /// changes; the previous secret stops authenticating immediately.
    pub async fn regenerate_secret(&self, client: &Client) -> Result<Client> {
        let plain = generate_secret();
        let stored = if self.config.hash_client_secrets {
            hashing::hash_secret(&plain)?
        } else {
            plain.clone()
        };

        let updated_at = Utc::now();
        sqlx::query("UPDATE oauth_clients SET secret = $1, updated_at = $2 WHERE id = $3")
            .bind(&stored)
            .bind(updated_at)
            .bind(&client.id)
            .execute(&self.pool)
            .await?;

        Ok(Client {
            secret: Some(stored),
            plain_secret: Some(plain),
            updated_at,
            ..client.clone()
        })
    }

    /// Whether a client id should be treated as revoked. Missing rows read
    /// as revoked.
    pub async fn revoked(&self, id: &str) -> Result<bool> {
        Ok(self.find(id).await?.is_none_or(|c| c.revoked))
    }

    /// Revoke a client and every token issued to it. Nothing is removed;
    /// both flags stay flipped forever.
    pub async fn delete(&self, client: &Client) -> Result<()> {
        let now = Utc::now();
        sqlx::query(
            "UPDATE oauth_access_tokens SET revoked = TRUE, updated_at = $1 WHERE client_id = $2",
        )
        .bind(now)
        .bind(&client.id)
        .execute(&self.pool)
        .await?;

        sqlx::query("UPDATE oauth_clients SET revoked = TRUE, updated_at = $1 WHERE id = $2")
            .bind(now)
            .bind(&client.id)
            .execute(&self.pool)
            .await?;

        info!(client_id = %client.id, "client revoked");
        Ok(())
    }
}
