//! Shared test fixtures: an in-memory database and a canned account
//! directory.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tessera_core::accounts::{AccountProvider, AccountRecord, FindAndValidate, UsernameLookup};
use tessera_core::error::Result;
use tessera_core::owner::OwnerRef;

/// Open an in-memory database with the schema applied.
///
/// A single connection keeps every query on the same in-memory database.
pub async fn pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite");
    tessera_core::migrate::migrate(&pool)
        .await
        .expect("run migrations");
    pool
}

/// Canned account rows keyed by (kind, id), with usernames for lookups.
#[derive(Default)]
pub struct TestAccounts {
    rows: HashMap<(String, i64), (String, AccountRecord)>,
}

impl TestAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: &str, id: i64, username: &str, password_hash: Option<&str>) -> Self {
        self.rows.insert(
            (kind.to_string(), id),
            (
                username.to_string(),
                AccountRecord {
                    id,
                    kind: kind.to_string(),
                    password_hash: password_hash.map(str::to_string),
                },
            ),
        );
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl AccountProvider for TestAccounts {
    async fn retrieve_by_id(&self, owner: &OwnerRef) -> Result<Option<AccountRecord>> {
        Ok(self
            .rows
            .get(&(owner.kind.clone(), owner.id))
            .map(|(_, record)| record.clone()))
    }
}

#[async_trait]
impl UsernameLookup for TestAccounts {
    async fn find_by_username(&self, username: &str) -> Result<Option<AccountRecord>> {
        Ok(self
            .rows
            .values()
            .find(|(u, _)| u == username)
            .map(|(_, record)| record.clone()))
    }
}

/// A provider that validates credentials itself: accepts one fixed
/// username/password pair.
pub struct OneUserDirectory {
    pub username: String,
    pub password: String,
    pub account: AccountRecord,
}

#[async_trait]
impl FindAndValidate for OneUserDirectory {
    async fn find_and_validate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<AccountRecord>> {
        Ok((username == self.username && password == self.password)
            .then(|| self.account.clone()))
    }
}
