//! Resource-owner credential adapter.

use async_trait::async_trait;

use crate::accounts::CredentialSource;
use crate::error::Result;
use crate::grant::{ClientEntity, UserEntity, UserStorage};
use crate::hashing;

/// Credential adapter for password-style grants.
///
/// Every rejection (unknown username or a failed check) is `Ok(None)`, so
/// callers cannot learn which step failed.
pub struct UserRepository {
    source: CredentialSource,
}

impl UserRepository {
    pub fn new(source: CredentialSource) -> Self {
        Self { source }
    }
}

#[async_trait]
impl UserStorage for UserRepository {
    async fn user_by_credentials(
        &self,
        username: &str,
        password: &str,
        _grant_type: &str,
        _client: &ClientEntity,
    ) -> Result<Option<UserEntity>> {
        let account = match &self.source {
            CredentialSource::Combined(provider) => {
                provider.find_and_validate(username, password).await?
            }
            CredentialSource::Lookup { accounts, check } => {
                match accounts.find_by_username(username).await? {
                    None => None,
                    Some(account) => {
                        let valid = match check {
                            Some(check) => check.validate_password_grant(&account, password).await?,
                            None => match account.password_hash.as_deref() {
                                Some(hash) => hashing::verify_secret(password, hash)?,
                                None => false,
                            },
                        };
                        valid.then_some(account)
                    }
                }
            }
        };

        Ok(account.map(|a| UserEntity {
            identifier: a.owner_ref().encode(),
        }))
    }
}
