//! Grant-engine adapter behavior: owner payload decoding, auth-code
//! persistence, issuance notifications and credential resolution.

mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tessera_core::accounts::{AccountRecord, CredentialSource, PasswordGrantCheck};
use tessera_core::bridge::{AccessTokenRepository, AuthCodeRepository, UserRepository};
use tessera_core::error::{BridgeError, Result};
use tessera_core::events::{AccessTokenCreated, TokenEventListener, TokenEvents};
use tessera_core::grant::{
    AccessTokenStorage, AuthCodeStorage, ClientEntity, UserStorage,
};
use tessera_core::hashing;
use tessera_core::owner::OwnerRef;
use tessera_core::scopes::Scope;
use tessera_core::tokens::TokenStore;

fn client_entity() -> ClientEntity {
    ClientEntity {
        id: "client-1".to_string(),
        name: "api".to_string(),
        redirect: "https://example.com/cb".to_string(),
        confidential: true,
    }
}

/// Records every notification it receives.
#[derive(Default)]
struct RecordingListener {
    events: Mutex<Vec<AccessTokenCreated>>,
}

#[async_trait]
impl TokenEventListener for RecordingListener {
    async fn access_token_created(&self, event: &AccessTokenCreated) -> Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

#[tokio::test]
async fn auth_codes_persist_with_a_typed_owner() {
    let pool = common::pool().await;
    let accounts = common::TestAccounts::new()
        .with("users", 5, "ada", None)
        .into_arc();
    let repo = AuthCodeRepository::new(pool.clone(), accounts);

    let mut code = repo.new_auth_code();
    code.id = "code-1".to_string();
    code.client = client_entity();
    code.scopes = vec![Scope::new("read")];
    code.user_identifier = OwnerRef::new("users", 5).encode();
    code.expires_at = Utc::now() + Duration::minutes(10);
    repo.persist_new_auth_code(&code).await.unwrap();

    let (kind, id): (String, i64) =
        sqlx::query_as("SELECT user_kind, user_id FROM oauth_auth_codes WHERE id = $1")
            .bind("code-1")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!((kind.as_str(), id), ("users", 5));

    assert!(!repo.is_auth_code_revoked("code-1").await.unwrap());
    repo.revoke_auth_code("code-1").await.unwrap();
    assert!(repo.is_auth_code_revoked("code-1").await.unwrap());
}

#[tokio::test]
async fn unknown_auth_codes_read_as_revoked() {
    let pool = common::pool().await;
    let repo = AuthCodeRepository::new(pool, common::TestAccounts::new().into_arc());
    assert!(repo.is_auth_code_revoked("never-issued").await.unwrap());
}

#[tokio::test]
async fn malformed_owner_payloads_fail_hard() {
    let pool = common::pool().await;
    let accounts = common::TestAccounts::new()
        .with("users", 5, "ada", None)
        .into_arc();
    let codes = AuthCodeRepository::new(pool.clone(), accounts.clone());
    let tokens = AccessTokenRepository::new(
        TokenStore::new(pool.clone()),
        accounts,
        TokenEvents::empty(),
    );

    let mut code = codes.new_auth_code();
    code.id = "code-1".to_string();
    code.client = client_entity();
    code.user_identifier = "5".to_string();
    code.expires_at = Utc::now() + Duration::minutes(10);
    assert!(matches!(
        codes.persist_new_auth_code(&code).await,
        Err(BridgeError::MalformedOwner(_))
    ));

    let mut token = tokens.new_token(&client_entity(), &[], "not json");
    token.id = "tok-1".to_string();
    token.expires_at = Utc::now() + Duration::hours(1);
    assert!(matches!(
        tokens.persist_new_access_token(&token).await,
        Err(BridgeError::MalformedOwner(_))
    ));
}

#[tokio::test]
async fn persisting_for_a_missing_account_fails() {
    let pool = common::pool().await;
    let repo = AccessTokenRepository::new(
        TokenStore::new(pool),
        common::TestAccounts::new().into_arc(),
        TokenEvents::empty(),
    );

    let mut token = repo.new_token(
        &client_entity(),
        &[],
        &OwnerRef::new("users", 404).encode(),
    );
    token.id = "tok-1".to_string();
    token.expires_at = Utc::now() + Duration::hours(1);
    assert!(matches!(
        repo.persist_new_access_token(&token).await,
        Err(BridgeError::Internal(_))
    ));
}

#[tokio::test]
async fn persisted_tokens_carry_owner_scopes_and_fire_one_event() {
    let pool = common::pool().await;
    let accounts = common::TestAccounts::new()
        .with("service_accounts", 8, "deploy-bot", None)
        .into_arc();
    let listener = Arc::new(RecordingListener::default());
    let store = TokenStore::new(pool.clone());
    let repo = AccessTokenRepository::new(
        store.clone(),
        accounts,
        TokenEvents::new(vec![listener.clone()]),
    );

    let payload = OwnerRef::new("service_accounts", 8).encode();
    let mut token = repo.new_token(
        &client_entity(),
        &[Scope::new("read"), Scope::new("write")],
        &payload,
    );
    token.id = "tok-1".to_string();
    token.expires_at = Utc::now() + Duration::hours(1);
    repo.persist_new_access_token(&token).await.unwrap();

    let record = store.find("tok-1").await.unwrap().unwrap();
    assert_eq!(record.owner, Some(OwnerRef::new("service_accounts", 8)));
    assert_eq!(record.scopes, vec!["read", "write"]);
    assert!(!record.revoked);

    let events = listener.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].token_id, "tok-1");
    assert_eq!(events[0].user_identifier, payload);
    assert_eq!(events[0].client_id, "client-1");

    drop(events);
    assert!(!repo.is_access_token_revoked("tok-1").await.unwrap());
    repo.revoke_access_token("tok-1").await.unwrap();
    assert!(repo.is_access_token_revoked("tok-1").await.unwrap());
}

#[tokio::test]
async fn combined_source_resolves_and_rejects() {
    let account = AccountRecord {
        id: 5,
        kind: "users".to_string(),
        password_hash: None,
    };
    let repo = UserRepository::new(CredentialSource::Combined(Arc::new(
        common::OneUserDirectory {
            username: "ada".to_string(),
            password: "hunter2".to_string(),
            account,
        },
    )));

    let user = repo
        .user_by_credentials("ada", "hunter2", "password", &client_entity())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        OwnerRef::decode(&user.identifier).unwrap(),
        OwnerRef::new("users", 5)
    );

    assert!(
        repo.user_by_credentials("ada", "wrong", "password", &client_entity())
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        repo.user_by_credentials("grace", "hunter2", "password", &client_entity())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn lookup_source_verifies_the_stored_hash() {
    let hash = hashing::hash_secret("hunter2").unwrap();
    let accounts = common::TestAccounts::new()
        .with("users", 5, "ada", Some(&hash))
        .with("users", 6, "bare", None)
        .into_arc();
    let repo = UserRepository::new(CredentialSource::Lookup {
        accounts,
        check: None,
    });

    assert!(
        repo.user_by_credentials("ada", "hunter2", "password", &client_entity())
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        repo.user_by_credentials("ada", "wrong", "password", &client_entity())
            .await
            .unwrap()
            .is_none()
    );
    // No stored hash means no way to validate: absent, not an error.
    assert!(
        repo.user_by_credentials("bare", "anything", "password", &client_entity())
            .await
            .unwrap()
            .is_none()
    );
}

/// Accepts exactly one fixed passphrase, whatever the stored hash says.
struct FixedPhraseCheck;

#[async_trait]
impl PasswordGrantCheck for FixedPhraseCheck {
    async fn validate_password_grant(
        &self,
        _account: &AccountRecord,
        password: &str,
    ) -> Result<bool> {
        Ok(password == "sesame-open")
    }
}

#[tokio::test]
async fn lookup_source_prefers_the_provider_check() {
    let hash = hashing::hash_secret("hunter2").unwrap();
    let accounts = common::TestAccounts::new()
        .with("users", 5, "ada", Some(&hash))
        .into_arc();
    let repo = UserRepository::new(CredentialSource::Lookup {
        accounts,
        check: Some(Arc::new(FixedPhraseCheck)),
    });

    // The provider check wins over the stored hash.
    assert!(
        repo.user_by_credentials("ada", "hunter2", "password", &client_entity())
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        repo.user_by_credentials("ada", "sesame-open", "password", &client_entity())
            .await
            .unwrap()
            .is_some()
    );
}
