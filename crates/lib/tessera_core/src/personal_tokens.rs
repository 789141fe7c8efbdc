//! Personal access tokens.
//!
//! Mints long-lived tokens for arbitrary accounts by feeding a synthetic
//! form-shaped request through the same issuance entry point real grants
//! take, so personal tokens get the engine's id assignment, expiry and
//! persistence for free.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::info;

use crate::clients::ClientStore;
use crate::error::{BridgeError, Result};
use crate::grant::{TokenIssuer, TokenRequest};
use crate::models::TokenRecord;
use crate::owner::OwnerRef;
use crate::tokens::TokenStore;

/// The raw bearer string plus the persisted record. The raw token is shown
/// to the caller exactly once; the store only keeps the engine's token id.
#[derive(Debug)]
pub struct PersonalAccessTokenResult {
    pub access_token: String,
    pub token: TokenRecord,
}

#[derive(Deserialize)]
struct IssuedBody {
    access_token: String,
}

#[derive(Deserialize)]
struct RawClaims {
    jti: String,
}

/// Extract the token id from an issued JWT.
///
/// The signature is deliberately not checked: the engine minted this token
/// in-process a moment ago, and this parse is an id lookup, not an
/// authenticity decision.
fn token_id_from_jwt(raw: &str) -> Result<String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = jsonwebtoken::decode::<RawClaims>(raw, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| BridgeError::Token(format!("jwt parse: {e}")))?;
    Ok(data.claims.jti)
}

/// Factory for personal access tokens.
pub struct PersonalAccessTokenFactory {
    issuer: Arc<dyn TokenIssuer>,
    clients: ClientStore,
    tokens: TokenStore,
}

impl PersonalAccessTokenFactory {
    pub fn new(issuer: Arc<dyn TokenIssuer>, clients: ClientStore, tokens: TokenStore) -> Self {
        Self {
            issuer,
            clients,
            tokens,
        }
    }

    /// Mint a personal access token for an account.
    ///
    /// Dispatches a synthetic `personal_access` grant request under the
    /// designated system client, then names the persisted record and binds
    /// it to its owner.
    pub async fn make(
        &self,
        owner: &OwnerRef,
        name: &str,
        scopes: &[String],
    ) -> Result<PersonalAccessTokenResult> {
        let client = self.clients.personal_access_client().await?;
        let client_secret = self
            .clients
            .config()
            .personal_access_client_secret
            .clone()
            .or_else(|| client.plain_secret.clone())
            .or_else(|| client.secret.clone());

        let request = TokenRequest {
            grant_type: "personal_access".to_string(),
            client_id: client.id.clone(),
            client_secret,
            user_id: Some(owner.encode()),
            scope: scopes.join(" "),
        };

        let response = self.issuer.respond_to_access_token_request(&request).await?;
        let body: IssuedBody = serde_json::from_str(&response.body)
            .map_err(|e| BridgeError::Grant(format!("malformed issuance response: {e}")))?;

        let token_id = token_id_from_jwt(&body.access_token)?;
        let mut token = self.tokens.find(&token_id).await?.ok_or_else(|| {
            BridgeError::Token(format!("issued token {token_id} has no stored record"))
        })?;

        token.owner = Some(owner.clone());
        token.name = Some(name.to_string());
        self.tokens.save(&token).await?;

        info!(token_id = %token.id, client_id = %client.id, name, "personal access token created");
        Ok(PersonalAccessTokenResult {
            access_token: body.access_token,
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Claims {
        jti: String,
        sub: String,
        exp: i64,
    }

    #[test]
    fn token_id_comes_from_jti() {
        let claims = Claims {
            jti: "token-123".into(),
            sub: "{\"kind\":\"users\",\"id\":1}".into(),
            exp: 4102444800,
        };
        let raw = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        // Parsed without knowing the signing secret.
        assert_eq!(token_id_from_jwt(&raw).unwrap(), "token-123");
    }

    #[test]
    fn opaque_strings_do_not_parse() {
        assert!(token_id_from_jwt("not-a-jwt").is_err());
        assert!(token_id_from_jwt("").is_err());
    }
}
