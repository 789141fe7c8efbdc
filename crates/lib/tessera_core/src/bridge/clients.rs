//! Client resolution and authentication adapter.

use async_trait::async_trait;

use crate::clients::ClientStore;
use crate::error::Result;
use crate::grant::{ClientEntity, ClientStorage};
use crate::hashing;
use crate::models::Client;

/// Client adapter for the grant engine: resolves active clients and checks
/// presented credentials against the configured secret policy.
pub struct ClientRepository {
    clients: ClientStore,
}

impl ClientRepository {
    pub fn new(clients: ClientStore) -> Self {
        Self { clients }
    }
}

fn entity_from(client: &Client) -> ClientEntity {
    ClientEntity {
        id: client.id.clone(),
        name: client.name.clone(),
        redirect: client.redirect.clone(),
        confidential: client.confidential(),
    }
}

/// Whether a client may use a grant type. System grants are reserved for
/// the matching system client; client_credentials needs a confidential
/// client.
fn handles_grant(client: &Client, grant_type: &str) -> bool {
    match grant_type {
        "password" => client.password_client,
        "personal_access" => client.personal_access_client,
        "client_credentials" => client.confidential(),
        _ => true,
    }
}

#[async_trait]
impl ClientStorage for ClientRepository {
    async fn client_entity(&self, client_id: &str) -> Result<Option<ClientEntity>> {
        Ok(self
            .clients
            .find_active(client_id)
            .await?
            .as_ref()
            .map(entity_from))
    }

    async fn validate_client(
        &self,
        client_id: &str,
        client_secret: Option<&str>,
        grant_type: &str,
    ) -> Result<bool> {
        let Some(client) = self.clients.find_active(client_id).await? else {
            return Ok(false);
        };

        if !handles_grant(&client, grant_type) {
            return Ok(false);
        }

        match (client.secret.as_deref(), client_secret) {
            // Public clients authenticate by id alone.
            (None, None) => Ok(true),
            (None, Some(_)) => Ok(false),
            (Some(_), None) => Ok(false),
            (Some(stored), Some(given)) => {
                if self.clients.config().hash_client_secrets {
                    hashing::verify_secret(given, stored)
                } else {
                    Ok(stored == given)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn client(password: bool, personal_access: bool, secret: Option<&str>) -> Client {
        Client {
            id: "c1".into(),
            owner: None,
            name: "test".into(),
            secret: secret.map(str::to_string),
            redirect: String::new(),
            personal_access_client: personal_access,
            password_client: password,
            revoked: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            plain_secret: None,
        }
    }

    #[test]
    fn system_grants_are_reserved() {
        assert!(handles_grant(&client(true, false, Some("s")), "password"));
        assert!(!handles_grant(&client(false, true, Some("s")), "password"));
        assert!(handles_grant(&client(false, true, Some("s")), "personal_access"));
        assert!(!handles_grant(&client(true, false, Some("s")), "personal_access"));
    }

    #[test]
    fn client_credentials_needs_a_secret() {
        assert!(handles_grant(&client(false, false, Some("s")), "client_credentials"));
        assert!(!handles_grant(&client(false, false, None), "client_credentials"));
    }

    #[test]
    fn authorization_code_is_open_to_all() {
        assert!(handles_grant(&client(false, false, None), "authorization_code"));
        assert!(handles_grant(&client(true, true, Some("s")), "authorization_code"));
    }
}
