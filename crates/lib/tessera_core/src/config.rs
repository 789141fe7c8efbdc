//! Engine configuration.

/// Runtime configuration for the token lifecycle engine.
///
/// Handed to the stores at composition time. There is no global mutable
/// state: two engines with different configs can coexist in one process.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Store only a bcrypt hash of client secrets. When disabled, secrets
    /// are stored in plaintext and reloading a client returns them as-is.
    pub hash_client_secrets: bool,

    /// Fixed id of the personal access client. When unset, the most
    /// recently designated client wins
    /// (see [`ClientStore::personal_access_client`](crate::clients::ClientStore::personal_access_client)).
    pub personal_access_client_id: Option<String>,

    /// Plaintext secret of the personal access client. Required when
    /// `hash_client_secrets` is on: the stored hash cannot be replayed
    /// through the issuance path, so the factory needs the original value.
    pub personal_access_client_secret: Option<String>,
}

impl Config {
    /// Reads configuration from environment variables.
    ///
    /// | Variable                           | Default |
    /// |------------------------------------|---------|
    /// | `TESSERA_HASH_CLIENT_SECRETS`      | `false` |
    /// | `TESSERA_PERSONAL_ACCESS_CLIENT`   | unset   |
    /// | `TESSERA_PERSONAL_ACCESS_SECRET`   | unset   |
    pub fn from_env() -> Self {
        Self {
            hash_client_secrets: std::env::var("TESSERA_HASH_CLIENT_SECRETS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            personal_access_client_id: std::env::var("TESSERA_PERSONAL_ACCESS_CLIENT").ok(),
            personal_access_client_secret: std::env::var("TESSERA_PERSONAL_ACCESS_SECRET").ok(),
        }
    }
}
