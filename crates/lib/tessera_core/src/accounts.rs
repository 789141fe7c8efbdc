//! Pluggable account resolution.
//!
//! The engine does not own any user table. Integrators supply an account
//! provider, and the capability a provider supports is chosen once at
//! composition time. There is no per-call probing for methods.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::owner::OwnerRef;

/// A resolved account row from one of the integrator's account tables.
#[derive(Debug, Clone)]
pub struct AccountRecord {
    /// Row id within the account table.
    pub id: i64,
    /// Table discriminator, carried into every owner reference built from
    /// this account.
    pub kind: String,
    /// Stored credential hash, when the table has one.
    pub password_hash: Option<String>,
}

impl AccountRecord {
    /// The polymorphic reference identifying this account.
    pub fn owner_ref(&self) -> OwnerRef {
        OwnerRef::new(self.kind.clone(), self.id)
    }
}

/// Resolve accounts by polymorphic reference.
#[async_trait]
pub trait AccountProvider: Send + Sync {
    /// Fetch the account a reference points at, or `None` if the row is
    /// gone.
    async fn retrieve_by_id(&self, owner: &OwnerRef) -> Result<Option<AccountRecord>>;
}

/// Combined find-and-validate capability: the provider checks the password
/// itself and returns the account only on success.
#[async_trait]
pub trait FindAndValidate: Send + Sync {
    async fn find_and_validate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<AccountRecord>>;
}

/// Lookup-only capability: fetch a candidate account by username; the
/// caller validates the credential separately.
#[async_trait]
pub trait UsernameLookup: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<AccountRecord>>;
}

/// Provider-supplied password check, overriding the default bcrypt
/// comparison against [`AccountRecord::password_hash`].
#[async_trait]
pub trait PasswordGrantCheck: Send + Sync {
    async fn validate_password_grant(
        &self,
        account: &AccountRecord,
        password: &str,
    ) -> Result<bool>;
}

/// The credential-resolution capability selected by the composition root.
///
/// Which column `find_by_username` queries is the lookup implementation's
/// decision. An email-column lookup is one deliberate choice among others,
/// not a fallback the engine probes for at runtime.
#[derive(Clone)]
pub enum CredentialSource {
    /// The provider validates credentials itself.
    Combined(Arc<dyn FindAndValidate>),
    /// Fetch by username, then check the password: the provider's own
    /// check when given, else bcrypt against the stored hash.
    Lookup {
        accounts: Arc<dyn UsernameLookup>,
        check: Option<Arc<dyn PasswordGrantCheck>>,
    },
}
