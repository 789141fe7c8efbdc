//! Secret and password hashing via bcrypt.

use crate::error::{BridgeError, Result};

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Hash a secret with bcrypt (cost 10).
pub fn hash_secret(secret: &str) -> Result<String> {
    bcrypt::hash(secret, BCRYPT_COST)
        .map_err(|e| BridgeError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a secret against a bcrypt hash.
pub fn verify_secret(secret: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(secret, hash).map_err(|e| BridgeError::Internal(format!("bcrypt verify: {e}")))
}
