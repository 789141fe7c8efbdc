//! Grant-engine repository adapters.
//!
//! Implementations of the [`crate::grant`] storage capabilities, backed by
//! the stores and the integrator's account provider. The polymorphic owner
//! payload is decoded here and nowhere deeper: inward of this module
//! everything is a typed [`crate::owner::OwnerRef`].

pub mod access_tokens;
pub mod auth_codes;
pub mod clients;
pub mod users;

pub use access_tokens::AccessTokenRepository;
pub use auth_codes::AuthCodeRepository;
pub use clients::ClientRepository;
pub use users::UserRepository;
