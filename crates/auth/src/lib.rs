//! `billbook-auth` — login identities, password hashing and bearer tokens.
//!
//! Decoupled from HTTP and storage: the API crate extracts tokens, the infra crate
//! stores users.

pub mod claims;
pub mod password;
pub mod roles;
pub mod token;
pub mod user;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use password::{Password, PasswordHashString, hash_password, verify_password};
pub use roles::Role;
pub use token::{Hs256JwtValidator, JwtValidator, TokenError, TokenIssuer};
pub use user::{AuthError, User, normalize_email};
