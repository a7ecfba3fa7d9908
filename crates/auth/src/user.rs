//! Login identities.

use thiserror::Error;

use billbook_core::{Entity, UserId};

use crate::password::{Password, PasswordHashString, hash_password, verify_password};
use crate::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("invalid user: {0}")]
    Validation(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// A user allowed to log in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    password_hash: PasswordHashString,
    role: Role,
}

impl User {
    /// Create a user, hashing the plain-text password. Emails are stored lowercase.
    pub fn register(
        id: UserId,
        name: impl Into<String>,
        email: &str,
        password: &Password,
        role: Role,
    ) -> Result<Self, AuthError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(AuthError::Validation("name cannot be empty".to_string()));
        }
        let email = normalize_email(email);
        if !email.contains('@') {
            return Err(AuthError::Validation(format!("'{email}' is not an email address")));
        }
        if password.as_str().is_empty() {
            return Err(AuthError::Validation("password cannot be empty".to_string()));
        }

        Ok(Self {
            id,
            name,
            email,
            password_hash: hash_password(password)?,
            role,
        })
    }

    /// Rebuild a stored user (hash already computed).
    pub fn from_parts(
        id: UserId,
        name: String,
        email: String,
        password_hash: PasswordHashString,
        role: Role,
    ) -> Self {
        Self {
            id,
            name,
            email,
            password_hash,
            role,
        }
    }

    pub fn id_typed(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &PasswordHashString {
        &self.password_hash
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Check a login attempt. Any failure, including a corrupt stored hash, is
    /// reported to the caller as `InvalidCredentials`.
    pub fn authenticate(&self, password: &Password) -> Result<(), AuthError> {
        match verify_password(password, &self.password_hash) {
            Ok(()) => Ok(()),
            Err(AuthError::InvalidCredentials) => Err(AuthError::InvalidCredentials),
            Err(e) => {
                tracing::error!(user_id = %self.id, error = %e, "stored password hash is unusable");
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

/// Lookup key for emails: trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_normalizes_email_and_hashes_password() {
        let user = User::register(
            UserId::new(),
            "Admin",
            "  Admin@Admin.com ",
            &Password::new("1234"),
            Role::admin(),
        )
        .unwrap();

        assert_eq!(user.email(), "admin@admin.com");
        assert_ne!(user.password_hash().as_str(), "1234");
        assert!(user.authenticate(&Password::new("1234")).is_ok());
        assert_eq!(
            user.authenticate(&Password::new("12345")),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn register_validates_input() {
        let pw = Password::new("x");
        assert!(User::register(UserId::new(), " ", "a@b.c", &pw, Role::clerk()).is_err());
        assert!(User::register(UserId::new(), "A", "nope", &pw, Role::clerk()).is_err());
        assert!(
            User::register(UserId::new(), "A", "a@b.c", &Password::new(""), Role::clerk()).is_err()
        );
    }

    #[test]
    fn corrupt_hash_fails_as_invalid_credentials() {
        let user = User::from_parts(
            UserId::new(),
            "A".to_string(),
            "a@b.c".to_string(),
            PasswordHashString::new("not-a-phc-string"),
            Role::clerk(),
        );
        assert_eq!(
            user.authenticate(&Password::new("x")),
            Err(AuthError::InvalidCredentials)
        );
    }
}
