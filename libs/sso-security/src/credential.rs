use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::constants::USERNAME_PASSWORD_KIND;

/// Kind of a presented credential, used to match it against handler
/// capabilities (e.g. `username_password`, `http_service`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialKind(String);

impl CredentialKind {
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    #[must_use]
    pub fn username_password() -> Self {
        Self(USERNAME_PASSWORD_KIND.to_owned())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CredentialKind {
    fn from(kind: &str) -> Self {
        Self(kind.to_owned())
    }
}

/// A presented proof of identity.
///
/// Immutable once built: handlers, populators and the context only ever see
/// shared references. The secret is wrapped in `SecretString` so `Debug`
/// output never leaks it.
#[derive(Debug, Clone)]
pub struct Credential {
    id: String,
    kind: CredentialKind,
    secret: Option<SecretString>,
    remember_me: bool,
}

impl Credential {
    /// Create a credential of an arbitrary kind without a secret.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: impl Into<CredentialKind>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            secret: None,
            remember_me: false,
        }
    }

    /// Create a name + secret credential.
    #[must_use]
    pub fn username_password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: username.into(),
            kind: CredentialKind::username_password(),
            secret: Some(SecretString::from(password.into())),
            remember_me: false,
        }
    }

    /// Return a copy of this credential that asks to be remembered.
    #[must_use]
    pub fn with_remember_me(mut self, remember_me: bool) -> Self {
        self.remember_me = remember_me;
        self
    }

    /// Identifier presented with the credential (the username for a
    /// name + secret pair).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> &CredentialKind {
        &self.kind
    }

    #[must_use]
    pub fn secret(&self) -> Option<&SecretString> {
        self.secret.as_ref()
    }

    #[must_use]
    pub fn remember_me(&self) -> bool {
        self.remember_me
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}
