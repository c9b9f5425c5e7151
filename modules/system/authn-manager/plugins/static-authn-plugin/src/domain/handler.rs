//! Accept-users authentication handler.

use std::collections::HashMap;

use anyhow::bail;
use async_trait::async_trait;
use authn_manager_sdk::{AuthenticationHandler, HandlerFailure, HandlerSuccess};
use secrecy::{ExposeSecret, SecretString};
use sso_security::{Credential, CredentialKind, Principal};
use tracing::debug;

use super::transformer::PrincipalNameTransformer;

const USER_PASSWORD_SEPARATOR: &str = "::";

/// Verifies name + secret credentials against a static user list.
pub struct AcceptUsersAuthenticationHandler {
    name: String,
    users: HashMap<String, SecretString>,
    transformer: PrincipalNameTransformer,
}

impl AcceptUsersAuthenticationHandler {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        users: HashMap<String, SecretString>,
        transformer: PrincipalNameTransformer,
    ) -> Self {
        Self {
            name: name.into(),
            users,
            transformer,
        }
    }

    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

/// Parse a comma-delimited `user::password` list. A blank list yields no
/// users.
///
/// # Errors
///
/// Returns an error if an entry lacks the `::` separator or has an empty
/// user name.
pub fn parse_users(users: &str) -> anyhow::Result<HashMap<String, SecretString>> {
    let mut parsed = HashMap::new();
    for entry in users.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((user, password)) = entry.split_once(USER_PASSWORD_SEPARATOR) else {
            bail!("user entry '{entry}' is not in the form user{USER_PASSWORD_SEPARATOR}password");
        };
        if user.is_empty() {
            bail!("user entry with an empty user name");
        }
        parsed.insert(user.to_owned(), SecretString::from(password.to_owned()));
    }
    Ok(parsed)
}

#[async_trait]
impl AuthenticationHandler for AcceptUsersAuthenticationHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, credential: &Credential) -> bool {
        *credential.kind() == CredentialKind::username_password()
    }

    async fn authenticate(&self, credential: &Credential) -> Result<HandlerSuccess, HandlerFailure> {
        let Some(secret) = credential.secret() else {
            return Err(HandlerFailure::invalid_credential("no password supplied"));
        };

        let username = self.transformer.transform(credential.id());
        let Some(expected) = self.users.get(&username) else {
            debug!(username = %username, "user not in static list");
            return Err(HandlerFailure::account_not_found(format!(
                "{username} not found in backing map"
            )));
        };

        if expected.expose_secret() != secret.expose_secret() {
            return Err(HandlerFailure::invalid_credential("password does not match"));
        }

        Ok(HandlerSuccess::new(Principal::new(username)))
    }
}

impl std::fmt::Debug for AcceptUsersAuthenticationHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcceptUsersAuthenticationHandler")
            .field("name", &self.name)
            .field("users", &self.users.len())
            .field("transformer", &self.transformer)
            .finish()
    }
}
