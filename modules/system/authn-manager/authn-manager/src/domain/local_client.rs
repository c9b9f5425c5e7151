//! Local (in-process) client for the `AuthN` manager.

use std::sync::Arc;

use async_trait::async_trait;
use authn_manager_sdk::{AuthenticationError, AuthenticationManagerClient, AuthenticationTransaction};
use sso_security::Authentication;

use super::{DomainError, Service};

/// Local client wrapping the service.
#[derive(Debug)]
pub struct AuthnManagerLocalClient {
    svc: Arc<Service>,
}

impl AuthnManagerLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> AuthenticationError {
    match &e {
        DomainError::PolicyNotSatisfied { .. }
        | DomainError::UnsupportedCredentialKind { .. }
        | DomainError::AdaptivePolicyDenied(_)
        | DomainError::NoCredentials => {
            tracing::info!(operation = op, error = %e, "authentication rejected");
        }
        DomainError::PrincipalMismatch { .. }
        | DomainError::InvalidConfiguration(_)
        | DomainError::Internal(_) => {
            tracing::error!(operation = op, error = ?e, "authn_manager call failed");
        }
    }
    e.into()
}

#[async_trait]
impl AuthenticationManagerClient for AuthnManagerLocalClient {
    async fn authenticate(
        &self,
        transaction: AuthenticationTransaction,
    ) -> Result<Arc<Authentication>, AuthenticationError> {
        self.svc
            .authenticate(transaction)
            .await
            .map_err(|e| log_and_convert("authenticate", e))
    }
}
