//! Domain errors for the `AuthN` manager.

use authn_manager_sdk::{AuthenticationError, HandlerFailures};
use sso_security::{AuthenticationBuildError, CredentialKind};

/// Internal domain errors.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("no credentials provided")]
    NoCredentials,

    #[error("no authentication handler supports credential '{credential_id}' of kind '{kind}'")]
    UnsupportedCredentialKind {
        credential_id: String,
        kind: CredentialKind,
    },

    #[error("authentication policy not satisfied ({} handler failure(s))", failures.len())]
    PolicyNotSatisfied {
        failures: HandlerFailures,
        successes: Vec<String>,
    },

    #[error("principal mismatch: elected '{expected}', handler '{handler}' resolved '{actual}'")]
    PrincipalMismatch {
        expected: String,
        actual: String,
        handler: String,
    },

    #[error("adaptive policy denied the request: {0}")]
    AdaptivePolicyDenied(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<AuthenticationBuildError> for DomainError {
    fn from(e: AuthenticationBuildError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<regex::Error> for DomainError {
    fn from(e: regex::Error) -> Self {
        Self::InvalidConfiguration(e.to_string())
    }
}

impl From<DomainError> for AuthenticationError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NoCredentials => Self::NoCredentials,
            DomainError::UnsupportedCredentialKind {
                credential_id,
                kind,
            } => Self::UnsupportedCredentialKind {
                credential_id,
                kind,
            },
            DomainError::PolicyNotSatisfied {
                failures,
                successes,
            } => Self::PolicyNotSatisfied {
                failures,
                successes,
            },
            DomainError::PrincipalMismatch {
                expected,
                actual,
                handler,
            } => Self::PrincipalMismatch {
                expected,
                actual,
                handler,
            },
            DomainError::AdaptivePolicyDenied(reason) => Self::AdaptivePolicyDenied { reason },
            DomainError::InvalidConfiguration(reason) => {
                Self::Internal(format!("invalid configuration: {reason}"))
            }
            DomainError::Internal(reason) => Self::Internal(reason),
        }
    }
}
