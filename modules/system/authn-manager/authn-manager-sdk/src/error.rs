//! Error types for the `AuthN` manager module.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sso_security::CredentialKind;
use thiserror::Error;

/// Classification of a handler failure.
///
/// The core never interprets these beyond [`FailureKind::is_blocking`]; they
/// are surfaced to callers so they can tell "wrong password" from
/// "directory unreachable".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The credential was checked and rejected.
    InvalidCredential,
    /// The handler does not know the presented identifier.
    AccountNotFound,
    /// The account exists but is disabled.
    AccountDisabled,
    /// The account exists but is locked.
    AccountLocked,
    /// The credential is correct but has expired.
    PasswordExpired,
    /// The handler could not carry out the attempt at all
    /// (backend unreachable, misconfiguration).
    Prevented,
    /// Anything else.
    Other,
}

impl FailureKind {
    /// Whether this failure blocks the whole transaction under the
    /// not-prevented policy.
    ///
    /// Blocking: `Prevented`, `AccountDisabled`, `AccountLocked`.
    #[must_use]
    pub fn is_blocking(self) -> bool {
        matches!(
            self,
            Self::Prevented | Self::AccountDisabled | Self::AccountLocked
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidCredential => "invalid_credential",
            Self::AccountNotFound => "account_not_found",
            Self::AccountDisabled => "account_disabled",
            Self::AccountLocked => "account_locked",
            Self::PasswordExpired => "password_expired",
            Self::Prevented => "prevented",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

/// Cause of one failed handler attempt.
///
/// Captured into the transaction's outcome set, never thrown out of the
/// attempt loop.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct HandlerFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl HandlerFailure {
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_credential(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidCredential, message)
    }

    #[must_use]
    pub fn account_not_found(message: impl Into<String>) -> Self {
        Self::new(FailureKind::AccountNotFound, message)
    }

    #[must_use]
    pub fn prevented(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Prevented, message)
    }

    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.kind.is_blocking()
    }
}

/// Per-handler failure map, keyed by handler name. A handler tried against
/// several credentials keeps every cause, in invocation order.
pub type HandlerFailures = BTreeMap<String, Vec<HandlerFailure>>;

/// Errors that can occur when using the `AuthN` manager API.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// The transaction carried no credentials.
    #[error("no credentials provided")]
    NoCredentials,

    /// No registered (and service-allowed) handler supports the credential.
    #[error("no authentication handler supports credential '{credential_id}' of kind '{kind}'")]
    UnsupportedCredentialKind {
        credential_id: String,
        kind: CredentialKind,
    },

    /// The policy never reached a satisfied verdict. Carries every captured
    /// handler failure.
    #[error("authentication policy not satisfied ({} handler failure(s))", failures.len())]
    PolicyNotSatisfied {
        failures: HandlerFailures,
        successes: Vec<String>,
    },

    /// Successful handlers resolved different principal identifiers.
    #[error(
        "principal mismatch: elected '{expected}', handler '{handler}' resolved '{actual}'"
    )]
    PrincipalMismatch {
        expected: String,
        actual: String,
        handler: String,
    },

    /// The adaptive policy rejected the request before any handler ran.
    #[error("authentication denied by adaptive policy: {reason}")]
    AdaptivePolicyDenied { reason: String },

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthenticationError {
    /// The per-handler failure map, if this error carries one.
    #[must_use]
    pub fn handler_failures(&self) -> Option<&HandlerFailures> {
        match self {
            Self::PolicyNotSatisfied { failures, .. } => Some(failures),
            _ => None,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn blocking_boundary() {
        assert!(FailureKind::Prevented.is_blocking());
        assert!(FailureKind::AccountDisabled.is_blocking());
        assert!(FailureKind::AccountLocked.is_blocking());

        assert!(!FailureKind::InvalidCredential.is_blocking());
        assert!(!FailureKind::AccountNotFound.is_blocking());
        assert!(!FailureKind::PasswordExpired.is_blocking());
        assert!(!FailureKind::Other.is_blocking());
    }

    #[test]
    fn policy_error_exposes_failure_map() {
        let mut failures = HandlerFailures::new();
        failures.insert(
            "ldap".to_owned(),
            vec![HandlerFailure::prevented("directory unreachable")],
        );
        let err = AuthenticationError::PolicyNotSatisfied {
            failures,
            successes: Vec::new(),
        };

        let map = err.handler_failures().unwrap();
        assert_eq!(map["ldap"][0].kind, FailureKind::Prevented);
        assert_eq!(
            err.to_string(),
            "authentication policy not satisfied (1 handler failure(s))"
        );
    }

    #[test]
    fn failure_serializes_kind_as_snake_case() {
        let json = serde_json::to_value(HandlerFailure::invalid_credential("bad password")).unwrap();
        assert_eq!(json["kind"], "invalid_credential");
        assert_eq!(json["message"], "bad password");
    }
}
