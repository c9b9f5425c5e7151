//! Renders the current request's identity for audit records.

use std::sync::Arc;

use crate::authentication::Authentication;
use crate::constants::UNKNOWN_USER;
use crate::context::{AuthenticationContext, BoundIdentity};

/// Extracts the identifier recorded for a completed authentication.
pub trait PrincipalIdProvider: Send + Sync {
    fn principal_id_from(&self, authentication: &Authentication) -> String {
        authentication.principal().id().to_owned()
    }
}

/// Uses the elected principal's identifier as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPrincipalIdProvider;

impl PrincipalIdProvider for DefaultPrincipalIdProvider {}

/// Resolves the acting principal from the [`AuthenticationContext`].
///
/// - nothing bound: [`UNKNOWN_USER`]
/// - credentials bound: their identifiers joined with `", "` in binding order
/// - an authentication bound: the identifier chosen by the
///   [`PrincipalIdProvider`]
///
/// Resolution only reads the context, so resolving an unchanged context
/// twice yields the same string.
#[derive(Clone)]
pub struct AuditPrincipalResolver {
    provider: Arc<dyn PrincipalIdProvider>,
}

impl Default for AuditPrincipalResolver {
    fn default() -> Self {
        Self::new(Arc::new(DefaultPrincipalIdProvider))
    }
}

impl AuditPrincipalResolver {
    #[must_use]
    pub fn new(provider: Arc<dyn PrincipalIdProvider>) -> Self {
        Self { provider }
    }

    /// Resolve the identity bound to the current request.
    #[must_use]
    pub fn resolve(&self) -> String {
        AuthenticationContext::with_current(|bound| self.render(bound))
    }

    #[must_use]
    pub fn render(&self, bound: &BoundIdentity) -> String {
        match bound {
            BoundIdentity::Nothing => UNKNOWN_USER.to_owned(),
            BoundIdentity::Credentials(credentials) if credentials.is_empty() => {
                UNKNOWN_USER.to_owned()
            }
            BoundIdentity::Credentials(credentials) => credentials
                .iter()
                .map(crate::credential::Credential::id)
                .collect::<Vec<_>>()
                .join(", "),
            BoundIdentity::Authentication(authentication) => {
                self.provider.principal_id_from(authentication)
            }
        }
    }
}

/// Resolve the current request's identity with the default provider.
#[must_use]
pub fn resolve_audit_principal() -> String {
    AuditPrincipalResolver::default().resolve()
}

impl std::fmt::Debug for AuditPrincipalResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditPrincipalResolver").finish_non_exhaustive()
    }
}
