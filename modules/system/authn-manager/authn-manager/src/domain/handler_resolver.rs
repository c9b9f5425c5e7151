//! Maps a credential to the handlers that may process it.

use std::sync::Arc;

use authn_manager_sdk::{HandlerRegistration, ServiceLookup};
use sso_security::Credential;
use tracing::debug;

use super::error::DomainError;

/// Selects capable handlers in registration order, optionally narrowed to
/// the relying service's allow-list.
///
/// Order is never re-sorted: it decides short-circuiting and attribute
/// merge precedence downstream.
#[derive(Clone, Default)]
pub struct HandlerResolver {
    service_lookup: Option<Arc<dyn ServiceLookup>>,
}

impl HandlerResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_service_lookup(service_lookup: Arc<dyn ServiceLookup>) -> Self {
        Self {
            service_lookup: Some(service_lookup),
        }
    }

    /// Resolve the handlers for one credential.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedCredentialKind` if no handler remains.
    #[tracing::instrument(skip_all, fields(credential_kind = %credential.kind(), service_id))]
    pub async fn resolve<'a>(
        &self,
        registrations: &'a [HandlerRegistration],
        credential: &Credential,
        service_id: Option<&str>,
    ) -> Result<Vec<&'a HandlerRegistration>, DomainError> {
        let mut selected: Vec<&HandlerRegistration> = registrations
            .iter()
            .filter(|r| r.handler.supports(credential))
            .collect();

        if let (Some(service_id), Some(lookup)) = (service_id, &self.service_lookup) {
            tracing::Span::current().record("service_id", service_id);
            match lookup.find_allowed_handler_names(service_id).await {
                Some(allowed) if !allowed.is_empty() => {
                    selected.retain(|r| allowed.contains(r.name()));
                    debug!(allowed = allowed.len(), "narrowed handlers to service allow-list");
                }
                _ => debug!("service does not restrict handlers"),
            }
        }

        if selected.is_empty() {
            return Err(DomainError::UnsupportedCredentialKind {
                credential_id: credential.id().to_owned(),
                kind: credential.kind().clone(),
            });
        }

        debug!(
            handlers = ?selected.iter().map(|r| r.name()).collect::<Vec<_>>(),
            "resolved authentication handlers"
        );
        Ok(selected)
    }
}

impl std::fmt::Debug for HandlerResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerResolver")
            .field("service_lookup", &self.service_lookup.is_some())
            .finish()
    }
}
