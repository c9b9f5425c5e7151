//! Collaborator traits implemented outside the core.
//!
//! Handlers, principal resolvers, service lookups, metadata populators and
//! the adaptive policy are registered explicitly when the module is built;
//! the manager invokes them in registration order.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use sso_security::{AuthenticationBuilder, Credential, Principal};

use crate::error::HandlerFailure;
use crate::models::{AdaptiveDecision, ClientInfo, HandlerSuccess};

/// Verifies one kind of credential.
///
/// Retries and timeouts are the handler's own concern; the manager awaits
/// each attempt once.
#[async_trait]
pub trait AuthenticationHandler: Send + Sync {
    /// Unique handler name, used in failure maps, service allow-lists and
    /// the required-handler policy.
    fn name(&self) -> &str;

    /// Whether this handler can process the credential's kind.
    fn supports(&self, credential: &Credential) -> bool;

    /// Attempt to authenticate the credential.
    ///
    /// # Errors
    ///
    /// Returns a [`HandlerFailure`] describing why the attempt failed.
    async fn authenticate(&self, credential: &Credential) -> Result<HandlerSuccess, HandlerFailure>;
}

/// Turns a handler's principal into the principal recorded for the attempt
/// (e.g. by looking up directory attributes).
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    fn supports(&self, _credential: &Credential) -> bool {
        true
    }

    /// Resolve the principal. `Ok(None)` keeps the handler's principal.
    ///
    /// # Errors
    ///
    /// Returns a [`HandlerFailure`] if the lookup could not be performed.
    async fn resolve(
        &self,
        credential: &Credential,
        handler_principal: &Principal,
    ) -> Result<Option<Principal>, HandlerFailure>;
}

/// Service registry lookup used for service-aware handler filtering.
#[async_trait]
pub trait ServiceLookup: Send + Sync {
    /// Handler names the service accepts. `None` or an empty set means the
    /// service does not restrict handlers.
    async fn find_allowed_handler_names(&self, service_id: &str) -> Option<HashSet<String>>;
}

/// Decorates a successful authentication with derived attributes.
pub trait MetadataPopulator: Send + Sync {
    fn name(&self) -> &str;

    fn supports(&self, credential: &Credential) -> bool;

    /// Add or overwrite attributes. Populators never remove attributes.
    fn populate(&self, builder: &mut AuthenticationBuilder, credential: &Credential);
}

/// Risk policy consulted before a transaction starts.
pub trait AdaptiveAuthenticationPolicy: Send + Sync {
    fn evaluate(&self, client: &ClientInfo) -> AdaptiveDecision;
}

/// A handler paired with its optional principal resolver.
#[derive(Clone)]
pub struct HandlerRegistration {
    pub handler: Arc<dyn AuthenticationHandler>,
    pub resolver: Option<Arc<dyn PrincipalResolver>>,
}

impl HandlerRegistration {
    #[must_use]
    pub fn new(handler: Arc<dyn AuthenticationHandler>) -> Self {
        Self {
            handler,
            resolver: None,
        }
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn PrincipalResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.handler.name()
    }
}

impl std::fmt::Debug for HandlerRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistration")
            .field("handler", &self.handler.name())
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}
