//! `AuthN` manager module.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use authn_manager_sdk::{
    AdaptiveAuthenticationPolicy, AuthenticationHandler, AuthenticationManagerClient,
    HandlerRegistration, MetadataPopulator, PrincipalResolver, ServiceLookup,
};
use tracing::info;

use crate::config::AuthnManagerConfig;
use crate::domain::{
    AuthenticationPolicy, AuthnManagerLocalClient, DefaultAdaptiveAuthenticationPolicy,
    DefaultPrincipalElectionStrategy, HandlerResolver, MetadataPopulatorChain, Service,
};

/// Collaborators wired into the manager at process start.
///
/// Handlers are attempted in the order they are registered. Populators
/// registered here run after the default ones.
#[derive(Default)]
pub struct AuthnRegistry {
    registrations: Vec<HandlerRegistration>,
    service_lookup: Option<Arc<dyn ServiceLookup>>,
    populators: Vec<Arc<dyn MetadataPopulator>>,
    adaptive_policy: Option<Arc<dyn AdaptiveAuthenticationPolicy>>,
}

impl AuthnRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn register(mut self, handler: Arc<dyn AuthenticationHandler>) -> Self {
        self.registrations.push(HandlerRegistration::new(handler));
        self
    }

    #[must_use]
    pub fn register_with_resolver(
        mut self,
        handler: Arc<dyn AuthenticationHandler>,
        resolver: Arc<dyn PrincipalResolver>,
    ) -> Self {
        self.registrations
            .push(HandlerRegistration::new(handler).with_resolver(resolver));
        self
    }

    #[must_use]
    pub fn service_lookup(mut self, lookup: Arc<dyn ServiceLookup>) -> Self {
        self.service_lookup = Some(lookup);
        self
    }

    #[must_use]
    pub fn populator(mut self, populator: Arc<dyn MetadataPopulator>) -> Self {
        self.populators.push(populator);
        self
    }

    /// Replace the configuration-driven adaptive policy.
    #[must_use]
    pub fn adaptive_policy(mut self, policy: Arc<dyn AdaptiveAuthenticationPolicy>) -> Self {
        self.adaptive_policy = Some(policy);
        self
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.registrations.is_empty() {
            anyhow::bail!("no authentication handlers registered");
        }
        let mut seen = HashSet::new();
        for registration in &self.registrations {
            if !seen.insert(registration.name()) {
                anyhow::bail!(
                    "authentication handler '{}' registered more than once",
                    registration.name()
                );
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for AuthnRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthnRegistry")
            .field("registrations", &self.registrations)
            .field("service_lookup", &self.service_lookup.is_some())
            .field("populators", &self.populators.len())
            .field("adaptive_policy", &self.adaptive_policy.is_some())
            .finish()
    }
}

/// `AuthN` manager module.
///
/// Builds the service once from configuration and the registry and hands
/// out the in-process client.
#[derive(Debug, Default)]
pub struct AuthnManagerModule {
    service: OnceLock<Arc<Service>>,
}

impl AuthnManagerModule {
    pub const MODULE_NAME: &'static str = "authn-manager";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the service and return its client.
    ///
    /// # Errors
    ///
    /// - no handlers registered, or a handler name registered twice
    /// - the required-handler policy names no handler, or a handler that is
    ///   not registered
    /// - an adaptive pattern does not compile
    /// - the module was already initialized
    #[tracing::instrument(skip_all, fields(policy))]
    pub fn init(
        &self,
        cfg: &AuthnManagerConfig,
        registry: AuthnRegistry,
    ) -> anyhow::Result<Arc<dyn AuthenticationManagerClient>> {
        registry.validate()?;

        let policy = AuthenticationPolicy::from_config(&cfg.policy)?;
        tracing::Span::current().record("policy", policy.name());
        if let AuthenticationPolicy::RequiredHandler { handler_name, .. } = &policy
            && !registry
                .registrations
                .iter()
                .any(|r| r.name() == handler_name)
        {
            anyhow::bail!("required authentication handler '{handler_name}' is not registered");
        }
        info!(
            handlers = registry.registrations.len(),
            "Initializing {} module",
            Self::MODULE_NAME
        );

        let handler_resolver = match registry.service_lookup {
            Some(lookup) => HandlerResolver::with_service_lookup(lookup),
            None => HandlerResolver::new(),
        };

        let populators = registry
            .populators
            .into_iter()
            .fold(MetadataPopulatorChain::from_config(&cfg.clearpass), MetadataPopulatorChain::with);

        let adaptive_policy: Option<Arc<dyn AdaptiveAuthenticationPolicy>> =
            match registry.adaptive_policy {
                Some(policy) => Some(policy),
                None if cfg.adaptive.is_configured() => Some(Arc::new(
                    DefaultAdaptiveAuthenticationPolicy::from_config(&cfg.adaptive)?,
                )),
                None => None,
            };

        let mut service = Service::new(registry.registrations, policy)
            .with_handler_resolver(handler_resolver)
            .with_election(DefaultPrincipalElectionStrategy::new(
                cfg.election.ignore_principal_mismatch,
            ))
            .with_populators(populators);
        if let Some(adaptive_policy) = adaptive_policy {
            service = service.with_adaptive_policy(adaptive_policy);
        }

        let svc = Arc::new(service);
        self.service
            .set(svc.clone())
            .map_err(|_| anyhow::anyhow!("{} module already initialized", Self::MODULE_NAME))?;

        let api: Arc<dyn AuthenticationManagerClient> = Arc::new(AuthnManagerLocalClient::new(svc));

        info!("{} module initialized successfully", Self::MODULE_NAME);

        Ok(api)
    }
}
