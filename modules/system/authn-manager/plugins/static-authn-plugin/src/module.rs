//! Static `AuthN` plugin module.

use std::sync::{Arc, OnceLock};

use authn_manager_sdk::{AuthenticationHandler, PrincipalResolver, ServiceLookup};
use tracing::{info, warn};

use crate::config::StaticAuthnPluginConfig;
use crate::domain::handler::parse_users;
use crate::domain::{
    AcceptUsersAuthenticationHandler, PrincipalNameTransformer, StaticPersonDirectoryResolver,
    StaticServiceRegistry,
};

/// Collaborators built from one plugin configuration.
#[derive(Debug)]
pub struct StaticAuthnComponents {
    pub handler: Arc<AcceptUsersAuthenticationHandler>,
    pub resolver: Arc<StaticPersonDirectoryResolver>,
    pub services: Arc<StaticServiceRegistry>,
}

impl StaticAuthnComponents {
    #[must_use]
    pub fn handler(&self) -> Arc<dyn AuthenticationHandler> {
        self.handler.clone()
    }

    #[must_use]
    pub fn resolver(&self) -> Arc<dyn PrincipalResolver> {
        self.resolver.clone()
    }

    #[must_use]
    pub fn service_lookup(&self) -> Arc<dyn ServiceLookup> {
        self.services.clone()
    }
}

/// Static `AuthN` plugin module.
///
/// Builds the accept-users handler, the person-directory resolver and the
/// service registry once; register them with the manager's registry.
#[derive(Debug, Default)]
pub struct StaticAuthnPlugin {
    components: OnceLock<Arc<StaticAuthnComponents>>,
}

impl StaticAuthnPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// - the user list is malformed
    /// - the plugin was already initialized
    pub fn init(&self, cfg: &StaticAuthnPluginConfig) -> anyhow::Result<Arc<StaticAuthnComponents>> {
        info!("Initializing static_authn_plugin");

        let users = parse_users(&cfg.users)?;
        if users.is_empty() {
            warn!(handler = %cfg.handler_name, "static user list is empty; every attempt will fail");
        } else {
            warn!(
                handler = %cfg.handler_name,
                "Static AuthN plugin accepts a hardcoded user list. Do NOT use it in production."
            );
        }

        info!(
            handler = %cfg.handler_name,
            user_count = users.len(),
            directory_entries = cfg.person_directory.attributes.len(),
            service_count = cfg.services.len(),
            "Loaded plugin configuration"
        );

        let components = Arc::new(StaticAuthnComponents {
            handler: Arc::new(AcceptUsersAuthenticationHandler::new(
                cfg.handler_name.clone(),
                users,
                PrincipalNameTransformer::from_config(&cfg.principal_transformation),
            )),
            resolver: Arc::new(StaticPersonDirectoryResolver::from_config(&cfg.person_directory)),
            services: Arc::new(StaticServiceRegistry::from_config(&cfg.services)),
        });
        self.components
            .set(components.clone())
            .map_err(|_| anyhow::anyhow!("Static authn plugin already initialized"))?;

        info!("Static authn plugin initialized");
        Ok(components)
    }
}
