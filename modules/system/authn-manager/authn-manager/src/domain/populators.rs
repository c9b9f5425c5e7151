//! Metadata populators applied to a successful authentication.

use std::sync::Arc;

use authn_manager_sdk::MetadataPopulator;
use secrecy::ExposeSecret;
use sso_security::constants::{
    AUTHENTICATION_METHOD_ATTRIBUTE, CACHED_CREDENTIAL_ATTRIBUTE, REMEMBER_ME_ATTRIBUTE,
    SUCCESSFUL_HANDLERS_ATTRIBUTE,
};
use sso_security::{AuthenticationBuilder, Credential};
use tracing::debug;

use crate::config::ClearpassConfig;

/// Records which handlers succeeded: `authenticationMethod` on every
/// handler result and `successfulAuthenticationHandlers` on the
/// authentication.
#[derive(Debug, Default)]
pub struct SuccessfulHandlerMetadataPopulator;

impl MetadataPopulator for SuccessfulHandlerMetadataPopulator {
    fn name(&self) -> &str {
        "successful_handler"
    }

    fn supports(&self, _credential: &Credential) -> bool {
        true
    }

    fn populate(&self, builder: &mut AuthenticationBuilder, _credential: &Credential) {
        let mut names = Vec::with_capacity(builder.results().len());
        for result in builder.results_mut() {
            let name = result.handler_name().to_owned();
            result.add_attribute(AUTHENTICATION_METHOD_ATTRIBUTE, name.clone());
            if !names.contains(&name) {
                names.push(name);
            }
        }
        builder.add_attribute(SUCCESSFUL_HANDLERS_ATTRIBUTE, names);
    }
}

/// Flags the authentication as long-term when the credential asked for it.
#[derive(Debug, Default)]
pub struct RememberMeMetadataPopulator;

impl MetadataPopulator for RememberMeMetadataPopulator {
    fn name(&self) -> &str {
        "remember_me"
    }

    fn supports(&self, credential: &Credential) -> bool {
        credential.remember_me()
    }

    fn populate(&self, builder: &mut AuthenticationBuilder, _credential: &Credential) {
        builder.add_attribute(REMEMBER_ME_ATTRIBUTE, true);
    }
}

/// Caches the raw credential secret for clear-pass consumers.
#[derive(Debug, Default)]
pub struct CacheCredentialsMetadataPopulator;

impl MetadataPopulator for CacheCredentialsMetadataPopulator {
    fn name(&self) -> &str {
        "cache_credentials"
    }

    fn supports(&self, credential: &Credential) -> bool {
        credential.secret().is_some()
    }

    fn populate(&self, builder: &mut AuthenticationBuilder, credential: &Credential) {
        if let Some(secret) = credential.secret() {
            builder.add_attribute(CACHED_CREDENTIAL_ATTRIBUTE, secret.expose_secret().to_owned());
        }
    }
}

/// Ordered populator list. Only populators that support a credential run
/// for it; later populators overwrite earlier ones on key conflicts.
#[derive(Clone, Default)]
pub struct MetadataPopulatorChain {
    populators: Vec<Arc<dyn MetadataPopulator>>,
}

impl MetadataPopulatorChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The default chain: successful-handler and remember-me, plus
    /// credential caching when clear-pass is enabled.
    #[must_use]
    pub fn from_config(cfg: &ClearpassConfig) -> Self {
        let chain = Self::new()
            .with(Arc::new(SuccessfulHandlerMetadataPopulator))
            .with(Arc::new(RememberMeMetadataPopulator));
        if cfg.cache_credential {
            chain.with(Arc::new(CacheCredentialsMetadataPopulator))
        } else {
            chain
        }
    }

    #[must_use]
    pub fn with(mut self, populator: Arc<dyn MetadataPopulator>) -> Self {
        self.populators.push(populator);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.populators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.populators.is_empty()
    }

    pub fn populate(&self, builder: &mut AuthenticationBuilder, credentials: &[Credential]) {
        for credential in credentials {
            for populator in &self.populators {
                if populator.supports(credential) {
                    debug!(populator = populator.name(), credential = %credential, "applying metadata populator");
                    populator.populate(builder, credential);
                }
            }
        }
    }
}

impl std::fmt::Debug for MetadataPopulatorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.populators.iter().map(|p| p.name()))
            .finish()
    }
}
