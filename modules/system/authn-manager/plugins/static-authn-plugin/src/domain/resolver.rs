//! Person-directory principal resolver backed by a static repository.

use std::collections::BTreeMap;

use async_trait::async_trait;
use authn_manager_sdk::{HandlerFailure, PrincipalResolver};
use sso_security::{Attributes, Credential, Principal};
use tracing::warn;

use crate::config::PersonDirectoryConfig;

/// Attaches repository attributes to the handler's principal and optionally
/// re-keys it by a configured attribute.
#[derive(Debug, Clone, Default)]
pub struct StaticPersonDirectoryResolver {
    repository: BTreeMap<String, Attributes>,
    principal_attribute: Option<String>,
    return_null: bool,
}

impl StaticPersonDirectoryResolver {
    #[must_use]
    pub fn from_config(cfg: &PersonDirectoryConfig) -> Self {
        Self {
            repository: cfg.attributes.clone(),
            principal_attribute: cfg.principal_attribute.clone(),
            return_null: cfg.return_null,
        }
    }

    fn principal_id<'a>(&self, default_id: &'a str, attributes: &'a Attributes) -> &'a str {
        let Some(name) = &self.principal_attribute else {
            return default_id;
        };
        if let Some(id) = attributes.get(name).and_then(|v| v.first()) {
            id
        } else {
            warn!(
                principal = default_id,
                attribute = %name,
                "principal attribute missing; keeping principal id"
            );
            default_id
        }
    }
}

#[async_trait]
impl PrincipalResolver for StaticPersonDirectoryResolver {
    async fn resolve(
        &self,
        _credential: &Credential,
        handler_principal: &Principal,
    ) -> Result<Option<Principal>, HandlerFailure> {
        let found = self.repository.get(handler_principal.id());
        if found.is_none_or(Attributes::is_empty) && self.return_null {
            return Ok(None);
        }

        let mut attributes = handler_principal.attributes().clone();
        if let Some(found) = found {
            attributes.extend(found.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        let id = self.principal_id(handler_principal.id(), &attributes).to_owned();

        Ok(Some(Principal::with_attributes(id, attributes)))
    }
}
