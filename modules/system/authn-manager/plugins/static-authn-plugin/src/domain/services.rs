//! Static relying-service registry.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use authn_manager_sdk::ServiceLookup;

/// Service id to the handler names it accepts.
#[derive(Debug, Clone, Default)]
pub struct StaticServiceRegistry {
    services: BTreeMap<String, HashSet<String>>,
}

impl StaticServiceRegistry {
    #[must_use]
    pub fn from_config(services: &BTreeMap<String, Vec<String>>) -> Self {
        Self {
            services: services
                .iter()
                .map(|(id, handlers)| (id.clone(), handlers.iter().cloned().collect()))
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[async_trait]
impl ServiceLookup for StaticServiceRegistry {
    async fn find_allowed_handler_names(&self, service_id: &str) -> Option<HashSet<String>> {
        self.services.get(service_id).cloned()
    }
}
