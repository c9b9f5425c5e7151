//! Domain models for the `AuthN` manager module.

use serde::{Deserialize, Serialize};
use sso_security::{Attributes, Credential, Principal};

/// One authentication attempt spanning one or more credentials.
#[derive(Debug, Clone)]
pub struct AuthenticationTransaction {
    /// Credentials in submission order.
    pub credentials: Vec<Credential>,
    /// Relying service on whose behalf authentication is performed.
    pub service_id: Option<String>,
    /// Client request details for the adaptive policy.
    pub client_info: Option<ClientInfo>,
}

impl AuthenticationTransaction {
    #[must_use]
    pub fn of(credentials: Vec<Credential>) -> Self {
        Self {
            credentials,
            service_id: None,
            client_info: None,
        }
    }

    #[must_use]
    pub fn with_service(mut self, service_id: impl Into<String>) -> Self {
        self.service_id = Some(service_id.into());
        self
    }

    #[must_use]
    pub fn with_client_info(mut self, client_info: ClientInfo) -> Self {
        self.client_info = Some(client_info);
        self
    }
}

/// Request-level details the adaptive policy evaluates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Verdict of the adaptive policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdaptiveDecision {
    Allow,
    Deny { reason: String },
}

/// What a handler yields on success: the principal it established plus any
/// handler-level attributes (e.g. warnings).
#[derive(Debug, Clone)]
pub struct HandlerSuccess {
    pub principal: Principal,
    pub attributes: Attributes,
}

impl HandlerSuccess {
    #[must_use]
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            attributes: Attributes::new(),
        }
    }
}
