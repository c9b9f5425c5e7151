//! Default adaptive (risk-based) authentication policy.

use authn_manager_sdk::{AdaptiveAuthenticationPolicy, AdaptiveDecision, ClientInfo};
use regex::Regex;
use tracing::warn;

use crate::config::AdaptiveConfig;

use super::error::DomainError;

/// Rejects requests whose client address or user agent matches a
/// configured pattern. Missing request details never match.
#[derive(Debug, Clone, Default)]
pub struct DefaultAdaptiveAuthenticationPolicy {
    reject_ip_addresses: Option<Regex>,
    reject_browsers: Option<Regex>,
}

impl DefaultAdaptiveAuthenticationPolicy {
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if a pattern does not compile.
    pub fn from_config(cfg: &AdaptiveConfig) -> Result<Self, DomainError> {
        Ok(Self {
            reject_ip_addresses: cfg.reject_ip_addresses.as_deref().map(Regex::new).transpose()?,
            reject_browsers: cfg.reject_browsers.as_deref().map(Regex::new).transpose()?,
        })
    }
}

fn rejected_value(pattern: Option<&Regex>, value: Option<&str>) -> Option<String> {
    match (pattern, value) {
        (Some(re), Some(v)) if re.is_match(v) => Some(v.to_owned()),
        _ => None,
    }
}

impl AdaptiveAuthenticationPolicy for DefaultAdaptiveAuthenticationPolicy {
    fn evaluate(&self, client: &ClientInfo) -> AdaptiveDecision {
        if let Some(ip) = rejected_value(self.reject_ip_addresses.as_ref(), client.ip_address.as_deref()) {
            warn!(ip_address = %ip, "client address rejected by adaptive policy");
            return AdaptiveDecision::Deny {
                reason: format!("client address {ip} is not allowed"),
            };
        }
        if let Some(agent) = rejected_value(self.reject_browsers.as_ref(), client.user_agent.as_deref()) {
            warn!(user_agent = %agent, "user agent rejected by adaptive policy");
            return AdaptiveDecision::Deny {
                reason: format!("user agent {agent} is not allowed"),
            };
        }
        AdaptiveDecision::Allow
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn client(ip: Option<&str>, agent: Option<&str>) -> ClientInfo {
        ClientInfo {
            ip_address: ip.map(str::to_owned),
            user_agent: agent.map(str::to_owned),
        }
    }

    fn policy() -> DefaultAdaptiveAuthenticationPolicy {
        DefaultAdaptiveAuthenticationPolicy::from_config(&AdaptiveConfig {
            reject_ip_addresses: Some(r"^192\.168\.".to_owned()),
            reject_browsers: Some("(?i)msie".to_owned()),
        })
        .unwrap()
    }

    #[test]
    fn rejects_matching_address() {
        let decision = policy().evaluate(&client(Some("192.168.1.7"), Some("Firefox")));
        assert!(matches!(decision, AdaptiveDecision::Deny { reason } if reason.contains("192.168.1.7")));
    }

    #[test]
    fn rejects_matching_browser() {
        let decision = policy().evaluate(&client(Some("10.0.0.1"), Some("Mozilla/4.0 (MSIE 6.0)")));
        assert!(matches!(decision, AdaptiveDecision::Deny { .. }));
    }

    #[test]
    fn allows_everything_else() {
        assert_eq!(
            policy().evaluate(&client(Some("10.0.0.1"), Some("Firefox"))),
            AdaptiveDecision::Allow
        );
        assert_eq!(policy().evaluate(&client(None, None)), AdaptiveDecision::Allow);
        assert_eq!(
            DefaultAdaptiveAuthenticationPolicy::default().evaluate(&client(Some("192.168.1.7"), None)),
            AdaptiveDecision::Allow
        );
    }

    #[test]
    fn invalid_pattern_is_a_configuration_error() {
        let res = DefaultAdaptiveAuthenticationPolicy::from_config(&AdaptiveConfig {
            reject_ip_addresses: Some("(".to_owned()),
            reject_browsers: None,
        });
        assert!(matches!(res, Err(DomainError::InvalidConfiguration(_))));
    }
}
