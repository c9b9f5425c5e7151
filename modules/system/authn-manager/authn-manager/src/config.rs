//! Configuration for the `AuthN` manager.

use std::path::Path;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

/// Environment variable prefix; nested keys are separated by `__`
/// (e.g. `SSO_AUTHN__POLICY__ALL__ENABLED=true`).
pub const ENV_PREFIX: &str = "SSO_AUTHN__";

/// Configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthnManagerConfig {
    /// Success policy selection.
    pub policy: AuthenticationPolicyConfig,

    /// Principal election behavior.
    pub election: ElectionConfig,

    /// Credential caching for downstream clear-pass consumers.
    pub clearpass: ClearpassConfig,

    /// Patterns for the default adaptive policy.
    pub adaptive: AdaptiveConfig,
}

impl AuthnManagerConfig {
    /// Layer defaults, an optional YAML file and `SSO_AUTHN__*` environment
    /// variables, in that order of precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or a value has the
    /// wrong shape.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("failed to load authn manager configuration")
    }
}

/// Policy switches. The first enabled entry wins, in the order
/// required-handler, all, not-prevented; otherwise any.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthenticationPolicyConfig {
    pub req: RequiredHandlerPolicyConfig,
    pub all: AllPolicyConfig,
    pub not_prevented: NotPreventedPolicyConfig,
    pub any: AnyPolicyConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequiredHandlerPolicyConfig {
    pub enabled: bool,
    /// Name of the handler that must succeed.
    pub handler_name: String,
    pub try_all: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AllPolicyConfig {
    pub enabled: bool,
    pub try_all: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotPreventedPolicyConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnyPolicyConfig {
    pub try_all: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ElectionConfig {
    /// Elect the first principal even when successful handlers disagree.
    pub ignore_principal_mismatch: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClearpassConfig {
    /// Register the populator that caches the raw credential secret.
    pub cache_credential: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdaptiveConfig {
    /// Regex; client addresses matching it are rejected.
    pub reject_ip_addresses: Option<String>,
    /// Regex; user agents matching it are rejected.
    pub reject_browsers: Option<String>,
}

impl AdaptiveConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.reject_ip_addresses.is_some() || self.reject_browsers.is_some()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_select_nothing_special() {
        let cfg = AuthnManagerConfig::default();

        assert!(!cfg.policy.req.enabled);
        assert!(!cfg.policy.all.enabled);
        assert!(!cfg.policy.not_prevented.enabled);
        assert!(!cfg.policy.any.try_all);
        assert!(!cfg.election.ignore_principal_mismatch);
        assert!(!cfg.clearpass.cache_credential);
        assert!(!cfg.adaptive.is_configured());
    }

    #[test]
    fn deserializes_partial_json() {
        let cfg: AuthnManagerConfig = serde_json::from_value(serde_json::json!({
            "policy": { "req": { "enabled": true, "handler_name": "ldap" } }
        }))
        .unwrap();

        assert!(cfg.policy.req.enabled);
        assert_eq!(cfg.policy.req.handler_name, "ldap");
        assert!(!cfg.policy.req.try_all);
    }

    #[test]
    fn rejects_unknown_fields() {
        let res: Result<AuthnManagerConfig, _> = serde_json::from_value(serde_json::json!({
            "policy": { "every": { "enabled": true } }
        }));
        assert!(res.is_err());
    }

    #[test]
    fn load_merges_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "policy:\n  all:\n    enabled: true\n    try_all: true\nclearpass:\n  cache_credential: true"
        )
        .unwrap();

        let cfg = AuthnManagerConfig::load(Some(file.path())).unwrap();

        assert!(cfg.policy.all.enabled);
        assert!(cfg.policy.all.try_all);
        assert!(cfg.clearpass.cache_credential);
    }

    #[test]
    fn env_overrides_defaults() {
        temp_env::with_var("SSO_AUTHN__POLICY__NOT_PREVENTED__ENABLED", Some("true"), || {
            let cfg = AuthnManagerConfig::load(None).unwrap();
            assert!(cfg.policy.not_prevented.enabled);
        });
    }
}
