//! Configuration for the static `AuthN` plugin.

use std::collections::BTreeMap;

use serde::Deserialize;
use sso_security::Attributes;

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticAuthnPluginConfig {
    /// Name the accept-users handler registers under.
    pub handler_name: String,

    /// Comma-delimited `user::password` pairs.
    pub users: String,

    /// Applied to the presented username before lookup.
    pub principal_transformation: PrincipalTransformationConfig,

    /// Static attribute repository for the principal resolver.
    pub person_directory: PersonDirectoryConfig,

    /// Relying service id to the handler names it accepts.
    pub services: BTreeMap<String, Vec<String>>,
}

impl Default for StaticAuthnPluginConfig {
    fn default() -> Self {
        Self {
            handler_name: "accept_users".to_owned(),
            users: "casuser::Mellon".to_owned(),
            principal_transformation: PrincipalTransformationConfig::default(),
            person_directory: PersonDirectoryConfig::default(),
            services: BTreeMap::new(),
        }
    }
}

/// Case conversion applied to a username.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseConversion {
    #[default]
    None,
    Upper,
    Lower,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrincipalTransformationConfig {
    pub case: CaseConversion,
    pub prefix: String,
    pub suffix: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PersonDirectoryConfig {
    /// Attribute whose first value becomes the resolved principal id.
    pub principal_attribute: Option<String>,

    /// Resolve to nothing when the repository has no attributes for the
    /// principal.
    pub return_null: bool,

    /// Attributes keyed by principal id.
    pub attributes: BTreeMap<String, Attributes>,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use sso_security::AttributeValue;

    use super::*;

    #[test]
    fn default_accepts_the_demo_user() {
        let cfg = StaticAuthnPluginConfig::default();
        assert_eq!(cfg.handler_name, "accept_users");
        assert_eq!(cfg.users, "casuser::Mellon");
        assert_eq!(cfg.principal_transformation.case, CaseConversion::None);
        assert!(cfg.services.is_empty());
    }

    #[test]
    fn deserializes_directory_and_services() {
        let cfg: StaticAuthnPluginConfig = serde_json::from_value(serde_json::json!({
            "principal_transformation": { "case": "upper", "suffix": "@EXAMPLE" },
            "person_directory": {
                "principal_attribute": "uid",
                "attributes": {
                    "casuser": { "uid": "cas-1", "memberOf": ["staff", "faculty"] }
                }
            },
            "services": { "https://app.example.org": ["accept_users"] }
        }))
        .unwrap();

        assert_eq!(cfg.principal_transformation.case, CaseConversion::Upper);
        assert_eq!(cfg.principal_transformation.suffix, "@EXAMPLE");
        assert_eq!(cfg.person_directory.principal_attribute.as_deref(), Some("uid"));
        assert_eq!(
            cfg.person_directory.attributes["casuser"]["memberOf"],
            AttributeValue::Multi(vec!["staff".to_owned(), "faculty".to_owned()])
        );
        assert_eq!(cfg.services["https://app.example.org"], ["accept_users"]);
    }

    #[test]
    fn rejects_unknown_fields() {
        let res: Result<StaticAuthnPluginConfig, _> =
            serde_json::from_value(serde_json::json!({ "mode": "accept_all" }));
        assert!(res.is_err());
    }
}
