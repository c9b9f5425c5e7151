#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end authentication through the module wiring and the static
//! plugin collaborators.

use std::sync::Arc;

use authn_manager::config::AuthnManagerConfig;
use authn_manager::module::{AuthnManagerModule, AuthnRegistry};
use authn_manager_sdk::{
    AuthenticationError, AuthenticationManagerClient, AuthenticationTransaction, ClientInfo,
    FailureKind,
};
use sso_security::constants::{
    AUTHENTICATION_METHOD_ATTRIBUTE, CACHED_CREDENTIAL_ATTRIBUTE, REMEMBER_ME_ATTRIBUTE,
    SUCCESSFUL_HANDLERS_ATTRIBUTE,
};
use sso_security::{AttributeValue, AuthenticationContext, Credential, resolve_audit_principal};
use static_authn_plugin::StaticAuthnPlugin;
use static_authn_plugin::config::StaticAuthnPluginConfig;
use static_authn_plugin::module::StaticAuthnComponents;

fn plugin(cfg: serde_json::Value) -> Arc<StaticAuthnComponents> {
    let cfg: StaticAuthnPluginConfig = serde_json::from_value(cfg).unwrap();
    StaticAuthnPlugin::new().init(&cfg).unwrap()
}

fn manager(cfg: serde_json::Value, registry: AuthnRegistry) -> Arc<dyn AuthenticationManagerClient> {
    let cfg: AuthnManagerConfig = serde_json::from_value(cfg).unwrap();
    AuthnManagerModule::new().init(&cfg, registry).unwrap()
}

fn directory_plugin() -> Arc<StaticAuthnComponents> {
    plugin(serde_json::json!({
        "users": "casuser::Mellon",
        "person_directory": {
            "attributes": { "casuser": { "mail": "casuser@example.org" } }
        },
        "services": { "https://app.example.org": ["accept_users"] }
    }))
}

fn login(user: &str, password: &str) -> AuthenticationTransaction {
    AuthenticationTransaction::of(vec![Credential::username_password(user, password)])
}

#[tokio::test]
async fn authenticates_with_directory_attributes_and_default_metadata() {
    let components = directory_plugin();
    let authn = manager(
        serde_json::json!({}),
        AuthnRegistry::new().register_with_resolver(components.handler(), components.resolver()),
    );

    AuthenticationContext::scope(async {
        let auth = authn
            .authenticate(
                AuthenticationTransaction::of(vec![
                    Credential::username_password("casuser", "Mellon").with_remember_me(true),
                ])
                .with_service("https://app.example.org"),
            )
            .await
            .unwrap();

        assert_eq!(auth.principal().id(), "casuser");
        assert_eq!(
            auth.principal().attribute("mail"),
            Some(&AttributeValue::from("casuser@example.org"))
        );
        assert_eq!(
            auth.attribute(SUCCESSFUL_HANDLERS_ATTRIBUTE),
            Some(&AttributeValue::Multi(vec!["accept_users".to_owned()]))
        );
        assert_eq!(
            auth.results()[0].attributes().get(AUTHENTICATION_METHOD_ATTRIBUTE),
            Some(&AttributeValue::from("accept_users"))
        );
        assert_eq!(auth.attribute(REMEMBER_ME_ATTRIBUTE), Some(&AttributeValue::from("true")));
        assert!(auth.attribute(CACHED_CREDENTIAL_ATTRIBUTE).is_none());
        assert_eq!(resolve_audit_principal(), "casuser");
    })
    .await;
}

#[tokio::test]
async fn wrong_password_surfaces_the_handler_failure() {
    let components = directory_plugin();
    let authn = manager(serde_json::json!({}), AuthnRegistry::new().register(components.handler()));

    AuthenticationContext::scope(async {
        let err = authn.authenticate(login("casuser", "nope")).await.unwrap_err();

        let failures = err.handler_failures().expect("failure map");
        assert_eq!(failures.len(), 1);
        assert_eq!(failures["accept_users"][0].kind, FailureKind::InvalidCredential);
        assert_eq!(resolve_audit_principal(), "casuser");
    })
    .await;
}

#[tokio::test]
async fn clearpass_caches_the_credential() {
    let components = directory_plugin();
    let authn = manager(
        serde_json::json!({ "clearpass": { "cache_credential": true } }),
        AuthnRegistry::new().register(components.handler()),
    );

    let auth = AuthenticationContext::scope(authn.authenticate(login("casuser", "Mellon")))
        .await
        .unwrap();

    assert_eq!(
        auth.attribute(CACHED_CREDENTIAL_ATTRIBUTE),
        Some(&AttributeValue::from("Mellon"))
    );
}

#[tokio::test]
async fn service_registry_restricts_handlers() {
    let components = plugin(serde_json::json!({
        "users": "casuser::Mellon",
        "services": { "https://restricted.example.org": ["ldap"] }
    }));
    let authn = manager(
        serde_json::json!({}),
        AuthnRegistry::new()
            .register(components.handler())
            .service_lookup(components.service_lookup()),
    );

    AuthenticationContext::scope(async {
        let err = authn
            .authenticate(login("casuser", "Mellon").with_service("https://restricted.example.org"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthenticationError::UnsupportedCredentialKind { .. }));

        authn
            .authenticate(login("casuser", "Mellon").with_service("https://unregistered.example.org"))
            .await
            .unwrap();
    })
    .await;
}

#[tokio::test]
async fn adaptive_policy_rejects_before_any_attempt() {
    let components = directory_plugin();
    let authn = manager(
        serde_json::json!({ "adaptive": { "reject_ip_addresses": "^10\\." } }),
        AuthnRegistry::new().register(components.handler()),
    );

    AuthenticationContext::scope(async {
        let err = authn
            .authenticate(login("casuser", "Mellon").with_client_info(ClientInfo {
                ip_address: Some("10.1.2.3".to_owned()),
                user_agent: None,
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthenticationError::AdaptivePolicyDenied { .. }));
        assert!(!AuthenticationContext::is_bound());

        authn
            .authenticate(login("casuser", "Mellon").with_client_info(ClientInfo {
                ip_address: Some("172.16.0.1".to_owned()),
                user_agent: Some("Firefox".to_owned()),
            }))
            .await
            .unwrap();
    })
    .await;
}

#[tokio::test]
async fn principal_mismatch_across_handlers() {
    let first = plugin(serde_json::json!({ "handler_name": "first", "users": "casuser::Mellon" }));
    let second = plugin(serde_json::json!({
        "handler_name": "second",
        "users": "casuser::Mellon",
        "person_directory": {
            "principal_attribute": "uid",
            "attributes": { "casuser": { "uid": "cas-1" } }
        }
    }));
    let registry = || {
        AuthnRegistry::new()
            .register(first.handler())
            .register_with_resolver(second.handler(), second.resolver())
    };

    let strict = manager(serde_json::json!({ "policy": { "all": { "enabled": true } } }), registry());
    let err = AuthenticationContext::scope(strict.authenticate(login("casuser", "Mellon")))
        .await
        .unwrap_err();
    match err {
        AuthenticationError::PrincipalMismatch {
            expected,
            actual,
            handler,
        } => {
            assert_eq!(expected, "casuser");
            assert_eq!(actual, "cas-1");
            assert_eq!(handler, "second");
        }
        other => panic!("expected PrincipalMismatch, got {other:?}"),
    }

    let lenient = manager(
        serde_json::json!({
            "policy": { "all": { "enabled": true } },
            "election": { "ignore_principal_mismatch": true }
        }),
        registry(),
    );
    let auth = AuthenticationContext::scope(lenient.authenticate(login("casuser", "Mellon")))
        .await
        .unwrap();
    assert_eq!(auth.principal().id(), "casuser");
    assert_eq!(auth.principal().attribute("uid"), Some(&AttributeValue::from("cas-1")));
}

#[tokio::test]
async fn multiple_credentials_are_bound_together() {
    let components = plugin(serde_json::json!({ "users": "test::p1,test2::p2" }));
    let authn = manager(
        serde_json::json!({ "policy": { "all": { "enabled": true } } }),
        AuthnRegistry::new().register(components.handler()),
    );

    AuthenticationContext::scope(async {
        let err = authn
            .authenticate(AuthenticationTransaction::of(vec![
                Credential::username_password("test", "p1"),
                Credential::username_password("test2", "wrong"),
            ]))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthenticationError::PolicyNotSatisfied { .. }));
        assert_eq!(resolve_audit_principal(), "test, test2");
    })
    .await;
}
