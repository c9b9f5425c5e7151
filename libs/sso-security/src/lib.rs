#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Identity model shared by the authentication manager, its plugins and
//! audit consumers, plus the per-request authentication context.

pub mod audit;
pub mod authentication;
pub mod constants;
pub mod context;
pub mod credential;
pub mod principal;

pub use audit::{
    AuditPrincipalResolver, DefaultPrincipalIdProvider, PrincipalIdProvider, resolve_audit_principal,
};
pub use authentication::{
    Authentication, AuthenticationBuildError, AuthenticationBuilder, AuthenticationHandlerResult,
};
pub use constants::UNKNOWN_USER;
pub use context::{AuthenticationContext, BoundIdentity, ContextError, RequestScope};
pub use credential::{Credential, CredentialKind};
pub use principal::{AttributeValue, Attributes, Principal};
