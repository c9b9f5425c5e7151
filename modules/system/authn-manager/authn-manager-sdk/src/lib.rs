//! `AuthN` Manager SDK
//!
//! This crate provides the public API for the `authn_manager` module:
//!
//! - [`AuthenticationManagerClient`] - Public API trait for consumers
//! - [`AuthenticationHandler`], [`PrincipalResolver`], [`ServiceLookup`],
//!   [`MetadataPopulator`], [`AdaptiveAuthenticationPolicy`] - collaborator traits
//! - [`AuthenticationTransaction`] - Transaction model
//! - [`AuthenticationError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use authn_manager_sdk::{AuthenticationManagerClient, AuthenticationTransaction};
//! use sso_security::{AuthenticationContext, Credential};
//!
//! let tx = AuthenticationTransaction::of(vec![Credential::username_password("casuser", "Mellon")])
//!     .with_service("https://app.example.org");
//! let authentication = AuthenticationContext::scope(manager.authenticate(tx)).await?;
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod plugin_api;

// Re-export main types at crate root
pub use api::AuthenticationManagerClient;
pub use error::{AuthenticationError, FailureKind, HandlerFailure, HandlerFailures};
pub use models::{AdaptiveDecision, AuthenticationTransaction, ClientInfo, HandlerSuccess};
pub use plugin_api::{
    AdaptiveAuthenticationPolicy, AuthenticationHandler, HandlerRegistration, MetadataPopulator,
    PrincipalResolver, ServiceLookup,
};
