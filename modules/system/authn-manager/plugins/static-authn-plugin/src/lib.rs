#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static `AuthN` Plugin
//!
//! Configuration-driven collaborators for the `AuthN` manager, for
//! development and testing:
//!
//! - **Accept-users handler**: verifies name + secret credentials against a
//!   static `user::password` list, after an optional principal name
//!   transformation.
//! - **Person-directory resolver**: attaches attributes from a static
//!   repository keyed by principal id.
//! - **Service registry**: maps relying services to the handler names they
//!   accept.
//!
//! ## Configuration
//!
//! ```yaml
//! static_authn_plugin:
//!   handler_name: accept_users
//!   users: "casuser::Mellon,admin::s3cret"
//!   principal_transformation:
//!     case: lower
//!     prefix: ""
//!     suffix: ""
//!   person_directory:
//!     principal_attribute: uid
//!     return_null: false
//!     attributes:
//!       casuser:
//!         uid: casuser
//!         memberOf: [staff, faculty]
//!   services:
//!     "https://app.example.org": [accept_users]
//! ```

pub mod config;
pub mod domain;
pub mod module;

pub use module::StaticAuthnPlugin;
