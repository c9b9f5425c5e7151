//! `AuthN` Manager Module
//!
//! Coordinates the registered authentication handlers for one transaction:
//! resolves which handlers apply to each credential, invokes them in order,
//! consults the configured policy after every attempt, and on success runs
//! the metadata populators and elects a single principal.
//!
//! Provides the `AuthenticationManagerClient` trait implementation built by
//! [`module::AuthnManagerModule`].
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod module;
