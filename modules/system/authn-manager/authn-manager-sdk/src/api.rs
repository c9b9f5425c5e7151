//! Public API trait for the `AuthN` manager.

use std::sync::Arc;

use async_trait::async_trait;
use sso_security::Authentication;

use crate::error::AuthenticationError;
use crate::models::AuthenticationTransaction;

/// Public API trait for the `AuthN` manager.
///
/// Built once at process start by the module and handed to the web flow:
///
/// ```ignore
/// let authn = module.init(cfg, registry)?;
/// let authentication = AuthenticationContext::scope(async {
///     let authentication = authn.authenticate(tx).await?;
///     audit(resolve_audit_principal());
///     Ok(authentication)
/// })
/// .await?;
/// ```
///
/// Every call must run inside `AuthenticationContext::scope`; calls made
/// outside a scope fail with `Internal` and bind nothing. On success the
/// returned authentication is also bound to that scope, and it is dropped
/// with the scope.
#[async_trait]
pub trait AuthenticationManagerClient: Send + Sync {
    /// Run one authentication transaction.
    ///
    /// # Errors
    ///
    /// - `NoCredentials` if the transaction is empty
    /// - `AdaptivePolicyDenied` if the adaptive policy rejects the request
    /// - `UnsupportedCredentialKind` if a credential has no capable handler
    /// - `PolicyNotSatisfied` with the full per-handler failure map
    /// - `PrincipalMismatch` if successful handlers disagree on the principal
    /// - `Internal` outside a request scope, or for unexpected errors
    async fn authenticate(
        &self,
        transaction: AuthenticationTransaction,
    ) -> Result<Arc<Authentication>, AuthenticationError>;
}
