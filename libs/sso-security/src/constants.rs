//! Well-known identity constants.

/// Identity reported to audit consumers when nothing is bound to the
/// current request.
pub const UNKNOWN_USER: &str = "audit:unknown";

/// Credential kind of a name + secret pair.
pub const USERNAME_PASSWORD_KIND: &str = "username_password";

/// Authentication attribute listing every handler that succeeded.
pub const SUCCESSFUL_HANDLERS_ATTRIBUTE: &str = "successfulAuthenticationHandlers";

/// Handler-result attribute naming the handler that produced it.
pub const AUTHENTICATION_METHOD_ATTRIBUTE: &str = "authenticationMethod";

/// Authentication attribute set when the credential asked to be remembered.
pub const REMEMBER_ME_ATTRIBUTE: &str = "rememberMe";

/// Authentication attribute holding the cached raw credential secret.
pub const CACHED_CREDENTIAL_ATTRIBUTE: &str = "credential";
