use thiserror::Error;
use time::OffsetDateTime;

use crate::principal::{AttributeValue, Attributes, Principal};

/// Outcome of one successful handler attempt inside a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationHandlerResult {
    handler_name: String,
    principal: Principal,
    attributes: Attributes,
    /// Zero-based position of this success among the transaction's successes.
    success_index: usize,
}

impl AuthenticationHandlerResult {
    #[must_use]
    pub fn new(
        handler_name: impl Into<String>,
        principal: Principal,
        attributes: Attributes,
        success_index: usize,
    ) -> Self {
        Self {
            handler_name: handler_name.into(),
            principal,
            attributes,
            success_index,
        }
    }

    #[must_use]
    pub fn handler_name(&self) -> &str {
        &self.handler_name
    }

    #[must_use]
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    #[must_use]
    pub fn success_index(&self) -> usize {
        self.success_index
    }

    /// Add or overwrite a per-result attribute. Existing keys are never removed.
    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.insert(key.into(), value.into());
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthenticationBuildError {
    #[error("an authentication requires at least one successful handler result")]
    NoHandlerResults,
}

/// Terminal success of an authentication transaction.
///
/// Immutable after construction; it is only ever created through
/// [`AuthenticationBuilder::build`], which enforces that at least one
/// handler result is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authentication {
    principal: Principal,
    results: Vec<AuthenticationHandlerResult>,
    attributes: Attributes,
    authenticated_at: OffsetDateTime,
}

impl Authentication {
    #[must_use]
    pub fn builder() -> AuthenticationBuilder {
        AuthenticationBuilder::new()
    }

    /// The elected principal.
    #[must_use]
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Contributing handler results, in invocation order.
    #[must_use]
    pub fn results(&self) -> &[AuthenticationHandlerResult] {
        &self.results
    }

    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    #[must_use]
    pub fn authenticated_at(&self) -> OffsetDateTime {
        self.authenticated_at
    }
}

/// Mutable staging area for an [`Authentication`].
///
/// Metadata populators receive this builder: they may add or overwrite
/// attributes (globally or per handler result) but cannot drop results.
#[derive(Debug)]
pub struct AuthenticationBuilder {
    results: Vec<AuthenticationHandlerResult>,
    attributes: Attributes,
    authenticated_at: OffsetDateTime,
}

impl Default for AuthenticationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthenticationBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            attributes: Attributes::new(),
            authenticated_at: OffsetDateTime::now_utc(),
        }
    }

    #[must_use]
    pub fn authenticated_at(mut self, at: OffsetDateTime) -> Self {
        self.authenticated_at = at;
        self
    }

    #[must_use]
    pub fn result(mut self, result: AuthenticationHandlerResult) -> Self {
        self.results.push(result);
        self
    }

    pub fn add_result(&mut self, result: AuthenticationHandlerResult) {
        self.results.push(result);
    }

    /// Add or overwrite an authentication-level attribute.
    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn results(&self) -> &[AuthenticationHandlerResult] {
        &self.results
    }

    pub fn results_mut(&mut self) -> &mut [AuthenticationHandlerResult] {
        &mut self.results
    }

    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Seal the authentication around the elected principal.
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticationBuildError::NoHandlerResults`] if no handler
    /// result was recorded.
    pub fn build(self, principal: Principal) -> Result<Authentication, AuthenticationBuildError> {
        if self.results.is_empty() {
            return Err(AuthenticationBuildError::NoHandlerResults);
        }
        Ok(Authentication {
            principal,
            results: self.results,
            attributes: self.attributes,
            authenticated_at: self.authenticated_at,
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn result(handler: &str, id: &str, index: usize) -> AuthenticationHandlerResult {
        AuthenticationHandlerResult::new(handler, Principal::new(id), Attributes::new(), index)
    }

    #[test]
    fn build_without_results_fails() {
        let err = Authentication::builder()
            .build(Principal::new("casuser"))
            .unwrap_err();

        assert_eq!(err, AuthenticationBuildError::NoHandlerResults);
    }

    #[test]
    fn build_keeps_results_in_order() {
        let auth = Authentication::builder()
            .result(result("primary", "casuser", 0))
            .result(result("secondary", "casuser", 1))
            .build(Principal::new("casuser"))
            .unwrap();

        let names: Vec<_> = auth
            .results()
            .iter()
            .map(AuthenticationHandlerResult::handler_name)
            .collect();
        assert_eq!(names, ["primary", "secondary"]);
        assert_eq!(auth.principal().id(), "casuser");
    }

    #[test]
    fn builder_attributes_overwrite_by_key() {
        let mut b = Authentication::builder().result(result("primary", "casuser", 0));
        b.add_attribute("rememberMe", false);
        b.add_attribute("rememberMe", true);
        b.results_mut()[0].add_attribute("authenticationMethod", "primary");

        let auth = b.build(Principal::new("casuser")).unwrap();

        assert_eq!(auth.attribute("rememberMe"), Some(&AttributeValue::from("true")));
        assert_eq!(
            auth.results()[0].attributes().get("authenticationMethod"),
            Some(&AttributeValue::from("primary"))
        );
    }

    #[test]
    fn explicit_timestamp_is_kept() {
        let at = OffsetDateTime::UNIX_EPOCH;
        let auth = Authentication::builder()
            .authenticated_at(at)
            .result(result("primary", "casuser", 0))
            .build(Principal::new("casuser"))
            .unwrap();

        assert_eq!(auth.authenticated_at(), at);
    }
}
