//! Domain service for the `AuthN` manager: the authentication transaction
//! engine.

use std::sync::Arc;

use authn_manager_sdk::{
    AdaptiveAuthenticationPolicy, AdaptiveDecision, AuthenticationTransaction, HandlerFailure,
    HandlerRegistration, HandlerSuccess,
};
use sso_security::{
    Authentication, AuthenticationBuilder, AuthenticationContext, AuthenticationHandlerResult,
    Credential,
};
use tracing::{debug, info, warn};

use super::election::DefaultPrincipalElectionStrategy;
use super::error::DomainError;
use super::handler_resolver::HandlerResolver;
use super::policy::AuthenticationPolicy;
use super::populators::MetadataPopulatorChain;
use super::transaction::{OutcomeSet, TransactionState, TransactionTracker};

/// `AuthN` manager service.
///
/// Immutable once built; every transaction keeps its own outcome state, so
/// one instance serves concurrent requests.
pub struct Service {
    registrations: Vec<HandlerRegistration>,
    handler_resolver: HandlerResolver,
    policy: AuthenticationPolicy,
    election: DefaultPrincipalElectionStrategy,
    populators: MetadataPopulatorChain,
    adaptive_policy: Option<Arc<dyn AdaptiveAuthenticationPolicy>>,
}

impl Service {
    /// Create a service over `registrations`, which are attempted in the
    /// given order.
    #[must_use]
    pub fn new(registrations: Vec<HandlerRegistration>, policy: AuthenticationPolicy) -> Self {
        Self {
            registrations,
            handler_resolver: HandlerResolver::new(),
            policy,
            election: DefaultPrincipalElectionStrategy::default(),
            populators: MetadataPopulatorChain::new(),
            adaptive_policy: None,
        }
    }

    #[must_use]
    pub fn with_handler_resolver(mut self, handler_resolver: HandlerResolver) -> Self {
        self.handler_resolver = handler_resolver;
        self
    }

    #[must_use]
    pub fn with_election(mut self, election: DefaultPrincipalElectionStrategy) -> Self {
        self.election = election;
        self
    }

    #[must_use]
    pub fn with_populators(mut self, populators: MetadataPopulatorChain) -> Self {
        self.populators = populators;
        self
    }

    #[must_use]
    pub fn with_adaptive_policy(mut self, policy: Arc<dyn AdaptiveAuthenticationPolicy>) -> Self {
        self.adaptive_policy = Some(policy);
        self
    }

    #[must_use]
    pub fn policy(&self) -> &AuthenticationPolicy {
        &self.policy
    }

    /// Run one authentication transaction.
    ///
    /// Must run inside `AuthenticationContext::scope`. The submitted
    /// credentials are bound to that scope once the adaptive policy lets the
    /// transaction start; the resulting authentication replaces them on
    /// success.
    ///
    /// # Errors
    ///
    /// - `Internal` if no request scope is active; nothing is bound
    /// - `NoCredentials` for an empty transaction
    /// - `AdaptivePolicyDenied` if the adaptive policy rejects the client
    /// - `UnsupportedCredentialKind` if a credential has no handler; no
    ///   handler is invoked in that case
    /// - `PolicyNotSatisfied` with the per-handler failures otherwise
    /// - `PrincipalMismatch` if successful handlers disagree on the principal
    #[tracing::instrument(
        skip_all,
        fields(
            credentials = tx.credentials.len(),
            service_id = tx.service_id.as_deref().unwrap_or_default(),
            policy = self.policy.name(),
        )
    )]
    pub async fn authenticate(
        &self,
        tx: AuthenticationTransaction,
    ) -> Result<Arc<Authentication>, DomainError> {
        if !AuthenticationContext::in_task_scope() {
            return Err(DomainError::Internal(
                "authentication must run inside AuthenticationContext::scope".to_owned(),
            ));
        }
        if tx.credentials.is_empty() {
            return Err(DomainError::NoCredentials);
        }

        if let (Some(adaptive), Some(client)) = (&self.adaptive_policy, &tx.client_info)
            && let AdaptiveDecision::Deny { reason } = adaptive.evaluate(client)
        {
            return Err(DomainError::AdaptivePolicyDenied(reason));
        }

        AuthenticationContext::bind_credentials(&tx.credentials);

        let mut plan = Vec::with_capacity(tx.credentials.len());
        for credential in &tx.credentials {
            let handlers = self
                .handler_resolver
                .resolve(&self.registrations, credential, tx.service_id.as_deref())
                .await?;
            plan.push((credential, handlers));
        }
        let expected = plan.iter().map(|(_, handlers)| handlers.len()).sum();

        let mut outcomes = OutcomeSet::new(expected);
        let mut tracker = TransactionTracker::new(self.policy.try_all());
        tracker.start();

        'attempts: for (credential_index, (credential, handlers)) in plan.into_iter().enumerate() {
            for registration in handlers {
                match self
                    .attempt(registration, credential, outcomes.success_count())
                    .await
                {
                    Ok(result) => {
                        debug!(handler = registration.name(), credential = %credential, "handler succeeded");
                        outcomes.record_success(credential_index, result);
                    }
                    Err(failure) => {
                        debug!(
                            handler = registration.name(),
                            credential = %credential,
                            kind = %failure.kind,
                            "handler failed"
                        );
                        outcomes.record_failure(registration.name(), failure);
                    }
                }

                let verdict = self.policy.evaluate(&outcomes);
                if !tracker.observe(verdict) {
                    break 'attempts;
                }
            }
        }

        if tracker.finish() == TransactionState::Failed {
            info!(
                attempts = outcomes.attempts(),
                failures = outcomes.failure_count(),
                "authentication policy not satisfied"
            );
            return Err(DomainError::PolicyNotSatisfied {
                failures: outcomes.failure_map(),
                successes: outcomes.success_handler_names(),
            });
        }

        let mut builder = AuthenticationBuilder::new();
        for success in outcomes.into_successes() {
            builder.add_result(success.result);
        }
        self.populators.populate(&mut builder, &tx.credentials);

        let principal = self.election.elect(builder.results())?;
        let authentication = Arc::new(builder.build(principal)?);
        AuthenticationContext::bind_authentication(Arc::clone(&authentication));

        info!(
            principal = authentication.principal().id(),
            handlers = authentication.results().len(),
            "authentication succeeded"
        );
        Ok(authentication)
    }

    /// One handler attempt, followed by principal resolution when the
    /// registration carries a resolver that supports the credential.
    async fn attempt(
        &self,
        registration: &HandlerRegistration,
        credential: &Credential,
        success_index: usize,
    ) -> Result<AuthenticationHandlerResult, HandlerFailure> {
        let HandlerSuccess {
            principal,
            attributes,
        } = registration.handler.authenticate(credential).await?;

        let principal = match &registration.resolver {
            Some(resolver) if resolver.supports(credential) => {
                if let Some(resolved) = resolver.resolve(credential, &principal).await? {
                    resolved
                } else {
                    warn!(
                        handler = registration.name(),
                        principal = principal.id(),
                        "principal resolver returned nothing; keeping handler principal"
                    );
                    principal
                }
            }
            _ => principal,
        };

        Ok(AuthenticationHandlerResult::new(
            registration.name(),
            principal,
            attributes,
            success_index,
        ))
    }
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("registrations", &self.registrations)
            .field("policy", &self.policy)
            .field("election", &self.election)
            .field("populators", &self.populators)
            .field("adaptive_policy", &self.adaptive_policy.is_some())
            .finish_non_exhaustive()
    }
}
