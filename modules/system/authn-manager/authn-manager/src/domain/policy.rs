//! Authentication policy evaluation.
//!
//! Each variant is a pure function of the running [`OutcomeSet`]:
//!
//! | variant           | `Satisfied`                      | `Unsatisfiable`          |
//! |-------------------|----------------------------------|--------------------------|
//! | `AllMustSucceed`  | every resolved attempt succeeded | any failure              |
//! | `AnyMustSucceed`  | at least one success             | never                    |
//! | `NotPrevented`    | a success and no blocking failure| any blocking failure     |
//! | `RequiredHandler` | the named handler succeeded      | never                    |
//!
//! Anything else is `Continue`.

use crate::config::AuthenticationPolicyConfig;

use super::error::DomainError;
use super::transaction::OutcomeSet;

/// Decision after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyVerdict {
    Continue,
    Satisfied,
    Unsatisfiable,
}

/// The configured success policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationPolicy {
    AllMustSucceed { try_all: bool },
    AnyMustSucceed { try_all: bool },
    NotPrevented,
    RequiredHandler { handler_name: String, try_all: bool },
}

impl Default for AuthenticationPolicy {
    fn default() -> Self {
        Self::AnyMustSucceed { try_all: false }
    }
}

impl AuthenticationPolicy {
    /// Select the policy from configuration: required-handler, then all,
    /// then not-prevented, then any.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the required-handler policy is
    /// enabled without a handler name.
    pub fn from_config(cfg: &AuthenticationPolicyConfig) -> Result<Self, DomainError> {
        if cfg.req.enabled {
            if cfg.req.handler_name.trim().is_empty() {
                return Err(DomainError::InvalidConfiguration(
                    "required-handler policy enabled without a handler name".to_owned(),
                ));
            }
            return Ok(Self::RequiredHandler {
                handler_name: cfg.req.handler_name.clone(),
                try_all: cfg.req.try_all,
            });
        }
        if cfg.all.enabled {
            return Ok(Self::AllMustSucceed {
                try_all: cfg.all.try_all,
            });
        }
        if cfg.not_prevented.enabled {
            return Ok(Self::NotPrevented);
        }
        Ok(Self::AnyMustSucceed {
            try_all: cfg.any.try_all,
        })
    }

    /// Whether every resolved handler is invoked even after a terminal verdict.
    #[must_use]
    pub fn try_all(&self) -> bool {
        match self {
            Self::AllMustSucceed { try_all }
            | Self::AnyMustSucceed { try_all }
            | Self::RequiredHandler { try_all, .. } => *try_all,
            Self::NotPrevented => false,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AllMustSucceed { .. } => "all",
            Self::AnyMustSucceed { .. } => "any",
            Self::NotPrevented => "not_prevented",
            Self::RequiredHandler { .. } => "required_handler",
        }
    }

    #[must_use]
    pub fn evaluate(&self, outcomes: &OutcomeSet) -> PolicyVerdict {
        match self {
            Self::AllMustSucceed { .. } => {
                if outcomes.failure_count() > 0 {
                    PolicyVerdict::Unsatisfiable
                } else if outcomes.success_count() == outcomes.expected_attempts() {
                    PolicyVerdict::Satisfied
                } else {
                    PolicyVerdict::Continue
                }
            }
            Self::AnyMustSucceed { .. } => {
                if outcomes.success_count() > 0 {
                    PolicyVerdict::Satisfied
                } else {
                    PolicyVerdict::Continue
                }
            }
            Self::NotPrevented => {
                if outcomes.has_blocking_failure() {
                    PolicyVerdict::Unsatisfiable
                } else if outcomes.success_count() > 0 {
                    PolicyVerdict::Satisfied
                } else {
                    PolicyVerdict::Continue
                }
            }
            Self::RequiredHandler { handler_name, .. } => {
                if outcomes.has_success_from(handler_name) {
                    PolicyVerdict::Satisfied
                } else {
                    PolicyVerdict::Continue
                }
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use authn_manager_sdk::{FailureKind, HandlerFailure};
    use sso_security::{Attributes, AuthenticationHandlerResult, Principal};

    use super::*;
    use crate::config::{
        AllPolicyConfig, AnyPolicyConfig, NotPreventedPolicyConfig, RequiredHandlerPolicyConfig,
    };

    #[derive(Clone, Copy)]
    enum Step {
        Pass(&'static str),
        Fail(&'static str, FailureKind),
    }

    use PolicyVerdict::{Continue, Satisfied, Unsatisfiable};
    use Step::{Fail, Pass};

    /// Feed `steps` one by one and collect the verdict after each.
    fn verdicts(policy: &AuthenticationPolicy, expected: usize, steps: &[Step]) -> Vec<PolicyVerdict> {
        let mut outcomes = OutcomeSet::new(expected);
        steps
            .iter()
            .map(|step| {
                match *step {
                    Pass(name) => {
                        let idx = outcomes.success_count();
                        outcomes.record_success(
                            0,
                            AuthenticationHandlerResult::new(
                                name,
                                Principal::new("casuser"),
                                Attributes::new(),
                                idx,
                            ),
                        );
                    }
                    Fail(name, kind) => {
                        outcomes.record_failure(name, HandlerFailure::new(kind, "failed"));
                    }
                }
                policy.evaluate(&outcomes)
            })
            .collect()
    }

    const BAD: FailureKind = FailureKind::InvalidCredential;
    const PREVENTED: FailureKind = FailureKind::Prevented;

    #[test]
    fn all_must_succeed_truth_table() {
        let p = AuthenticationPolicy::AllMustSucceed { try_all: false };

        assert_eq!(verdicts(&p, 2, &[Pass("a"), Pass("b")]), [Continue, Satisfied]);
        assert_eq!(verdicts(&p, 2, &[Pass("a"), Fail("b", BAD)]), [Continue, Unsatisfiable]);
        assert_eq!(verdicts(&p, 3, &[Fail("a", BAD)]), [Unsatisfiable]);
        assert_eq!(verdicts(&p, 1, &[Pass("a")]), [Satisfied]);
    }

    #[test]
    fn any_must_succeed_truth_table() {
        let p = AuthenticationPolicy::AnyMustSucceed { try_all: false };

        assert_eq!(verdicts(&p, 3, &[Fail("a", BAD), Pass("b")]), [Continue, Satisfied]);
        assert_eq!(
            verdicts(&p, 2, &[Fail("a", PREVENTED), Fail("b", BAD)]),
            [Continue, Continue]
        );
        assert_eq!(verdicts(&p, 2, &[Pass("a"), Fail("b", BAD)]), [Satisfied, Satisfied]);
    }

    #[test]
    fn not_prevented_truth_table() {
        let p = AuthenticationPolicy::NotPrevented;

        assert_eq!(verdicts(&p, 2, &[Fail("a", BAD), Pass("b")]), [Continue, Satisfied]);
        assert_eq!(verdicts(&p, 2, &[Fail("a", PREVENTED)]), [Unsatisfiable]);
        assert_eq!(
            verdicts(&p, 2, &[Fail("a", FailureKind::AccountLocked)]),
            [Unsatisfiable]
        );
        assert_eq!(
            verdicts(&p, 2, &[Fail("a", FailureKind::PasswordExpired), Fail("b", BAD)]),
            [Continue, Continue]
        );
        assert_eq!(
            verdicts(&p, 2, &[Pass("a"), Fail("b", PREVENTED)]),
            [Satisfied, Unsatisfiable]
        );
    }

    #[test]
    fn required_handler_truth_table() {
        let p = AuthenticationPolicy::RequiredHandler {
            handler_name: "ldap".to_owned(),
            try_all: false,
        };

        assert_eq!(
            verdicts(&p, 3, &[Pass("accept"), Fail("jaas", BAD), Pass("ldap")]),
            [Continue, Continue, Satisfied]
        );
        assert_eq!(verdicts(&p, 2, &[Fail("ldap", BAD), Pass("accept")]), [Continue, Continue]);
    }

    #[test]
    fn selection_precedence() {
        let mut cfg = AuthenticationPolicyConfig {
            req: RequiredHandlerPolicyConfig {
                enabled: true,
                handler_name: "ldap".to_owned(),
                try_all: true,
            },
            all: AllPolicyConfig {
                enabled: true,
                try_all: false,
            },
            not_prevented: NotPreventedPolicyConfig { enabled: true },
            any: AnyPolicyConfig { try_all: true },
        };

        assert_eq!(
            AuthenticationPolicy::from_config(&cfg).unwrap(),
            AuthenticationPolicy::RequiredHandler {
                handler_name: "ldap".to_owned(),
                try_all: true
            }
        );

        cfg.req.enabled = false;
        assert_eq!(
            AuthenticationPolicy::from_config(&cfg).unwrap(),
            AuthenticationPolicy::AllMustSucceed { try_all: false }
        );

        cfg.all.enabled = false;
        assert_eq!(
            AuthenticationPolicy::from_config(&cfg).unwrap(),
            AuthenticationPolicy::NotPrevented
        );

        cfg.not_prevented.enabled = false;
        assert_eq!(
            AuthenticationPolicy::from_config(&cfg).unwrap(),
            AuthenticationPolicy::AnyMustSucceed { try_all: true }
        );
    }

    #[test]
    fn default_config_selects_any_without_try_all() {
        let p = AuthenticationPolicy::from_config(&AuthenticationPolicyConfig::default()).unwrap();
        assert_eq!(p, AuthenticationPolicy::default());
        assert!(!p.try_all());
    }

    #[test]
    fn required_handler_needs_a_name() {
        let cfg = AuthenticationPolicyConfig {
            req: RequiredHandlerPolicyConfig {
                enabled: true,
                handler_name: "  ".to_owned(),
                try_all: false,
            },
            ..AuthenticationPolicyConfig::default()
        };

        assert!(matches!(
            AuthenticationPolicy::from_config(&cfg),
            Err(DomainError::InvalidConfiguration(_))
        ));
    }
}
