//! Running state of one authentication transaction.

use authn_manager_sdk::{HandlerFailure, HandlerFailures};
use sso_security::AuthenticationHandlerResult;

use super::policy::PolicyVerdict;

/// Lifecycle of a transaction. `Succeeded` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Pending,
    Evaluating,
    Succeeded,
    Failed,
}

/// A successful attempt and the credential it was made for.
#[derive(Debug, Clone)]
pub struct RecordedSuccess {
    pub credential_index: usize,
    pub result: AuthenticationHandlerResult,
}

/// Every attempt outcome recorded so far, in invocation order.
#[derive(Debug, Clone)]
pub struct OutcomeSet {
    expected_attempts: usize,
    successes: Vec<RecordedSuccess>,
    failures: Vec<(String, HandlerFailure)>,
}

impl OutcomeSet {
    /// `expected_attempts` is the number of resolved handlers across every
    /// credential of the transaction.
    #[must_use]
    pub fn new(expected_attempts: usize) -> Self {
        Self {
            expected_attempts,
            successes: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Record a success; returns its zero-based position among successes.
    pub fn record_success(&mut self, credential_index: usize, result: AuthenticationHandlerResult) -> usize {
        self.successes.push(RecordedSuccess {
            credential_index,
            result,
        });
        self.successes.len() - 1
    }

    pub fn record_failure(&mut self, handler_name: impl Into<String>, failure: HandlerFailure) {
        self.failures.push((handler_name.into(), failure));
    }

    #[must_use]
    pub fn expected_attempts(&self) -> usize {
        self.expected_attempts
    }

    #[must_use]
    pub fn attempts(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn successes(&self) -> &[RecordedSuccess] {
        &self.successes
    }

    #[must_use]
    pub fn has_success_from(&self, handler_name: &str) -> bool {
        self.successes
            .iter()
            .any(|s| s.result.handler_name() == handler_name)
    }

    #[must_use]
    pub fn has_blocking_failure(&self) -> bool {
        self.failures.iter().any(|(_, f)| f.is_blocking())
    }

    /// Failures grouped by handler name, each group in invocation order.
    #[must_use]
    pub fn failure_map(&self) -> HandlerFailures {
        let mut map = HandlerFailures::new();
        for (name, failure) in &self.failures {
            map.entry(name.clone()).or_default().push(failure.clone());
        }
        map
    }

    #[must_use]
    pub fn success_handler_names(&self) -> Vec<String> {
        self.successes
            .iter()
            .map(|s| s.result.handler_name().to_owned())
            .collect()
    }

    #[must_use]
    pub fn into_successes(self) -> Vec<RecordedSuccess> {
        self.successes
    }
}

/// Tracks the state machine and the sticky policy verdict.
#[derive(Debug)]
pub struct TransactionTracker {
    state: TransactionState,
    verdict: PolicyVerdict,
    try_all: bool,
}

impl TransactionTracker {
    #[must_use]
    pub fn new(try_all: bool) -> Self {
        Self {
            state: TransactionState::Pending,
            verdict: PolicyVerdict::Continue,
            try_all,
        }
    }

    pub fn start(&mut self) {
        self.state = TransactionState::Evaluating;
    }

    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.state
    }

    #[must_use]
    pub fn verdict(&self) -> PolicyVerdict {
        self.verdict
    }

    /// Feed the verdict computed after an attempt. The first terminal
    /// verdict sticks. Returns whether more handlers should be invoked.
    pub fn observe(&mut self, verdict: PolicyVerdict) -> bool {
        if self.verdict == PolicyVerdict::Continue {
            self.verdict = verdict;
        }
        self.verdict == PolicyVerdict::Continue || self.try_all
    }

    /// Close the transaction once attempts stopped or ran out.
    pub fn finish(&mut self) -> TransactionState {
        self.state = if self.verdict == PolicyVerdict::Satisfied {
            TransactionState::Succeeded
        } else {
            TransactionState::Failed
        };
        self.state
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use authn_manager_sdk::FailureKind;
    use sso_security::{Attributes, Principal};

    use super::*;

    fn success(handler: &str) -> AuthenticationHandlerResult {
        AuthenticationHandlerResult::new(handler, Principal::new("casuser"), Attributes::new(), 0)
    }

    #[test]
    fn outcome_set_counts_and_failure_map() {
        let mut outcomes = OutcomeSet::new(3);
        outcomes.record_failure("a", HandlerFailure::invalid_credential("first"));
        assert_eq!(outcomes.record_success(0, success("b")), 0);
        outcomes.record_failure("a", HandlerFailure::prevented("second"));

        assert_eq!(outcomes.attempts(), 3);
        assert_eq!(outcomes.success_count(), 1);
        assert!(outcomes.has_success_from("b"));
        assert!(!outcomes.has_success_from("a"));
        assert!(outcomes.has_blocking_failure());

        let map = outcomes.failure_map();
        assert_eq!(map.len(), 1);
        let kinds: Vec<_> = map["a"].iter().map(|f| f.kind).collect();
        assert_eq!(kinds, [FailureKind::InvalidCredential, FailureKind::Prevented]);
    }

    #[test]
    fn tracker_stops_on_first_terminal_verdict() {
        let mut tracker = TransactionTracker::new(false);
        tracker.start();
        assert_eq!(tracker.state(), TransactionState::Evaluating);

        assert!(tracker.observe(PolicyVerdict::Continue));
        assert!(!tracker.observe(PolicyVerdict::Satisfied));
        assert_eq!(tracker.finish(), TransactionState::Succeeded);
    }

    #[test]
    fn tracker_try_all_keeps_going_but_verdict_sticks() {
        let mut tracker = TransactionTracker::new(true);
        tracker.start();

        assert!(tracker.observe(PolicyVerdict::Unsatisfiable));
        assert!(tracker.observe(PolicyVerdict::Satisfied));
        assert_eq!(tracker.verdict(), PolicyVerdict::Unsatisfiable);
        assert_eq!(tracker.finish(), TransactionState::Failed);
    }

    #[test]
    fn tracker_without_verdict_fails() {
        let mut tracker = TransactionTracker::new(false);
        tracker.start();
        tracker.observe(PolicyVerdict::Continue);
        assert_eq!(tracker.finish(), TransactionState::Failed);
    }
}
