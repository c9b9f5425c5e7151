//! Principal election across successful handler results.

use sso_security::{Attributes, AuthenticationHandlerResult, Principal};
use tracing::warn;

use super::error::DomainError;

/// Elects the first result's principal id and merges the attributes of
/// every result in invocation order; a later result overwrites an earlier
/// value for the same key.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPrincipalElectionStrategy {
    ignore_mismatch: bool,
}

impl DefaultPrincipalElectionStrategy {
    #[must_use]
    pub fn new(ignore_mismatch: bool) -> Self {
        Self { ignore_mismatch }
    }

    /// # Errors
    ///
    /// - `PrincipalMismatch` if results disagree on the principal id and
    ///   mismatches are not ignored
    /// - `Internal` if `results` is empty
    pub fn elect(&self, results: &[AuthenticationHandlerResult]) -> Result<Principal, DomainError> {
        let Some(first) = results.first() else {
            return Err(DomainError::Internal(
                "principal election requires at least one handler result".to_owned(),
            ));
        };
        let elected_id = first.principal().id();

        let mut merged = Attributes::new();
        for result in results {
            let id = result.principal().id();
            if id != elected_id {
                if !self.ignore_mismatch {
                    return Err(DomainError::PrincipalMismatch {
                        expected: elected_id.to_owned(),
                        actual: id.to_owned(),
                        handler: result.handler_name().to_owned(),
                    });
                }
                warn!(
                    elected = elected_id,
                    handler = result.handler_name(),
                    resolved = id,
                    "ignoring principal mismatch"
                );
            }
            merged.extend(
                result
                    .principal()
                    .attributes()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
        }

        Ok(Principal::with_attributes(elected_id, merged))
    }
}
