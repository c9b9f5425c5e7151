//! Username normalization applied before lookup.

use crate::config::{CaseConversion, PrincipalTransformationConfig};

/// Changes case, then wraps the name in the configured prefix and suffix.
#[derive(Debug, Clone, Default)]
pub struct PrincipalNameTransformer {
    case: CaseConversion,
    prefix: String,
    suffix: String,
}

impl PrincipalNameTransformer {
    #[must_use]
    pub fn from_config(cfg: &PrincipalTransformationConfig) -> Self {
        Self {
            case: cfg.case,
            prefix: cfg.prefix.clone(),
            suffix: cfg.suffix.clone(),
        }
    }

    #[must_use]
    pub fn transform(&self, name: &str) -> String {
        let name = match self.case {
            CaseConversion::None => name.to_owned(),
            CaseConversion::Upper => name.to_uppercase(),
            CaseConversion::Lower => name.to_lowercase(),
        };
        format!("{}{name}{}", self.prefix, self.suffix)
    }
}
