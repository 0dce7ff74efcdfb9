//! Length bounds applied by the two admission entry points.

use serde::{Deserialize, Serialize};

/// Length bounds, counted in characters of the raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionPolicy {
    /// Bound for natural-language entry
    #[serde(default = "default_natural_language_max_len")]
    pub natural_language_max_len: usize,

    /// Bound for the general expression endpoint
    #[serde(default = "default_expression_max_len")]
    pub expression_max_len: usize,
}

impl AdmissionPolicy {
    pub const NATURAL_LANGUAGE_MAX_LEN: usize = 200;
    pub const EXPRESSION_MAX_LEN: usize = 500;
}

fn default_natural_language_max_len() -> usize {
    AdmissionPolicy::NATURAL_LANGUAGE_MAX_LEN
}

fn default_expression_max_len() -> usize {
    AdmissionPolicy::EXPRESSION_MAX_LEN
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            natural_language_max_len: Self::NATURAL_LANGUAGE_MAX_LEN,
            expression_max_len: Self::EXPRESSION_MAX_LEN,
        }
    }
}
