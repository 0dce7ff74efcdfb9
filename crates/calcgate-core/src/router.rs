//! Natural-language router.
//!
//! Advisory classifier deciding whether the normalizer should run on an
//! expression. Callers may still force natural-language handling.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::Route;

lazy_static! {
    static ref PERCENTAGE_WITH_WORDS: Regex = Regex::new(r"(?i)%\s*(?:of|from)").unwrap();

    static ref OPERATOR_WORDS: Regex = Regex::new(
        r"(?i)\b(of|from|plus|minus|times|multiplied|divided|divide|over|added|subtract|power|root|square|cube|sine|cosine|tangent|log|logarithm|absolute|value|abs)\b"
    ).unwrap();

    static ref ALPHABETIC_RUN: Regex = Regex::new(r"(?i)[a-z]{2,}").unwrap();

    /// Same character class as the whitelist validator.
    pub(crate) static ref PURE_MATH: Regex = Regex::new(r"(?i)^[0-9+\-*/().\s^a-z,]+$").unwrap();
}

/// Whether `expr` reads as a natural-language phrase rather than notation.
pub fn looks_like_natural_language(expr: &str) -> bool {
    if PERCENTAGE_WITH_WORDS.is_match(expr) || OPERATOR_WORDS.is_match(expr) {
        return true;
    }

    ALPHABETIC_RUN.is_match(expr) && !PURE_MATH.is_match(expr)
}

/// Route `expr` through the classifier.
pub fn classify(expr: &str) -> Route {
    if looks_like_natural_language(expr) {
        Route::NaturalLanguage
    } else {
        Route::StrictMath
    }
}
