//! Whitelist validator.
//!
//! Two passes guard the evaluator: a character-class check, then erasure of
//! every recognized function/constant token followed by erasure of numbers,
//! operators, grouping and whitespace. The character class alone admits any
//! lowercase word, so the second pass is what rejects stray identifiers.

use lazy_static::lazy_static;
use regex::Regex;

use crate::router::PURE_MATH;
use crate::types::{Rejection, RejectionKind};

/// Function and constant names the evaluator understands, in erasure order.
pub const RECOGNIZED_TOKENS: &[&str] = &[
    "sqrt", "cbrt", "sin", "cos", "tan", "log", "ln", "abs", "ceil", "floor", "pi", "e",
];

lazy_static! {
    static ref RESIDUAL: Regex = Regex::new(r"[0-9+\-*/().\s^,]").unwrap();

    /// Letters, digits, whitespace, light punctuation and operators.
    static ref NATURAL_LANGUAGE_CHARSET: Regex =
        Regex::new(r"(?i)^[a-z0-9\s.,!?%()+\-*/^]+$").unwrap();
}

/// Whether `text` only uses characters allowed in natural-language entry.
pub fn has_natural_language_characters(text: &str) -> bool {
    NATURAL_LANGUAGE_CHARSET.is_match(text)
}

/// Whether every character of `expr` is in the canonical character class.
pub fn has_valid_characters(expr: &str) -> bool {
    PURE_MATH.is_match(expr)
}

/// Remove recognized tokens from a lower-cased copy of `expr`.
///
/// One pass, each token removed everywhere in [`RECOGNIZED_TOKENS`] order.
pub fn erase_recognized_tokens(expr: &str) -> String {
    RECOGNIZED_TOKENS
        .iter()
        .fold(expr.to_lowercase(), |cleaned, token| cleaned.replace(token, ""))
}

/// Characters of `expr` that are neither recognized tokens nor notation.
///
/// Tokens assembled by the erasure itself ("ssinin" leaves "sin") count as
/// leftover text.
pub fn leftover_text(expr: &str) -> String {
    RESIDUAL
        .replace_all(&erase_recognized_tokens(expr), "")
        .into_owned()
}

/// Run both passes, reporting which one failed.
pub fn validate_expression(expr: &str) -> Result<(), Rejection> {
    if !has_valid_characters(expr) {
        return Err(Rejection::new(
            RejectionKind::InvalidCharacters,
            "Invalid expression: contains invalid characters",
        ));
    }

    if !leftover_text(expr).is_empty() {
        return Err(Rejection::new(
            RejectionKind::UnrecognizedTokens,
            "Invalid expression: contains unrecognized functions or text",
        ));
    }

    Ok(())
}

/// Whether `expr` is safe to dispatch to the evaluator.
pub fn is_clean_math_expression(expr: &str) -> bool {
    validate_expression(expr).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_arithmetic_is_clean() {
        assert!(is_clean_math_expression("2 + 2 * 3"));
        assert!(is_clean_math_expression("(10 / 100) * 5"));
        assert!(is_clean_math_expression("2 ^ 10 - 1.5"));
    }

    #[test]
    fn test_functions_and_constants_are_clean() {
        assert!(is_clean_math_expression("sqrt(16) + cbrt(27)"));
        assert!(is_clean_math_expression("SIN(PI / 2) * e"));
        assert!(is_clean_math_expression("floor(2.7), ceil(2.1)"));
        assert!(is_clean_math_expression("ln(e) + log(100) + abs(-3)"));
    }

    #[test]
    fn test_unrecognized_word_is_rejected() {
        let err = validate_expression("2 + banana").unwrap_err();
        assert_eq!(err.kind, RejectionKind::UnrecognizedTokens);
        assert_eq!(
            err.message,
            "Invalid expression: contains unrecognized functions or text"
        );
        assert!(has_valid_characters("2 + banana"));
    }

    #[test]
    fn test_invalid_characters_are_rejected() {
        for expr in ["2 + 2; rm", "x = 1", "2 % 3", "1 & 1", "2 + 2?"] {
            let err = validate_expression(expr).unwrap_err();
            assert_eq!(err.kind, RejectionKind::InvalidCharacters, "expr: {}", expr);
        }
    }

    #[test]
    fn test_leftover_text() {
        assert_eq!(leftover_text("2 + banana"), "banana");
        assert_eq!(leftover_text("sqrt(2) + x"), "x");
        assert_eq!(leftover_text("sqrt(2)"), "");
    }

    #[test]
    fn test_tokens_exposed_by_erasure_are_rejected() {
        // Removing the inner "sin" exposes another one, which stays
        assert_eq!(erase_recognized_tokens("ssinin"), "sin");
        assert_eq!(leftover_text("lologg(2)"), "log");

        for expr in ["ssinin(2)", "lologg(2) + sqsqrtrt(4)"] {
            let err = validate_expression(expr).unwrap_err();
            assert_eq!(err.kind, RejectionKind::UnrecognizedTokens, "expr: {}", expr);
        }
    }

    #[test]
    fn test_natural_language_charset() {
        assert!(has_natural_language_characters("What is 10% of 5?"));
        assert!(has_natural_language_characters("the absolute value of -42!"));
        assert!(!has_natural_language_characters("10 # 5"));
        assert!(!has_natural_language_characters("a = b"));
        assert!(!has_natural_language_characters("\u{00e9}"));
    }

    #[test]
    fn test_empty_expression_fails_character_class() {
        assert!(!is_clean_math_expression(""));
    }

    proptest! {
        #[test]
        fn property_clean_expressions_are_erased_in_one_pass(expr in "[a-z0-9 +*/().^,-]{0,40}") {
            if is_clean_math_expression(&expr) {
                let once = erase_recognized_tokens(&expr);
                prop_assert_eq!(erase_recognized_tokens(&once), once);
            }
        }

        #[test]
        fn property_verdict_is_stable(expr in any::<String>()) {
            prop_assert_eq!(is_clean_math_expression(&expr), is_clean_math_expression(&expr));
        }
    }
}
