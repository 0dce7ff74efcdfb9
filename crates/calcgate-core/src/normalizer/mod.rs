//! Natural-language normalizer.
//!
//! Rewrites a constrained grammar of arithmetic phrases into canonical
//! notation. The grammar is the ordered table in [`rules`]; the first rule
//! that applies produces the whole output, and text outside the matched
//! span is discarded.

mod rules;

pub use rules::TranslationRule;

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::CanonicalExpression;
use rules::RULES;

lazy_static! {
    static ref DIGIT: Regex = Regex::new(r"[0-9]").unwrap();
    static ref NAMED_CONSTANT: Regex = Regex::new(r"(?i)\b(pi|e)\b").unwrap();
}

/// A successful translation and the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub rule_id: &'static str,
    pub rule_name: &'static str,
    pub expression: CanonicalExpression,
}

/// Whether `text` has a digit or references `pi`/`e`.
pub fn contains_numeric_operand(text: &str) -> bool {
    DIGIT.is_match(text) || NAMED_CONSTANT.is_match(text)
}

/// Translate `sanitized` with the first applicable rule.
pub fn translate(sanitized: &str) -> Option<Translation> {
    let text = sanitized.trim();

    RULES.iter().find_map(|rule| {
        rule.apply(text).map(|expression| Translation {
            rule_id: rule.id,
            rule_name: rule.name,
            expression: CanonicalExpression::new(expression),
        })
    })
}

/// Translate `sanitized` into canonical notation, or `None` if no rule applies.
pub fn convert_to_expression(sanitized: &str) -> Option<CanonicalExpression> {
    translate(sanitized).map(|t| t.expression)
}

/// The translation rules, in priority order.
pub fn rules() -> impl Iterator<Item = &'static TranslationRule> {
    RULES.iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(phrase: &str) -> Option<String> {
        convert_to_expression(phrase).map(CanonicalExpression::into_string)
    }

    #[test]
    fn test_rule_table_pairs() {
        let pairs = [
            ("10% of 5", "(10 / 100) * 5"),
            ("15 % from 80", "(15 / 100) * 80"),
            ("20% 50", "(20 / 100) * 50"),
            ("25 plus 17", "25 + 17"),
            ("3 added to 4", "3 + 4"),
            ("6 and 7", "6 + 7"),
            ("10 minus 4", "10 - 4"),
            ("10 subtract 4", "10 - 4"),
            ("4 subtracted from 10", "4 - 10"),
            ("6 times 7", "6 * 7"),
            ("6 multiplied by 7", "6 * 7"),
            ("6 multiply 7", "6 * 7"),
            ("9 divided by 3", "9 / 3"),
            ("9 divide 3", "9 / 3"),
            ("9 over 3", "9 / 3"),
            ("2 to the power of 8", "2 ^ 8"),
            ("2 raised to 8", "2 ^ 8"),
            ("2 power 8", "2 ^ 8"),
            ("square root of 144", "sqrt(144)"),
            ("the root of 81", "sqrt(81)"),
            ("the cube root of 27", "cbrt(27)"),
            ("the sine of 30", "sin(30)"),
            ("sin of 30", "sin(30)"),
            ("cosine of 60", "cos(60)"),
            ("cos of 60", "cos(60)"),
            ("the tangent of 45", "tan(45)"),
            ("tan of 45", "tan(45)"),
            ("log of 100", "log(100)"),
            ("the logarithm 1000", "log(1000)"),
            ("the absolute value of -42", "abs(-42)"),
            ("abs -7.5", "abs(-7.5)"),
            ("absolute value 9", "abs(9)"),
        ];

        for (phrase, expected) in pairs {
            assert_eq!(convert(phrase).as_deref(), Some(expected), "phrase: {}", phrase);
        }
    }

    #[test]
    fn test_log_takes_priority_over_natural_log() {
        // Rule order resolves "log" to base 10 before the natural-log rule
        let t = translate("the natural log of 10").unwrap();
        assert_eq!(t.rule_id, "N13");
        assert_eq!(t.expression, "log(10)");
    }

    #[test]
    fn test_first_match_wins_across_rules() {
        // Both percentage and addition apply; percentage is earlier
        let t = translate("10% of 5 plus 2").unwrap();
        assert_eq!(t.rule_id, "N1");
        assert_eq!(t.expression, "(10 / 100) * 5");
    }

    #[test]
    fn test_surrounding_words_are_discarded() {
        assert_eq!(convert("what is 25 plus 17?").as_deref(), Some("25 + 17"));
        assert_eq!(convert("  PLEASE compute 3 TIMES 4  ").as_deref(), Some("3 * 4"));
    }

    #[test]
    fn test_no_rule_matches() {
        assert_eq!(convert("hello 5"), None);
        assert_eq!(convert("plus 5"), None);
        assert_eq!(convert(""), None);
    }

    #[test]
    fn test_translation_reports_rule() {
        let t = translate("square root of 144").unwrap();
        assert_eq!(t.rule_id, "N8");
        assert_eq!(t.rule_name, "square root");
    }

    #[test]
    fn test_numeric_operand_detection() {
        assert!(contains_numeric_operand("what is 5"));
        assert!(contains_numeric_operand("pi over two"));
        assert!(contains_numeric_operand("E squared"));
        assert!(!contains_numeric_operand("ten plus eleven"));
        assert!(!contains_numeric_operand("pie"));
    }

    #[test]
    fn test_rules_listing() {
        assert_eq!(rules().count(), 16);
    }
}
