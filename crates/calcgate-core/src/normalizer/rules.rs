//! The ordered translation rule table.
//!
//! Rules are tried strictly in table order and the first rule that applies
//! wins. Several rules overlap structurally ("log of 5" is also a valid
//! natural-log phrase), so order is part of the grammar. Word-led rules
//! anchor on a leading word boundary so "cosine" is never read as "sine".

use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// Decimal literal operand.
const NUMBER: &str = r"([0-9]+(?:\.[0-9]+)?)";

/// A (pattern, converter) pair.
pub struct TranslationRule {
    /// Stable identifier (e.g., "N8")
    pub id: &'static str,

    pub name: &'static str,

    pattern: Regex,

    /// Words that disqualify a match when they directly precede it
    unless_preceded_by: &'static [&'static str],

    convert: fn(&Captures) -> String,
}

impl TranslationRule {
    fn new(
        id: &'static str,
        name: &'static str,
        template: &str,
        convert: fn(&Captures) -> String,
    ) -> Self {
        Self {
            id,
            name,
            pattern: Regex::new(&template.replace("{n}", NUMBER)).unwrap(),
            unless_preceded_by: &[],
            convert,
        }
    }

    fn unless_preceded_by(mut self, words: &'static [&'static str]) -> Self {
        self.unless_preceded_by = words;
        self
    }

    /// Convert the first qualifying match in `text`, if any.
    pub(crate) fn apply(&self, text: &str) -> Option<String> {
        self.pattern
            .captures_iter(text)
            .find(|caps| {
                let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
                !self.is_disqualified(&text[..start])
            })
            .map(|caps| (self.convert)(&caps))
    }

    fn is_disqualified(&self, before: &str) -> bool {
        if self.unless_preceded_by.is_empty() {
            return false;
        }

        let previous_word = before
            .trim_end()
            .rsplit(|c: char| !c.is_alphanumeric())
            .next()
            .unwrap_or("");

        self.unless_preceded_by
            .iter()
            .any(|word| previous_word.eq_ignore_ascii_case(word))
    }
}

fn percent_of(c: &Captures) -> String {
    format!("({} / 100) * {}", &c[1], &c[2])
}

lazy_static! {
    pub(crate) static ref RULES: Vec<TranslationRule> = vec![
        TranslationRule::new(
            "N1",
            "percent of",
            r"(?i){n}\s*%\s*(?:of|from)\s*{n}",
            percent_of,
        ),
        TranslationRule::new("N2", "percent", r"(?i){n}\s*%\s*{n}", percent_of),
        TranslationRule::new(
            "N3",
            "addition",
            r"(?i){n}\s+(?:plus|added\s+to|and)\s+{n}",
            |c| format!("{} + {}", &c[1], &c[2]),
        ),
        TranslationRule::new(
            "N4",
            "subtraction",
            r"(?i){n}\s+(?:minus|subtract|subtracted\s+from)\s+{n}",
            |c| format!("{} - {}", &c[1], &c[2]),
        ),
        TranslationRule::new(
            "N5",
            "multiplication",
            r"(?i){n}\s+(?:times|multiplied\s+by|multiply)\s+{n}",
            |c| format!("{} * {}", &c[1], &c[2]),
        ),
        TranslationRule::new(
            "N6",
            "division",
            r"(?i){n}\s+(?:divided\s+by|divide|over)\s+{n}",
            |c| format!("{} / {}", &c[1], &c[2]),
        ),
        TranslationRule::new(
            "N7",
            "power",
            r"(?i){n}\s+(?:to\s+the\s+power\s+of|raised\s+to|power)\s+{n}",
            |c| format!("{} ^ {}", &c[1], &c[2]),
        ),
        TranslationRule::new(
            "N8",
            "square root",
            r"(?i)\b(?:the\s+)?(?:square\s+)?root\s+of\s+{n}",
            |c| format!("sqrt({})", &c[1]),
        )
        .unless_preceded_by(&["cube"]),
        TranslationRule::new(
            "N9",
            "cube root",
            r"(?i)\b(?:the\s+)?cube\s+root\s+of\s+{n}",
            |c| format!("cbrt({})", &c[1]),
        ),
        TranslationRule::new(
            "N10",
            "sine",
            r"(?i)\b(?:the\s+)?(?:sine|sin)\s+of\s+{n}",
            |c| format!("sin({})", &c[1]),
        ),
        TranslationRule::new(
            "N11",
            "cosine",
            r"(?i)\b(?:the\s+)?(?:cosine|cos)\s+of\s+{n}",
            |c| format!("cos({})", &c[1]),
        ),
        TranslationRule::new(
            "N12",
            "tangent",
            r"(?i)\b(?:the\s+)?(?:tangent|tan)\s+of\s+{n}",
            |c| format!("tan({})", &c[1]),
        ),
        TranslationRule::new(
            "N13",
            "logarithm",
            r"(?i)\b(?:the\s+)?(?:log|logarithm)\s+(?:of\s+)?{n}",
            |c| format!("log({})", &c[1]),
        ),
        // Shadowed by N13 for every phrase ending in "log [of] N"
        TranslationRule::new(
            "N14",
            "natural logarithm",
            r"(?i)\b(?:the\s+)?(?:natural\s+)?log\s+(?:of\s+)?{n}",
            |c| format!("ln({})", &c[1]),
        ),
        TranslationRule::new(
            "N15",
            "absolute value (negative)",
            r"(?i)\b(?:the\s+)?(?:absolute\s+value|abs)\s+(?:of\s+)?-{n}",
            |c| format!("abs(-{})", &c[1]),
        ),
        TranslationRule::new(
            "N16",
            "absolute value",
            r"(?i)\b(?:the\s+)?(?:absolute\s+value|abs)\s+(?:of\s+)?{n}",
            |c| format!("abs({})", &c[1]),
        ),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str) -> &'static TranslationRule {
        RULES.iter().find(|r| r.id == id).unwrap()
    }

    #[test]
    fn test_table_order() {
        let ids: Vec<&str> = RULES.iter().map(|r| r.id).collect();
        let expected: Vec<String> = (1..=16).map(|i| format!("N{}", i)).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_square_root_yields_to_cube() {
        assert_eq!(rule("N8").apply("cube root of 27"), None);
        assert_eq!(rule("N8").apply("the CUBE  root of 27"), None);
        assert_eq!(rule("N8").apply("root of 9").as_deref(), Some("sqrt(9)"));
    }

    #[test]
    fn test_disqualified_match_does_not_hide_later_match() {
        assert_eq!(
            rule("N8").apply("cube root of 8 or square root of 9").as_deref(),
            Some("sqrt(9)")
        );
    }

    #[test]
    fn test_sine_needs_word_boundary() {
        assert_eq!(rule("N10").apply("cosine of 60"), None);
        assert_eq!(rule("N10").apply("sin of 60").as_deref(), Some("sin(60)"));
    }

    #[test]
    fn test_operands_keep_decimal_text() {
        assert_eq!(
            rule("N5").apply("2.50 times 4").as_deref(),
            Some("2.50 * 4")
        );
    }

    #[test]
    fn test_only_ascii_digits_are_operands() {
        // Arabic-Indic digits never become operands
        assert_eq!(rule("N3").apply("\u{0661} plus \u{0662}"), None);
    }
}
