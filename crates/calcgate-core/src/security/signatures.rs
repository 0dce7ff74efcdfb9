//! The fixed signature table.
//!
//! Signatures are evaluated in table order and are independent of each other:
//! any single match is enough to reject. Word signatures anchor on a leading
//! word boundary only, so `running` is caught by the `run` verb.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::SignatureCategory;

/// A single security signature.
pub struct Signature {
    /// Stable identifier (e.g., "S1")
    pub id: &'static str,

    pub category: SignatureCategory,

    /// Short human-readable description
    pub description: &'static str,

    pub(crate) pattern: Regex,
}

impl Signature {
    fn new(
        id: &'static str,
        category: SignatureCategory,
        description: &'static str,
        pattern: &str,
    ) -> Self {
        Self {
            id,
            category,
            description,
            pattern: Regex::new(pattern).unwrap(),
        }
    }
}

/// Signatures re-checked right before dispatch to the evaluator.
pub(crate) const DISPATCH_SIGNATURE_IDS: &[&str] = &["S1", "S2", "S3", "S4"];

lazy_static! {
    pub(crate) static ref SIGNATURES: Vec<Signature> = vec![
        Signature::new(
            "S1",
            SignatureCategory::InstructionOverride,
            "Instruction override",
            r"(?i)\b(ignore|forget|disregard)\s+(previous|prior|above|all|the)\s+(instructions?|commands?|prompts?|rules?|directives?)",
        ),
        Signature::new(
            "S2",
            SignatureCategory::RoleAssumption,
            "Role assumption",
            r"(?i)\b(you\s+are|you're|act\s+as|pretend\s+to\s+be|roleplay\s+as)",
        ),
        Signature::new(
            "S3",
            SignatureCategory::RoleLabel,
            "Role label prefix",
            r"(?i)\b(system|assistant|user|admin|root):",
        ),
        Signature::new(
            "S4",
            SignatureCategory::CommandExecution,
            "Command or execution verb",
            r"(?i)\b(execute|run|eval|exec|system|shell|command|script)",
        ),
        Signature::new(
            "S5",
            SignatureCategory::DestructiveOperation,
            "Destructive operation verb",
            r"(?i)\b(delete|drop|remove|clear|truncate|alter|update|insert|create)\s+",
        ),
        Signature::new(
            "S6",
            SignatureCategory::Credential,
            "Credential-related noun",
            r"(?i)\b(password|token|key|secret|api|auth|credential)",
        ),
        Signature::new(
            "S7",
            SignatureCategory::UriScheme,
            "URI scheme",
            r"(?i)\b(http|https|ftp|file|data)://",
        ),
        Signature::new(
            "S8",
            SignatureCategory::ScriptPrefix,
            "Scripting-language prefix",
            r"(?i)\b(javascript|python|bash|shell|sql|script):",
        ),
        Signature::new(
            "S9",
            SignatureCategory::MarkupInjection,
            "Markup injection tag",
            r"(?i)<\s*(script|iframe|object|embed|link|style)",
        ),
        Signature::new(
            "S10",
            SignatureCategory::Jailbreak,
            "Jailbreak vocabulary",
            r"(?i)\b(jailbreak|override|bypass|hack|exploit)",
        ),
        Signature::new(
            "S11",
            SignatureCategory::NegatedCompliance,
            "Negated compliance",
            r"(?i)\b(do\s+not|don't|never)\s+(follow|obey|listen|respect)",
        ),
        Signature::new(
            "S12",
            SignatureCategory::InstructionReplacement,
            "Instruction replacement",
            r"(?i)\b(new\s+instructions?|override|replace)\s+(instructions?|rules?|system)",
        ),
        Signature::new(
            "S13",
            SignatureCategory::PromptExfiltration,
            "Prompt exfiltration (dump)",
            r"(?i)\b(print|output|return|display)\s+(everything|all|the\s+prompt|your\s+instructions)",
        ),
        Signature::new(
            "S14",
            SignatureCategory::PromptExfiltration,
            "Prompt exfiltration (reveal)",
            r"(?i)\b(what\s+are|tell\s+me|show\s+me|reveal)\s+(your|the)\s+(instructions?|prompt|system|rules?)",
        ),
    ];
}
