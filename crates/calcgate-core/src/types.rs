//! Core types for the admission pipeline.
//!
//! These are the values passed between the sanitizer, the security filter,
//! the normalizer and the whitelist validator. All of them are created fresh
//! per request and never outlive a single evaluation call.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Caller input after control characters were stripped and whitespace trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SanitizedInput(String);

impl SanitizedInput {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for SanitizedInput {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SanitizedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An expression ready to be handed to the evaluator.
///
/// Only produced by the normalizer (which emits canonical notation by
/// construction) or by the admission path after the whitelist validator
/// accepted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CanonicalExpression(String);

impl CanonicalExpression {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for CanonicalExpression {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for CanonicalExpression {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Why an input was turned away.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    /// Input exceeds the endpoint's length bound
    TooLong,

    /// Nothing left after sanitization
    Empty,

    /// Matched a security signature
    BlockedPattern,

    /// Fails the character-class whitelist
    InvalidCharacters,

    /// No digit and no recognized constant
    MissingNumericOperand,

    /// No translation rule matched
    UnparsableNaturalLanguage,

    /// Characters left over after function/constant erasure
    UnrecognizedTokens,

    /// The evaluator collaborator failed
    EvaluationFailure,
}

impl RejectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionKind::TooLong => "too_long",
            RejectionKind::Empty => "empty",
            RejectionKind::BlockedPattern => "blocked_pattern",
            RejectionKind::InvalidCharacters => "invalid_characters",
            RejectionKind::MissingNumericOperand => "missing_numeric_operand",
            RejectionKind::UnparsableNaturalLanguage => "unparsable_natural_language",
            RejectionKind::UnrecognizedTokens => "unrecognized_tokens",
            RejectionKind::EvaluationFailure => "evaluation_failure",
        }
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where in the pipeline the security filter ran.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Checkpoint {
    /// On the sanitized caller input, before any translation
    Input,

    /// On text produced by the normalizer
    Converted,

    /// Reduced signature subset, immediately before dispatch
    Dispatch,
}

/// Category of a security signature.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SignatureCategory {
    InstructionOverride,
    RoleAssumption,
    RoleLabel,
    CommandExecution,
    DestructiveOperation,
    Credential,
    UriScheme,
    ScriptPrefix,
    MarkupInjection,
    Jailbreak,
    NegatedCompliance,
    InstructionReplacement,
    PromptExfiltration,
}

/// A security signature that fired, with the span of text it matched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignatureMatch {
    /// Signature ID (e.g., "S1")
    pub signature_id: String,

    pub category: SignatureCategory,

    /// Checkpoint at which the match occurred
    pub checkpoint: Checkpoint,

    /// Byte offsets into the inspected text
    pub start: usize,
    pub end: usize,

    /// The matched text
    pub matched: String,
}

/// A typed admission failure.
///
/// The message is the human-readable text surfaced to callers; the kind is
/// what callers branch on.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct Rejection {
    pub kind: RejectionKind,

    pub message: String,

    /// Present when `kind` is `BlockedPattern`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureMatch>,
}

impl Rejection {
    pub fn new(kind: RejectionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            signature: None,
        }
    }

    pub fn blocked(signature: SignatureMatch, message: impl Into<String>) -> Self {
        Self {
            kind: RejectionKind::BlockedPattern,
            message: message.into(),
            signature: Some(signature),
        }
    }

    pub fn too_long(max_len: usize) -> Self {
        Self::new(
            RejectionKind::TooLong,
            format!("Input too long. Maximum length is {} characters.", max_len),
        )
    }

    /// Checkpoint of the signature that caused a `BlockedPattern` rejection.
    pub fn checkpoint(&self) -> Option<Checkpoint> {
        self.signature.as_ref().map(|s| s.checkpoint)
    }
}

/// Outcome of validating one expression.
pub type ValidationResult = Result<CanonicalExpression, Rejection>;

/// How the admission path treated an expression.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Taken as strict math notation
    StrictMath,

    /// Translated by the normalizer first
    NaturalLanguage,
}

/// An expression cleared for dispatch to the evaluator.
#[derive(Debug, Clone, Serialize)]
pub struct Admission {
    pub expression: CanonicalExpression,

    pub route: Route,

    /// ID of the translation rule that fired, for natural-language input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<&'static str>,
}
