//! The calculator service.
//!
//! Exposes the two admission entry points plus a health check, with serde
//! request/response types shaped for an RPC layer. Every rejection and
//! evaluator failure surfaces as a [`ServiceError`] carrying one message and
//! its kind.

use std::sync::Arc;

use calcgate_core::{Admission, AdmissionPolicy, Rejection, RejectionKind, Route};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, RuntimeConfig};
use crate::evaluator::{render_value, CommandEvaluator, Evaluator, EvaluatorError};

/// Request for natural-language conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRequest {
    pub input: String,
}

/// A canonical expression produced from natural language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResponse {
    pub expression: String,
}

/// Request for evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    pub expression: String,

    /// Route phrase-like input through the normalizer first
    #[serde(default)]
    pub allow_natural_language: bool,
}

impl CalculateRequest {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            allow_natural_language: false,
        }
    }

    pub fn with_natural_language(mut self, allow: bool) -> Self {
        self.allow_natural_language = allow;
        self
    }
}

/// The evaluator's result as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateResponse {
    pub result: String,
}

/// Errors returned to callers.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Rejected(#[from] Rejection),

    #[error("{0}")]
    Evaluation(String),
}

/// Serializable error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub kind: RejectionKind,
}

impl ServiceError {
    pub fn kind(&self) -> RejectionKind {
        match self {
            ServiceError::Rejected(rejection) => rejection.kind,
            ServiceError::Evaluation(_) => RejectionKind::EvaluationFailure,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            message: self.to_string(),
            kind: self.kind(),
        }
    }

    /// Whether admission refused the input, as opposed to the evaluator failing.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ServiceError::Rejected(_))
    }
}

impl From<EvaluatorError> for ServiceError {
    fn from(err: EvaluatorError) -> Self {
        let message = err.to_string();
        if message.trim().is_empty() {
            ServiceError::Evaluation("Failed to evaluate expression".to_string())
        } else {
            ServiceError::Evaluation(message)
        }
    }
}

/// Admission pipeline in front of an injected evaluator.
///
/// Stateless apart from its configuration; share it behind an `Arc` and call
/// it from as many tasks as needed.
pub struct Calculator {
    evaluator: Arc<dyn Evaluator>,
    policy: AdmissionPolicy,
}

impl Calculator {
    pub fn new(evaluator: Arc<dyn Evaluator>, policy: AdmissionPolicy) -> Self {
        Self { evaluator, policy }
    }

    /// Build a calculator backed by the configured external evaluator.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let evaluator = CommandEvaluator::from_config(&config.evaluator)?;
        tracing::debug!(
            evaluator = evaluator.name(),
            timeout = ?evaluator.timeout(),
            prelude = evaluator.prelude().is_some(),
            "Evaluator configured"
        );

        Ok(Self::new(Arc::new(evaluator), config.admission))
    }

    pub fn policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    pub fn health_check(&self) -> &'static str {
        "OK"
    }

    pub fn parse_natural_language(
        &self,
        request: &ParseRequest,
    ) -> Result<ParseResponse, ServiceError> {
        match calcgate_core::parse_natural_language_with(&request.input, &self.policy) {
            Ok(translation) => {
                tracing::debug!(
                    rule = translation.rule_id,
                    expression = %translation.expression,
                    "Natural language converted"
                );
                Ok(ParseResponse {
                    expression: translation.expression.into_string(),
                })
            }
            Err(rejection) => {
                log_rejection(&rejection);
                Err(rejection.into())
            }
        }
    }

    /// Run the admission path of [`Calculator::calculate`] without evaluating.
    pub fn admit(&self, request: &CalculateRequest) -> Result<Admission, ServiceError> {
        let admitted = calcgate_core::admit_expression_with(
            &request.expression,
            request.allow_natural_language,
            &self.policy,
        );

        match admitted {
            Ok(admission) => {
                tracing::debug!(
                    route = ?admission.route,
                    rule = ?admission.rule_id,
                    expression = %admission.expression,
                    "Expression admitted"
                );
                Ok(admission)
            }
            Err(rejection) => {
                log_rejection(&rejection);
                Err(rejection.into())
            }
        }
    }

    pub async fn calculate(
        &self,
        request: &CalculateRequest,
    ) -> Result<CalculateResponse, ServiceError> {
        let admission = self.admit(request)?;

        let value = self
            .evaluator
            .evaluate(admission.expression.as_str())
            .await
            .map_err(|e| {
                tracing::warn!(
                    evaluator = self.evaluator.name(),
                    natural_language = admission.route == Route::NaturalLanguage,
                    error = %e,
                    "Evaluation failed"
                );
                ServiceError::from(e)
            })?;

        Ok(CalculateResponse {
            result: render_value(&value),
        })
    }
}

fn log_rejection(rejection: &Rejection) {
    tracing::warn!(
        kind = %rejection.kind,
        signature = rejection.signature.as_ref().map(|s| s.signature_id.as_str()),
        checkpoint = ?rejection.checkpoint(),
        "Input rejected"
    );
}
