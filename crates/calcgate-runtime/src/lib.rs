//! calcgate-runtime: the service layer around the admission pipeline.
//!
//! Wires [`calcgate_core`] to an injected [`Evaluator`], applies the
//! configured evaluator timeout, and turns rejections and evaluator failures
//! into a single [`ServiceError`].
//!
//! ```no_run
//! use calcgate_runtime::{CalculateRequest, Calculator, RuntimeConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let calculator = Calculator::from_config(&RuntimeConfig::default())?;
//! let request = CalculateRequest::new("square root of 144").with_natural_language(true);
//! let response = calculator.calculate(&request).await?;
//! println!("{}", response.result);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod evaluator;
pub mod service;

pub use config::{ConfigError, EvaluatorConfig, RuntimeConfig};
pub use evaluator::{render_value, CommandEvaluator, Evaluator, EvaluatorError};
pub use service::{
    CalculateRequest, CalculateResponse, Calculator, ErrorBody, ParseRequest, ParseResponse,
    ServiceError,
};
