//! The evaluator capability.
//!
//! The arbitrary-precision evaluator is an opaque collaborator: it receives
//! an admitted expression and returns a value or fails. Nothing here knows
//! any math.

use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::{ChildStdin, Command};

use crate::config::{ConfigError, EvaluatorConfig};

/// Errors from an evaluator.
#[derive(Error, Debug)]
pub enum EvaluatorError {
    /// The evaluator rejected the expression; the message is passed through
    #[error("{0}")]
    Failed(String),

    #[error("Failed to start evaluator `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Evaluator I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Evaluation timed out after {0:?}")]
    Timeout(Duration),
}

/// Something that evaluates admitted expressions.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Evaluate `expression`. Called once per request, never retried.
    async fn evaluate(&self, expression: &str) -> Result<Value, EvaluatorError>;

    /// Name for logs.
    fn name(&self) -> &str;
}

/// Render an evaluator result as the text returned to callers.
///
/// Strings and numbers use their plain text form; any other shape is
/// serialized as JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Definitions fed to `bc -l` ahead of every expression.
///
/// `bc` only knows `sqrt` and the one-letter math library (`s`, `c`, `a`,
/// `l`, `e`), and reads unknown names as zero, so every recognized function
/// and constant is defined here.
pub const BC_PRELUDE: &str = "\
pi=4*a(1)
e=e(1)
define sin(x){return(s(x))}
define cos(x){return(c(x))}
define tan(x){return(s(x)/c(x))}
define ln(x){return(l(x))}
define log(x){return(l(x)/l(10))}
define abs(x){if(x<0)return(-x);return(x)}
define cbrt(x){if(x==0)return(0);if(x<0)return(-e(l(-x)/3));return(e(l(x)/3))}
define floor(x){auto o,r;o=scale;scale=0;r=x/1;scale=o;if(r>x)r=r-1;return(r)}
define ceil(x){auto o,r;o=scale;scale=0;r=x/1;scale=o;if(r<x)r=r+1;return(r)}
";

/// Evaluator backed by an external program.
///
/// The prelude (if any) and the expression are written to the program's
/// stdin, each followed by a newline; the result is read from stdout.
/// Anything on stderr, or a non-zero exit, is a failure.
pub struct CommandEvaluator {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    prelude: Option<String>,
    lowercase_input: bool,
}

impl CommandEvaluator {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
            prelude: None,
            lowercase_input: false,
        }
    }

    /// Build from configuration; `bc` gets its prelude and lower-cased input.
    pub fn from_config(config: &EvaluatorConfig) -> Result<Self, ConfigError> {
        let program = config
            .program()
            .ok_or_else(|| ConfigError::Invalid("evaluator.command must name a program".to_string()))?;

        let mut evaluator = Self::new(program, config.args().to_vec(), config.timeout)
            .lowercase_input(config.is_bc());
        if let Some(prelude) = config.effective_prelude() {
            evaluator = evaluator.with_prelude(prelude);
        }
        Ok(evaluator)
    }

    /// Definitions written before each expression.
    pub fn with_prelude(mut self, prelude: impl Into<String>) -> Self {
        let prelude = prelude.into();
        self.prelude = if prelude.trim().is_empty() {
            None
        } else {
            Some(prelude)
        };
        self
    }

    /// Lower-case expressions before sending them; `bc` reads capitals as hex digits.
    pub fn lowercase_input(mut self, enabled: bool) -> Self {
        self.lowercase_input = enabled;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn prelude(&self) -> Option<&str> {
        self.prelude.as_deref()
    }

    async fn run(&self, expression: &str) -> Result<Value, EvaluatorError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EvaluatorError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut input = String::new();
        if let Some(prelude) = &self.prelude {
            input.push_str(prelude.trim_end());
            input.push('\n');
        }
        if self.lowercase_input {
            input.push_str(&expression.to_lowercase());
        } else {
            input.push_str(expression);
        }
        input.push('\n');

        if let Some(stdin) = child.stdin.take() {
            // A program that exits without reading its input is judged by its output
            if let Err(e) = write_input(stdin, &input).await {
                if e.kind() != ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        let output = child.wait_with_output().await?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();

        if !output.status.success() || !stderr.is_empty() {
            let message = if stderr.is_empty() {
                format!("Evaluator exited with {}", output.status)
            } else {
                stderr.to_string()
            };
            return Err(EvaluatorError::Failed(message));
        }

        parse_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Write the input and close stdin so the program sees EOF.
async fn write_input(mut stdin: ChildStdin, input: &str) -> std::io::Result<()> {
    stdin.write_all(input.as_bytes()).await?;
    stdin.shutdown().await
}

/// Interpret program output.
///
/// Backslash-newline continuations are joined. Output becomes a JSON number
/// only when the number prints back identically, so long results are never
/// rounded through a float.
fn parse_output(stdout: &str) -> Result<Value, EvaluatorError> {
    let joined = stdout.replace("\\\n", "");
    let text = joined.trim();

    if text.is_empty() {
        return Err(EvaluatorError::Failed(
            "Evaluator produced no output".to_string(),
        ));
    }

    match text.parse::<serde_json::Number>() {
        Ok(number) if number.to_string() == text => Ok(Value::Number(number)),
        _ => Ok(Value::String(text.to_string())),
    }
}

#[async_trait]
impl Evaluator for CommandEvaluator {
    async fn evaluate(&self, expression: &str) -> Result<Value, EvaluatorError> {
        match tokio::time::timeout(self.timeout, self.run(expression)).await {
            Ok(result) => result,
            Err(_) => Err(EvaluatorError::Timeout(self.timeout)),
        }
    }

    fn name(&self) -> &str {
        &self.program
    }
}
