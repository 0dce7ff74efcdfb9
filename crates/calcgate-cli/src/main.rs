//! calcgate CLI
//!
//! Command-line front end for the expression admission pipeline.
//!
//! ## Usage
//!
//! ```bash
//! # Convert a phrase to canonical notation
//! calcgate parse "square root of 144"
//!
//! # Run admission only and report how the input was treated
//! calcgate check "25 plus 17" --natural --format json
//!
//! # Admit and evaluate with the configured evaluator (bc -l by default)
//! echo "2 + 2 * 3" | calcgate calculate
//!
//! # Print the effective configuration
//! calcgate --config calcgate.yaml config show
//! ```
//!
//! ## Exit Codes
//!
//! - 0: Success
//! - 1: Evaluation failed
//! - 2: Rejected by admission
//! - 3: Error

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use calcgate_core::{Admission, Route, SignatureMatch};
use calcgate_runtime::{
    CalculateRequest, Calculator, ParseRequest, RuntimeConfig, ServiceError,
};

/// calcgate: admission pipeline for calculator expressions
#[derive(Parser)]
#[command(name = "calcgate")]
#[command(version)]
#[command(about = "Validate, translate and evaluate calculator expressions", long_about = None)]
struct Cli {
    /// Path to a configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a natural-language phrase into a canonical expression
    Parse {
        /// The phrase (reads from stdin if not provided)
        input: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Run admission without evaluating
    Check {
        /// The expression (reads from stdin if not provided)
        expression: Option<String>,

        /// Accept natural-language phrases
        #[arg(short, long)]
        natural: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Admit and evaluate an expression
    Calculate {
        /// The expression (reads from stdin if not provided)
        expression: Option<String>,

        /// Accept natural-language phrases
        #[arg(short, long)]
        natural: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    match run() {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(3)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Parse { input, format } => parse_command(&config, input, format),
        Commands::Check {
            expression,
            natural,
            format,
        } => check_command(&config, expression, natural, format),
        Commands::Calculate {
            expression,
            natural,
            format,
        } => calculate_command(&config, expression, natural, format),
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => show_config(&config, format),
        },
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<RuntimeConfig> {
    match path {
        Some(path) => RuntimeConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path)),
        None => Ok(RuntimeConfig::default()),
    }
}

fn read_input(arg: Option<String>) -> Result<String> {
    match arg {
        Some(text) => Ok(text),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            // Drop the trailing newline a pipe adds; admission trims the rest
            Ok(buffer.trim_end_matches(['\r', '\n']).to_string())
        }
    }
}

fn parse_command(
    config: &RuntimeConfig,
    input: Option<String>,
    format: OutputFormat,
) -> Result<ExitCode> {
    let calculator = Calculator::from_config(config).context("Invalid configuration")?;
    let request = ParseRequest {
        input: read_input(input)?,
    };

    match calculator.parse_natural_language(&request) {
        Ok(response) => {
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
                OutputFormat::Text => println!("{}", response.expression),
            }
            Ok(ExitCode::from(0))
        }
        Err(e) => report_error(&e, format),
    }
}

fn check_command(
    config: &RuntimeConfig,
    expression: Option<String>,
    natural: bool,
    format: OutputFormat,
) -> Result<ExitCode> {
    let calculator = Calculator::from_config(config).context("Invalid configuration")?;
    let request = CalculateRequest::new(read_input(expression)?).with_natural_language(natural);

    match calculator.admit(&request) {
        Ok(admission) => {
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&admission)?),
                OutputFormat::Text => print_admission(&admission),
            }
            Ok(ExitCode::from(0))
        }
        Err(e) => report_error(&e, format),
    }
}

fn calculate_command(
    config: &RuntimeConfig,
    expression: Option<String>,
    natural: bool,
    format: OutputFormat,
) -> Result<ExitCode> {
    let calculator = Calculator::from_config(config).context("Invalid configuration")?;
    let request = CalculateRequest::new(read_input(expression)?).with_natural_language(natural);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    match runtime.block_on(calculator.calculate(&request)) {
        Ok(response) => {
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
                OutputFormat::Text => println!("{}", response.result),
            }
            Ok(ExitCode::from(0))
        }
        Err(e) => report_error(&e, format),
    }
}

fn show_config(config: &RuntimeConfig, format: OutputFormat) -> Result<ExitCode> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Text => print!("{}", config.to_yaml()?),
    }
    Ok(ExitCode::from(0))
}

fn print_admission(admission: &Admission) {
    println!("ADMITTED");
    println!();
    println!("Route: {}", route_label(admission.route));
    if let Some(rule) = admission.rule_id {
        println!("Rule: {}", rule);
    }
    println!("Expression: {}", admission.expression);
}

fn route_label(route: Route) -> &'static str {
    match route {
        Route::StrictMath => "strict math",
        Route::NaturalLanguage => "natural language",
    }
}

fn report_error(error: &ServiceError, format: OutputFormat) -> Result<ExitCode> {
    match format {
        OutputFormat::Json => match error {
            ServiceError::Rejected(rejection) => {
                println!("{}", serde_json::to_string_pretty(rejection)?)
            }
            ServiceError::Evaluation(_) => {
                println!("{}", serde_json::to_string_pretty(&error.body())?)
            }
        },
        OutputFormat::Text => {
            if error.is_rejection() {
                println!("REJECTED");
            } else {
                println!("FAILED");
            }
            println!();
            println!("Kind: {}", error.kind());
            println!("Message: {}", error);

            if let ServiceError::Rejected(rejection) = error {
                if let Some(signature) = &rejection.signature {
                    println!("Signature: {}", describe_signature(signature));
                }
            }
        }
    }

    Ok(ExitCode::from(exit_status(error)))
}

fn describe_signature(signature: &SignatureMatch) -> String {
    let description = calcgate_core::security::signature(&signature.signature_id)
        .map(|s| s.description)
        .unwrap_or("unknown signature");
    format!(
        "{} ({}) matched {:?} at {}..{}",
        signature.signature_id, description, signature.matched, signature.start, signature.end
    )
}

fn exit_status(error: &ServiceError) -> u8 {
    if error.is_rejection() {
        2
    } else {
        1
    }
}
