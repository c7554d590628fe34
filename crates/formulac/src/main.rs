//! formulac - command-line front end for the formula evaluation engine.

mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use formula_engine::{evaluate, evaluate_multi_step, evaluate_with_report, Bindings, EvaluateOptions, Step, Value};
use serde::Deserialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use error::{CliError, Result};

#[derive(Parser, Debug)]
#[command(name = "formulac", version, about = "Evaluate formulas and formula chains")]
struct Cli {
    /// Increase logging verbosity. Repeat for more detail (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable ANSI colors in log output.
    #[arg(long, global = true)]
    no_color: bool,

    /// Emit results as JSON instead of plain text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a single formula.
    Eval(EvalArgs),
    /// Run an ordered list of formulas read from a JSON file.
    Steps(StepsArgs),
}

#[derive(Parser, Debug)]
struct EvalArgs {
    /// The formula text, e.g. "1 + 2 * SQRT(9)".
    formula: String,

    /// A variable binding in NAME=VALUE form. May be repeated.
    #[arg(long = "var", value_name = "NAME=VALUE")]
    vars: Vec<String>,

    /// Allow unicode identifiers in variable and function names.
    #[arg(long)]
    unicode_identifiers: bool,
}

#[derive(Parser, Debug)]
struct StepsArgs {
    /// Path to a JSON file describing initial bindings and an ordered
    /// list of steps; see `StepsFile` for the expected shape.
    path: PathBuf,
}

/// On-disk shape consumed by `formulac steps`.
#[derive(Deserialize, Debug)]
struct StepsFile {
    #[serde(default)]
    bindings: std::collections::HashMap<String, JsonValue>,
    steps: Vec<StepSpec>,
}

#[derive(Deserialize, Debug)]
struct StepSpec {
    formula: String,
    #[serde(default)]
    result_name: Option<String>,
    #[serde(default)]
    step_name: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum JsonValue {
    Number(f64),
    Boolean(bool),
    String(String),
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Number(n) => Value::Number(n),
            JsonValue::Boolean(b) => Value::Boolean(b),
            JsonValue::String(s) => Value::String(s),
        }
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Number(n) => serde_json::json!(n),
        Value::Boolean(b) => serde_json::json!(b),
        Value::String(s) => serde_json::json!(s),
    }
}

fn init_logging(verbose: u8, no_color: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("formulac={level},formula_engine={level}")));
    let subscriber = fmt::layer().with_target(false).with_ansi(!no_color);
    let _ = tracing_subscriber::registry().with(filter).with(subscriber).try_init();
}

fn parse_binding(raw: &str) -> Result<(String, Value)> {
    let (name, value) = raw.split_once('=').ok_or_else(|| CliError::BadBinding(raw.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::BadBinding(raw.to_string()));
    }
    let value = value.trim();
    let parsed = if let Ok(n) = value.parse::<f64>() {
        Value::Number(n)
    } else if let Ok(b) = value.parse::<bool>() {
        Value::Boolean(b)
    } else {
        Value::String(value.to_string())
    };
    Ok((name.to_string(), parsed))
}

fn run_eval(args: EvalArgs, json: bool) -> Result<()> {
    let mut bindings = Bindings::new();
    for raw in &args.vars {
        let (name, value) = parse_binding(raw)?;
        bindings.insert(name, value);
    }

    let options = EvaluateOptions { allow_unicode_identifiers: args.unicode_identifiers, ..EvaluateOptions::default() };

    if json {
        let report = evaluate_with_report(&args.formula, &bindings, &options)?;
        println!(
            "{}",
            serde_json::json!({
                "value": value_to_json(&report.value),
                "execution_nanos": report.execution_nanos,
                "warnings": report.warnings.iter().map(|w| w.message.clone()).collect::<Vec<_>>(),
            })
        );
    } else {
        let value = evaluate(&args.formula, &bindings, &options)?;
        println!("{value}");
    }
    Ok(())
}

fn run_steps(args: StepsArgs, json: bool) -> Result<()> {
    let contents = std::fs::read_to_string(&args.path).map_err(|source| CliError::Io {
        path: args.path.display().to_string(),
        source,
    })?;
    let file: StepsFile = serde_json::from_str(&contents)?;

    let mut bindings = Bindings::new();
    for (name, value) in file.bindings {
        bindings.insert(name, value.into());
    }

    let steps: Vec<Step> = file
        .steps
        .into_iter()
        .map(|spec| {
            let mut step = Step::new(spec.formula);
            if let Some(name) = spec.result_name {
                step = step.with_result_name(name);
            }
            if let Some(name) = spec.step_name {
                step = step.with_step_name(name);
            }
            step
        })
        .collect();

    let options = EvaluateOptions::default();
    let result = evaluate_multi_step(bindings, steps, &options)?;

    if json {
        let step_outcomes: Vec<_> = result
            .steps
            .iter()
            .map(|outcome| {
                serde_json::json!({
                    "index": outcome.index,
                    "step_name": outcome.step_name,
                    "value": value_to_json(&outcome.value),
                    "duration_micros": outcome.duration.as_micros() as u64,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::json!({
                "final_value": value_to_json(&result.final_value),
                "steps": step_outcomes,
                "execution_nanos": result.execution_nanos,
            })
        );
    } else {
        for outcome in &result.steps {
            let label = outcome.step_name.as_deref().unwrap_or("step");
            println!("[{}] {label}: {}", outcome.index, outcome.value);
        }
        println!("{}", result.final_value);
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Eval(args) => run_eval(args, cli.json),
        Commands::Steps(args) => run_steps(args, cli.json),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.no_color);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_eval_with_variable_bindings() {
        let cli = Cli::parse_from(["formulac", "eval", "a + b", "--var", "a=3", "--var", "b=4"]);
        match cli.command {
            Commands::Eval(args) => {
                assert_eq!(args.formula, "a + b");
                assert_eq!(args.vars, vec!["a=3", "b=4"]);
            }
            _ => panic!("expected Eval"),
        }
    }

    #[test]
    fn parses_steps_with_json_flag() {
        let cli = Cli::parse_from(["formulac", "--json", "steps", "plan.json"]);
        assert!(cli.json);
        match cli.command {
            Commands::Steps(args) => assert_eq!(args.path, PathBuf::from("plan.json")),
            _ => panic!("expected Steps"),
        }
    }

    #[test]
    fn binding_parser_infers_number_boolean_and_string() {
        assert_eq!(parse_binding("a=3").unwrap(), ("a".to_string(), Value::Number(3.0)));
        assert_eq!(parse_binding("flag=true").unwrap(), ("flag".to_string(), Value::Boolean(true)));
        assert_eq!(parse_binding("name=hello").unwrap(), ("name".to_string(), Value::String("hello".to_string())));
    }

    #[test]
    fn binding_parser_rejects_missing_equals() {
        assert!(parse_binding("noequals").is_err());
    }
}
