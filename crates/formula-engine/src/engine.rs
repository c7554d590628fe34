//! The public evaluation API: single-formula `evaluate` and the
//! multi-step orchestrator `evaluate_multi_step`.

use formula_lex::{Lexer, LexError, LexerContext};
use formula_util::codes;

use crate::error::{EngineError, EngineErrorKind};
use crate::options::EvaluateOptions;
use crate::step::{EvaluationReport, MultiStepResult, Step, StepError, StepOutcome};
use formula_eval::{Bindings, Value};

fn lexer_context(options: &EvaluateOptions) -> LexerContext {
    LexerContext {
        allow_unicode_identifiers: options.allow_unicode_identifiers,
        max_token_length: options.limits.max_token_length,
        ..LexerContext::default()
    }
}

/// Lex, parse, and evaluate a single formula against `bindings`.
#[tracing::instrument(skip(bindings, options), fields(formula_len = formula.len()))]
pub fn evaluate(formula: &str, bindings: &Bindings, options: &EvaluateOptions) -> Result<Value, EngineError> {
    if formula.len() > options.limits.max_formula_length {
        return Err(LexError::FormulaTooLong { actual: formula.len(), limit: options.limits.max_formula_length }.into());
    }

    let tokens = Lexer::new(formula, lexer_context(options)).tokenize()?;
    tracing::debug!(token_count = tokens.len(), "lexed formula");

    let ast = formula_parse::parse(tokens, &options.limits)?;
    tracing::debug!(node_count = ast.node_count(), "parsed formula");

    let value = formula_eval::evaluate(&ast, bindings)?;
    tracing::debug!(%value, "evaluated formula");
    Ok(value)
}

/// Same as [`evaluate`], but wrapped in the full external-interface shape:
/// the value, wall-clock time spent, and any non-fatal warnings collected
/// along the way.
#[tracing::instrument(skip(bindings, options), fields(formula_len = formula.len()))]
pub fn evaluate_with_report(
    formula: &str,
    bindings: &Bindings,
    options: &EvaluateOptions,
) -> Result<EvaluationReport, EngineError> {
    let started = std::time::Instant::now();
    let value = evaluate(formula, bindings, options)?;
    Ok(EvaluationReport { value, execution_nanos: started.elapsed().as_nanos() as u64, warnings: Vec::new() })
}

fn validation_error(message: impl Into<String>) -> EngineError {
    EngineError { kind: EngineErrorKind::Step, message: message.into(), position: None, code: codes::E_LIMIT_EXCEEDED }
}

fn validate_steps(steps: &[Step], initial_bindings: &Bindings, options: &EvaluateOptions) -> Result<(), StepError> {
    let limits = &options.limits;

    if steps.len() > limits.max_steps {
        return Err(StepError {
            index: steps.len().saturating_sub(1),
            cause: validation_error(format!("{} steps exceeds the limit of {}", steps.len(), limits.max_steps)),
        });
    }
    if initial_bindings.len() > limits.max_variables {
        return Err(StepError {
            index: 0,
            cause: validation_error(format!(
                "{} initial bindings exceed the limit of {}",
                initial_bindings.len(),
                limits.max_variables
            )),
        });
    }

    for (index, step) in steps.iter().enumerate() {
        if step.formula.trim().is_empty() {
            return Err(StepError { index, cause: validation_error("step formula must not be blank") });
        }
        if step.formula.len() > limits.max_formula_length {
            return Err(StepError {
                index,
                cause: validation_error(format!(
                    "step formula length {} exceeds the limit of {}",
                    step.formula.len(),
                    limits.max_formula_length
                )),
            });
        }
        if let Some(name) = &step.result_name {
            if name.trim().is_empty() {
                return Err(StepError { index, cause: validation_error("step result name must not be blank") });
            }
        }
    }
    Ok(())
}

/// Run an ordered list of steps against a shared, mutable binding map.
/// Each step's formula is evaluated against the bindings accumulated so
/// far; if it names a `result_name`, the value is bound under that name
/// for every later step. Evaluation aborts at the first failing step.
#[tracing::instrument(skip(initial_bindings, steps, options), fields(step_count = steps.len()))]
pub fn evaluate_multi_step(
    initial_bindings: Bindings,
    steps: Vec<Step>,
    options: &EvaluateOptions,
) -> Result<MultiStepResult, StepError> {
    validate_steps(&steps, &initial_bindings, options)?;

    let run_started = std::time::Instant::now();
    let mut bindings = initial_bindings;
    let mut outcomes = Vec::with_capacity(steps.len());
    let mut last_value = Value::Number(0.0);

    for (index, step) in steps.into_iter().enumerate() {
        let started = std::time::Instant::now();
        let value = evaluate(&step.formula, &bindings, options)
            .map_err(|cause| StepError { index, cause })?;
        let duration = started.elapsed();

        tracing::info!(index, step_name = step.step_name.as_deref(), ?duration, "step completed");

        if let Some(name) = &step.result_name {
            if bindings.len() >= options.limits.max_variables && !bindings.contains_key(name) {
                return Err(StepError {
                    index,
                    cause: validation_error(format!(
                        "binding count would exceed the limit of {}",
                        options.limits.max_variables
                    )),
                });
            }
            bindings.insert(name.clone(), value.clone());
        }

        outcomes.push(StepOutcome { index, step_name: step.step_name.clone(), value: value.clone(), duration });
        last_value = value;
    }

    Ok(MultiStepResult {
        final_value: last_value,
        final_bindings: bindings,
        steps: outcomes,
        execution_nanos: run_started.elapsed().as_nanos() as u64,
    })
}
