//! Types for the multi-step orchestrator: an ordered list of formulas,
//! each optionally naming the binding its result is stored under.

use formula_eval::Value;

use crate::error::EngineError;

/// One step of a multi-step run: a formula, an optional name to bind its
/// result under (for later steps to reference), and an optional label
/// used only for reporting.
#[derive(Clone, Debug)]
pub struct Step {
    pub formula: String,
    pub result_name: Option<String>,
    pub step_name: Option<String>,
}

impl Step {
    pub fn new(formula: impl Into<String>) -> Self {
        Step { formula: formula.into(), result_name: None, step_name: None }
    }

    pub fn with_result_name(mut self, name: impl Into<String>) -> Self {
        self.result_name = Some(name.into());
        self
    }

    pub fn with_step_name(mut self, name: impl Into<String>) -> Self {
        self.step_name = Some(name.into());
        self
    }
}

/// The outcome of a single successfully-evaluated step.
#[derive(Clone, Debug)]
pub struct StepOutcome {
    pub index: usize,
    pub step_name: Option<String>,
    pub value: Value,
    pub duration: std::time::Duration,
}

/// A step failed during a multi-step run; evaluation aborts at the first
/// failure, so this always names the step that stopped the run.
#[derive(Debug)]
pub struct StepError {
    pub index: usize,
    pub cause: EngineError,
}

impl std::fmt::Display for StepError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "step {} failed: {}", self.index, self.cause)
    }
}

impl std::error::Error for StepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

/// Result of a completed multi-step run: the last step's value, the final
/// binding map (including every named intermediate result), the per-step
/// timing trail, and the cumulative wall-clock time across all steps.
#[derive(Clone, Debug)]
pub struct MultiStepResult {
    pub final_value: Value,
    pub final_bindings: formula_eval::Bindings,
    pub steps: Vec<StepOutcome>,
    pub execution_nanos: u64,
}

/// The result of a single-formula [`crate::evaluate_with_report`] call:
/// the value, wall-clock time spent, and any non-fatal warnings.
#[derive(Clone, Debug)]
pub struct EvaluationReport {
    pub value: Value,
    pub execution_nanos: u64,
    pub warnings: Vec<formula_util::Diagnostic>,
}
