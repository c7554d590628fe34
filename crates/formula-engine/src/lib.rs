//! formula-engine - the public API: lex + parse + evaluate a single
//! formula, or run an ordered list of them through the multi-step
//! orchestrator.

mod engine;
mod error;
mod options;
mod step;

pub use engine::{evaluate, evaluate_multi_step, evaluate_with_report};
pub use error::{EngineError, EngineErrorKind};
pub use options::EvaluateOptions;
pub use step::{EvaluationReport, MultiStepResult, Step, StepError, StepOutcome};

pub use formula_eval::{Bindings, Value};
