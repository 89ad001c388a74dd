//! Evaluation layer
//!
//! Takes a raw buffer through transform, a whole-buffer run, segmentation, and one run
//! per unit, and collects what the user gets to see: a status, the de-duplicated list of
//! unit values, console output, and the most recent error.
//!
//! Failures never stop the run. Each one replaces the current error, so the reported
//! error is always the last one that happened.

pub mod executor;

use serde::Serialize;

use crate::playground::error::{ErrorReport, PlaygroundError};
use crate::playground::segmentation::{segment_source, UnitMap};
use crate::playground::transform::{StandardTransform, Transform};
pub use executor::{Completion, ConsoleLine, Execution, Executor, NodeExecutor};

/// Overall outcome of an evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// The buffer holds nothing to run
    #[default]
    NoCode,
    Success,
    Error,
}

/// Everything one evaluation produced
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Evaluation {
    pub status: Status,
    /// Displayable unit values, first occurrence order, no duplicates
    pub results: Vec<String>,
    pub error: Option<ErrorReport>,
    /// Output of the whole-buffer run
    pub console: Vec<ConsoleLine>,
    pub units: UnitMap,
}

impl Evaluation {
    fn fail(&mut self, report: ErrorReport) {
        self.error = Some(report);
        self.status = Status::Error;
    }

    fn push_result(&mut self, shown: String) {
        if !self.results.contains(&shown) {
            self.results.push(shown);
        }
    }
}

/// Transform plus executor, ready to evaluate buffers
pub struct Playground<E, T = StandardTransform> {
    executor: E,
    transform: T,
}

impl<E: Executor> Playground<E> {
    /// A playground using the standard transform with default settings
    pub fn with_executor(executor: E) -> Self {
        Self::new(executor, StandardTransform::default())
    }
}

impl<E: Executor, T: Transform> Playground<E, T> {
    pub fn new(executor: E, transform: T) -> Self {
        Self {
            executor,
            transform,
        }
    }

    /// Transform and segment a buffer without running anything
    pub fn segment(&self, raw: &str) -> Result<UnitMap, PlaygroundError> {
        let code = self.transform.transform(raw)?;
        Ok(segment_source(&code)?)
    }

    /// Run the full pipeline over a buffer
    pub fn evaluate(&self, raw: &str) -> Evaluation {
        let mut evaluation = Evaluation::default();

        let code = match self.transform.transform(raw) {
            Ok(code) => code,
            Err(err) => {
                tracing::warn!(error = %err, "transform failed");
                evaluation.fail(err.report());
                return evaluation;
            }
        };

        if code.trim().is_empty() {
            return evaluation;
        }

        match self.executor.execute(&code) {
            Ok(execution) => {
                evaluation.console = execution.console;
                evaluation.status = Status::Success;
            }
            Err(err) => {
                tracing::warn!(error = %err, "buffer run failed");
                evaluation.fail(err.report());
            }
        }

        let units = match segment_source(&code) {
            Ok(units) => units,
            Err(err) => {
                tracing::warn!(error = %err, "tokenize failed");
                evaluation.fail(err.report());
                return evaluation;
            }
        };
        tracing::debug!(units = units.len(), "segmented buffer");

        for (line, text) in &units {
            match self.executor.execute(text) {
                Ok(execution) => {
                    if let Some(shown) = execution.completion.display() {
                        evaluation.push_result(shown);
                    }
                }
                Err(err) => {
                    tracing::warn!(line, error = %err, "unit failed");
                    evaluation.fail(err.report());
                }
            }
        }

        evaluation.units = units;
        evaluation
    }
}
