//! Output formatting for the command line
//!
//! Each stage of the pipeline (tokens, units, a full evaluation) can be rendered as a
//! human-readable listing or serialized as JSON or YAML.

use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::playground::evaluation::{Evaluation, Status};
use crate::playground::lexer::Token;
use crate::playground::segmentation::UnitMap;

/// Represents the output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Simple,
    Json,
    Yaml,
}

impl OutputFormat {
    pub const NAMES: [&'static str; 3] = ["simple", "json", "yaml"];
}

impl FromStr for OutputFormat {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(OutputFormat::Simple),
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            other => Err(ProcessingError::InvalidFormat(other.to_string())),
        }
    }
}

/// Errors that can occur while formatting output
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn serialize<T: Serialize + ?Sized>(
    value: &T,
    format: OutputFormat,
) -> Result<Option<String>, ProcessingError> {
    match format {
        OutputFormat::Simple => Ok(None),
        OutputFormat::Json => Ok(Some(serde_json::to_string_pretty(value)?)),
        OutputFormat::Yaml => Ok(Some(serde_yaml::to_string(value)?)),
    }
}

/// Format tokens, one per line in simple mode: `line:column-line:column Kind value`
pub fn format_tokens(tokens: &[Token], format: OutputFormat) -> Result<String, ProcessingError> {
    if let Some(serialized) = serialize(tokens, format)? {
        return Ok(serialized);
    }

    let mut out = String::new();
    for token in tokens {
        let _ = writeln!(
            out,
            "{}:{}-{}:{} {:?} {}",
            token.start.line,
            token.start.column,
            token.end.line,
            token.end.column,
            token.kind,
            token.value
        );
    }
    Ok(out)
}

/// Format a unit map. Simple mode prints a `[line N]` header above each unit's text.
pub fn format_units(units: &UnitMap, format: OutputFormat) -> Result<String, ProcessingError> {
    if let Some(serialized) = serialize(units, format)? {
        return Ok(serialized);
    }

    let mut out = String::new();
    for (line, text) in units {
        let _ = writeln!(out, "[line {}]", line);
        let _ = writeln!(out, "{}", text);
    }
    Ok(out)
}

/// Format an evaluation: status, result list, console output, and the error if any
pub fn format_evaluation(
    evaluation: &Evaluation,
    format: OutputFormat,
) -> Result<String, ProcessingError> {
    if let Some(serialized) = serialize(evaluation, format)? {
        return Ok(serialized);
    }

    let status = match evaluation.status {
        Status::NoCode => "no code",
        Status::Success => "success",
        Status::Error => "error",
    };

    let mut out = String::new();
    let _ = writeln!(out, "status: {}", status);
    for result in &evaluation.results {
        let _ = writeln!(out, "=> {}", result);
    }
    for line in &evaluation.console {
        let _ = writeln!(out, "console: {}", line);
    }
    if let Some(error) = &evaluation.error {
        let _ = writeln!(out, "error: {}", error);
    }
    Ok(out)
}
