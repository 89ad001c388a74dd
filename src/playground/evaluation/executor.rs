//! Executors run a piece of executable source and report its completion value
//!
//! The evaluation layer only needs the [`Executor`] trait. [`NodeExecutor`] is the
//! shipped implementation; it hands the source to an external `node` process together
//! with a small driver script and decodes the JSON reply. Nothing here isolates the
//! executed code.

use std::fmt;
use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::playground::config::ExecutorConfig;
use crate::playground::error::ExecutionError;

const DRIVER: &str = include_str!("driver.js");
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// The value a program's final expression produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Completion {
    Undefined,
    Function,
    Value(serde_json::Value),
}

impl Completion {
    /// How the value appears in the result list, if at all.
    ///
    /// Falsy values are hidden, `true` reads `True`, functions are hidden, and everything
    /// else is shown as compact JSON.
    pub fn display(&self) -> Option<String> {
        use serde_json::Value;

        match self {
            Completion::Undefined | Completion::Function => None,
            Completion::Value(value) => match value {
                Value::Null | Value::Bool(false) => None,
                Value::Bool(true) => Some("True".to_string()),
                Value::Number(n) if n.as_f64() == Some(0.0) => None,
                Value::String(s) if s.is_empty() => None,
                other => Some(other.to_string()),
            },
        }
    }
}

/// The arguments of one `console.log` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsoleLine(pub Vec<serde_json::Value>);

impl fmt::Display for ConsoleLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(|arg| arg.to_string()).collect();
        write!(f, "{}", rendered.join(" "))
    }
}

/// Outcome of a run that completed without throwing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub completion: Completion,
    #[serde(default)]
    pub console: Vec<ConsoleLine>,
}

impl Execution {
    pub fn new(completion: Completion) -> Self {
        Self {
            completion,
            console: Vec::new(),
        }
    }
}

/// Runs executable source to completion, or fails
pub trait Executor {
    fn execute(&self, source: &str) -> Result<Execution, ExecutionError>;
}

impl<F> Executor for F
where
    F: Fn(&str) -> Result<Execution, ExecutionError>,
{
    fn execute(&self, source: &str) -> Result<Execution, ExecutionError> {
        self(source)
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Reply {
    Ok {
        completion: Completion,
        #[serde(default)]
        console: Vec<ConsoleLine>,
    },
    Thrown {
        name: String,
        message: String,
    },
}

impl Reply {
    fn into_result(self) -> Result<Execution, ExecutionError> {
        match self {
            Reply::Ok {
                completion,
                console,
            } => Ok(Execution {
                completion,
                console,
            }),
            Reply::Thrown { name, message } => Err(ExecutionError::Thrown { name, message }),
        }
    }
}

/// Runs source in a `node` child process
#[derive(Debug, Clone)]
pub struct NodeExecutor {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl NodeExecutor {
    pub fn new(config: &ExecutorConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            timeout: config.timeout(),
        }
    }
}

impl Default for NodeExecutor {
    fn default() -> Self {
        Self {
            program: "node".to_string(),
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Executor for NodeExecutor {
    fn execute(&self, source: &str) -> Result<Execution, ExecutionError> {
        tracing::debug!(program = %self.program, bytes = source.len(), "executing source");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg("-e")
            .arg(DRIVER)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecutionError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Pipes are serviced on their own threads so a child that stops reading stdin,
        // or fills stdout, cannot stall the timeout below.
        let stdout = child.stdout.take().map(|pipe| thread::spawn(move || read_all(pipe)));
        let stderr = child.stderr.take().map(|pipe| thread::spawn(move || read_all(pipe)));
        let writer = child.stdin.take().map(|mut pipe| {
            let source = source.to_string();
            thread::spawn(move || pipe.write_all(source.as_bytes()))
        });

        let status = wait_for_exit(&mut child, self.timeout)?;
        let stdout = join(stdout)?.unwrap_or_default();
        let stderr = join(stderr)?.unwrap_or_default();
        let written = join(writer);

        let stderr = String::from_utf8_lossy(&stderr).trim().to_string();
        if !stderr.is_empty() {
            tracing::debug!(stderr = %stderr, "executor stderr output");
        }
        if stdout.is_empty() && !status.success() {
            return Err(ExecutionError::Exited { status, stderr });
        }
        written?;

        let reply: Reply = serde_json::from_slice(&stdout)?;
        reply.into_result()
    }
}

fn read_all(mut pipe: impl Read) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    pipe.read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Result of a pipe thread, `None` if the pipe was never opened
fn join<T>(handle: Option<JoinHandle<io::Result<T>>>) -> io::Result<Option<T>> {
    match handle {
        Some(handle) => match handle.join() {
            Ok(result) => result.map(Some),
            Err(_) => Err(io::Error::other("executor pipe thread panicked")),
        },
        None => Ok(None),
    }
}

/// Wait for the child to exit, killing it once `timeout` has passed.
fn wait_for_exit(child: &mut Child, timeout: Duration) -> Result<ExitStatus, ExecutionError> {
    let start = Instant::now();

    loop {
        if let Some(status) = child.try_wait()? {
            tracing::debug!(?status, elapsed = ?start.elapsed(), "executor exited");
            return Ok(status);
        }
        if start.elapsed() > timeout {
            let limit_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            tracing::warn!(limit_ms, "execution timed out, killing process");
            drop(child.kill());
            drop(child.wait());
            return Err(ExecutionError::TimedOut { limit_ms });
        }
        thread::sleep(POLL_INTERVAL);
    }
}
