//! Evaluation over scripted executors, plus one run against a real `node` when present

use std::cell::RefCell;
use std::time::{Duration, Instant};

use jsplay::playground::config::{ExecutorConfig, TransformConfig};
use jsplay::playground::error::{ErrorReport, ExecutionError};
use jsplay::playground::evaluation::{
    Completion, ConsoleLine, Execution, Executor, NodeExecutor, Playground, Status,
};
use jsplay::playground::transform::{Identity, StandardTransform};
use rstest::rstest;
use serde_json::json;

/// Treats the last line as JSON; `throw <Name>` on the last line throws
fn scripted(source: &str) -> Result<Execution, ExecutionError> {
    let last = source.lines().last().unwrap_or("").trim();
    if let Some(name) = last.strip_prefix("throw ") {
        return Err(ExecutionError::Thrown {
            name: name.to_string(),
            message: format!("{} thrown", name),
        });
    }
    let completion = serde_json::from_str(last)
        .map(Completion::Value)
        .unwrap_or(Completion::Undefined);
    Ok(Execution::new(completion))
}

#[rstest]
#[case::blank("", Status::NoCode)]
#[case::whitespace(" \n\t\n", Status::NoCode)]
#[case::values("1\n2", Status::Success)]
#[case::only_undefined("x", Status::Success)]
#[case::one_unit_throws("1\nthrow TypeError\n3", Status::Error)]
#[case::unbalanced("const x = {", Status::Success)]
#[case::bad_token("1\n@", Status::Error)]
fn test_status(#[case] source: &str, #[case] expected: Status) {
    let playground = Playground::new(scripted, Identity);
    assert_eq!(playground.evaluate(source).status, expected);
}

#[test]
fn test_failures_do_not_stop_later_units() {
    let playground = Playground::new(scripted, Identity);
    let evaluation = playground.evaluate("1\nthrow TypeError\n3");
    assert_eq!(evaluation.results, vec!["1", "3"]);
    assert_eq!(
        evaluation.error,
        Some(ErrorReport::new("TypeError", "TypeError thrown"))
    );
}

#[test]
fn test_last_failure_wins() {
    let playground = Playground::new(scripted, Identity);
    let evaluation = playground.evaluate("throw RangeError\nthrow EvalError\n1");
    assert_eq!(evaluation.status, Status::Error);
    assert_eq!(
        evaluation.error,
        Some(ErrorReport::new("EvalError", "EvalError thrown"))
    );
    assert_eq!(evaluation.results, vec!["1"]);
}

#[test]
fn test_hidden_values_are_skipped() {
    let playground = Playground::new(scripted, Identity);
    let evaluation = playground.evaluate("0\nfalse\nnull\n\"\"\ntrue\n{\"a\":1}");
    assert_eq!(evaluation.results, vec!["True", r#"{"a":1}"#]);
}

#[test]
fn test_console_comes_from_whole_buffer_run() {
    let runs = RefCell::new(0);
    let executor = |source: &str| -> Result<Execution, ExecutionError> {
        *runs.borrow_mut() += 1;
        let mut execution = scripted(source)?;
        execution.console = vec![ConsoleLine(vec![json!(source.len())])];
        Ok(execution)
    };
    let playground = Playground::new(executor, Identity);

    let evaluation = playground.evaluate("1\n2");
    assert_eq!(*runs.borrow(), 3);
    assert_eq!(evaluation.console, vec![ConsoleLine(vec![json!(3)])]);
}

#[test]
fn test_transform_failure_stops_everything() {
    let runs = RefCell::new(0);
    let executor = |source: &str| -> Result<Execution, ExecutionError> {
        *runs.borrow_mut() += 1;
        scripted(source)
    };
    let transform = StandardTransform::new(&TransformConfig {
        strip_script_tags: true,
        max_source_bytes: 4,
    });
    let playground = Playground::new(executor, transform);

    let evaluation = playground.evaluate("1 + 1");
    assert_eq!(evaluation.status, Status::Error);
    assert_eq!(
        evaluation.error.map(|e| e.title).as_deref(),
        Some("TransformError")
    );
    assert_eq!(*runs.borrow(), 0);
}

fn node_available() -> bool {
    std::process::Command::new("node")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[test]
fn test_node_executor_end_to_end() {
    if !node_available() {
        return;
    }
    let playground = Playground::with_executor(NodeExecutor::default());
    let source = "const a = [1, 2];\nconsole.log('hi', a.length);\na.map((x) => x * 2)\nnope";
    let evaluation = playground.evaluate(source);

    assert_eq!(evaluation.status, Status::Error);
    assert_eq!(evaluation.results, vec!["[2,4]"]);
    assert_eq!(
        evaluation.error.map(|e| e.title).as_deref(),
        Some("ReferenceError")
    );
    // The whole-buffer run throws before it can report console output.
    assert!(evaluation.console.is_empty());
}

#[test]
fn test_pending_timers_do_not_hold_the_run() {
    if !node_available() {
        return;
    }
    let executor = NodeExecutor::default();
    let started = Instant::now();
    let execution = executor
        .execute("setInterval(() => {}, 1000);\n1 + 1")
        .unwrap();
    assert_eq!(execution.completion, Completion::Value(json!(2)));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[test]
fn test_endless_loop_times_out() {
    if !node_available() {
        return;
    }
    let executor = NodeExecutor::new(&ExecutorConfig {
        program: "node".to_string(),
        args: Vec::new(),
        timeout_ms: 300,
    });
    let playground = Playground::with_executor(executor);
    let evaluation = playground.evaluate("while (true) {}");

    assert_eq!(evaluation.status, Status::Error);
    let error = evaluation.error.unwrap();
    assert_eq!(error.title, "ExecutionError");
    assert_eq!(error.message, "execution timed out after 300 ms");
}

#[test]
fn test_bigint_completion_is_hidden() {
    if !node_available() {
        return;
    }
    let executor = NodeExecutor::default();
    assert_eq!(executor.execute("10n").unwrap().completion, Completion::Undefined);

    let playground = Playground::with_executor(executor);
    let evaluation = playground.evaluate("10n\n3");
    assert_eq!(evaluation.status, Status::Success);
    assert_eq!(evaluation.results, vec!["3"]);
}
