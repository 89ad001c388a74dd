//! Command-line interface for jsplay
//! This binary runs the playground pipeline over a file and prints each stage.
//!
//! Usage:
//!   jsplay tokens `<path>` [--format `<format>`]  - Print the tokens of the executable source
//!   jsplay units `<path>` [--format `<format>`]   - Print the executable units, keyed by line
//!   jsplay run `<path>` [--format `<format>`]     - Evaluate the buffer and print the results
//!   jsplay watch `<path>`                       - Re-evaluate whenever the file settles

use std::path::{Path, PathBuf};

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use jsplay::playground::config::{Loader, PlaygroundConfig};
use jsplay::playground::evaluation::{NodeExecutor, Playground};
use jsplay::playground::lexer::tokenize;
use jsplay::playground::processor::{self, OutputFormat, ProcessingError};
use jsplay::playground::segmentation::segment_source;
use jsplay::playground::transform::{StandardTransform, Transform};
use jsplay::playground::watch;
use jsplay::playground::PlaygroundError;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Playground(#[from] PlaygroundError),
    #[error(transparent)]
    Processing(#[from] ProcessingError),
    #[error("Error reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn path_arg() -> Arg {
    Arg::new("path")
        .help("Path to the JavaScript buffer")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .index(1)
}

fn format_arg() -> Arg {
    Arg::new("format")
        .long("format")
        .short('f')
        .help("Output format (defaults to the configured one)")
        .value_parser(OutputFormat::NAMES)
}

fn cli() -> Command {
    Command::new("jsplay")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Segment and evaluate JavaScript playground buffers")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the defaults")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log pipeline stages to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("tokens")
                .about("Print the tokens of the executable source")
                .arg(path_arg())
                .arg(format_arg()),
        )
        .subcommand(
            Command::new("units")
                .about("Print the executable units, keyed by line")
                .arg(path_arg())
                .arg(format_arg()),
        )
        .subcommand(
            Command::new("run")
                .about("Evaluate the buffer and print the results")
                .arg(path_arg())
                .arg(format_arg()),
        )
        .subcommand(
            Command::new("watch")
                .about("Re-evaluate the file every time its contents settle")
                .arg(path_arg())
                .arg(format_arg()),
        )
}

fn main() {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    if let Err(err) = run(&matches) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(matches: &ArgMatches) -> Result<(), CliError> {
    let config = load_config(matches.get_one::<PathBuf>("config"))?;

    let Some((name, sub)) = matches.subcommand() else {
        return Ok(());
    };
    let Some(path) = sub.get_one::<PathBuf>("path") else {
        return Ok(());
    };
    let format = match sub.get_one::<String>("format") {
        Some(value) => value.parse()?,
        None => config.output.format,
    };

    match name {
        "tokens" => handle_tokens_command(path, format, &config),
        "units" => handle_units_command(path, format, &config),
        "run" => handle_run_command(path, format, &config),
        "watch" => handle_watch_command(path, format, &config),
        _ => Ok(()),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<PlaygroundConfig, PlaygroundError> {
    let loader = match path {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new().with_optional_file("jsplay.toml"),
    };
    Ok(loader.build()?)
}

fn read_buffer(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn executable_source(path: &Path, config: &PlaygroundConfig) -> Result<String, CliError> {
    let raw = read_buffer(path)?;
    let transform = StandardTransform::new(&config.transform);
    Ok(transform.transform(&raw).map_err(PlaygroundError::from)?)
}

/// Handle the tokens command
fn handle_tokens_command(
    path: &Path,
    format: OutputFormat,
    config: &PlaygroundConfig,
) -> Result<(), CliError> {
    let source = executable_source(path, config)?;
    let tokens = tokenize(&source).map_err(PlaygroundError::from)?;
    print!("{}", processor::format_tokens(&tokens, format)?);
    Ok(())
}

/// Handle the units command
fn handle_units_command(
    path: &Path,
    format: OutputFormat,
    config: &PlaygroundConfig,
) -> Result<(), CliError> {
    let source = executable_source(path, config)?;
    let units = segment_source(&source).map_err(PlaygroundError::from)?;
    print!("{}", processor::format_units(&units, format)?);
    Ok(())
}

fn playground(config: &PlaygroundConfig) -> Playground<NodeExecutor> {
    Playground::new(
        NodeExecutor::new(&config.executor),
        StandardTransform::new(&config.transform),
    )
}

/// Handle the run command
fn handle_run_command(
    path: &Path,
    format: OutputFormat,
    config: &PlaygroundConfig,
) -> Result<(), CliError> {
    let raw = read_buffer(path)?;
    let evaluation = playground(config).evaluate(&raw);
    print!("{}", processor::format_evaluation(&evaluation, format)?);
    Ok(())
}

/// Handle the watch command
fn handle_watch_command(
    path: &Path,
    format: OutputFormat,
    config: &PlaygroundConfig,
) -> Result<(), CliError> {
    let runtime = tokio::runtime::Runtime::new().map_err(PlaygroundError::from)?;
    let playground = playground(config);
    let quiet = config.watch.debounce();
    let interval = config.watch.poll_interval();

    runtime.block_on(async {
        let (tx, rx) = mpsc::channel(16);
        let poller = tokio::spawn(watch::poll_file(path.to_path_buf(), interval, tx));

        let settle = watch::debounce(rx, quiet, |buffer| {
            let evaluation = tokio::task::block_in_place(|| playground.evaluate(&buffer));
            match processor::format_evaluation(&evaluation, format) {
                Ok(rendered) => println!("{}", rendered),
                Err(err) => eprintln!("Error: {}", err),
            }
        });

        tokio::select! {
            _ = settle => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("interrupted");
            }
        }

        poller.abort();
        match poller.await {
            Ok(Err(err)) => Err(CliError::from(PlaygroundError::from(err))),
            _ => Ok(()),
        }
    })
}
