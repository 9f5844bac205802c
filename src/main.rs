//! Purpose: `itemstat` CLI entry point.
//! Role: Binary crate root; parses args, streams records, emits statistics.
//! Invariants: Statistics go to stdout (or `--output`); diagnostics and errors
//! go to stderr.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `core::error::to_exit_code`.
#![allow(clippy::result_large_err)]
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, IsTerminal, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod color_json;
mod ingest;
mod render;

use ingest::RecordLines;
use itemstat::core::error::{Error, ErrorKind, to_exit_code};
use itemstat::core::stats::capacity_stats;

#[derive(Parser)]
#[command(
    name = "itemstat",
    version,
    about = "Print capacity-unit statistics for key-value export records read line by line"
)]
struct Cli {
    /// Print statistics in this format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Echo this attribute's payload in the output (repeatable).
    #[arg(short, long = "attr", value_name = "NAME")]
    attrs: Vec<String>,

    /// Read record lines from this file instead of stdin.
    #[arg(short, long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Write statistics to this file instead of stdout.
    #[arg(short, long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Colorize JSON output.
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    color: ColorMode,

    /// Enable debug-level diagnostics on stderr.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<i32, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                return Ok(0);
            }
            _ => {
                let rendered = err.to_string();
                let message = rendered
                    .lines()
                    .next()
                    .unwrap_or("invalid arguments")
                    .trim_start_matches("error: ")
                    .to_string();
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(message)
                    .with_hint("Run `itemstat --help` for usage."));
            }
        },
    };

    init_tracing(cli.verbose);

    let reader: Box<dyn BufRead> = match &cli.input {
        Some(path) => {
            let file = File::open(path).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message(format!("failed to open input file {}", path.display()))
                    .with_source(err)
            })?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin().lock())),
    };

    let stdout_tty = cli.output.is_none() && io::stdout().is_terminal();
    let mut writer: Box<dyn Write> = match &cli.output {
        Some(path) => {
            let file = File::create(path).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message(format!("failed to create output file {}", path.display()))
                    .with_source(err)
            })?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };

    let stats = capacity_stats(RecordLines::new(reader), cli.attrs.clone());
    let count = match cli.format {
        OutputFormat::Json => {
            let use_color = cli.color.use_color(stdout_tty);
            render::render_json(stats, &mut writer, use_color)?
        }
        OutputFormat::Csv => render::render_csv(stats, &mut writer)?,
    };
    tracing::debug!(records = count, format = ?cli.format, "statistics complete");
    Ok(0)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn emit_error(err: &Error) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, is_tty));
        return;
    }

    let value = error_json(err);
    let encoded = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{encoded}");
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(line) = err.line() {
        inner.insert("line".to_string(), json!(line));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, "31"),
        error_message(err)
    ));
    if let Some(hint) = err.hint() {
        lines.push(format!("{} {hint}", colorize_label("hint:", use_color, "33")));
    }
    if let Some(line) = err.line() {
        lines.push(format!("{} {line}", colorize_label("line:", use_color, "33")));
    }
    for cause in error_causes(err) {
        lines.push(format!(
            "{} {cause}",
            colorize_label("cause:", use_color, "33")
        ));
    }
    lines.join("\n")
}

fn error_message(err: &Error) -> String {
    err.message()
        .map(str::to_string)
        .unwrap_or_else(|| format!("{:?} error", err.kind()))
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    causes
}

fn colorize_label(label: &str, use_color: bool, color: &str) -> String {
    if !use_color {
        return label.to_string();
    }
    format!("\u{1b}[{color}m{label}\u{1b}[0m")
}
