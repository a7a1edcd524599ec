use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use invitation_config::{Config, LoadOptions, LogLevel};
use invitation_core::{check_inputs_json, ExitCode, GenerateOptions, Generator, TracingLog};
use invitation_format::{render_check, render_failure, render_report, ReportFormat};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

/// Entry point for CLI execution. Returns the desired exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();

    let mut load = LoadOptions::default();
    if let Some(path) = &cli.config {
        load = load.with_override_path(path);
    }
    let config = match Config::load(load) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return Ok(ExitCode::Config as i32);
        }
    };

    init_logging(config.logging.level);

    match cli.command {
        Command::Generate(args) => handle_generate(&config, args),
        Command::Check(args) => handle_check(args),
    }
}

fn init_logging(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    // A subscriber may already be installed when embedded in another binary.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_generate(config: &Config, args: GenerateArgs) -> Result<i32> {
    let GenerateArgs {
        inputs,
        output_dir,
        format,
        quiet,
    } = args;
    let format = report_format(format);

    let (template, attendees) = match load_inputs(&inputs) {
        Ok(loaded) => loaded,
        Err(code) => return Ok(code as i32),
    };

    let mut options = GenerateOptions::from_config(config);
    if let Some(dir) = output_dir {
        options = options.with_output_dir(dir);
    }

    let log = TracingLog;
    let generator = Generator::new(options, &log);
    match generator.generate_json(&template, &attendees) {
        Ok(report) => {
            if !quiet {
                emit(&render_report(&report, format));
            }
            Ok(report.exit_code() as i32)
        }
        Err(err) => {
            if !quiet {
                emit(&render_failure(&err, format));
            }
            Ok(err.exit_code() as i32)
        }
    }
}

fn handle_check(args: CheckArgs) -> Result<i32> {
    let CheckArgs { inputs, format } = args;
    let format = report_format(format);

    let (template, attendees) = match load_inputs(&inputs) {
        Ok(loaded) => loaded,
        Err(code) => return Ok(code as i32),
    };

    let result = check_inputs_json(&template, &attendees).map(|(_, records)| records.len());
    let code = match &result {
        Ok(count) => {
            tracing::info!("{count} attendee record(s) passed validation");
            ExitCode::Success
        }
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::InvalidInput
        }
    };
    emit(&render_check(&result, format));
    Ok(code as i32)
}

/// Reads the template as text and the attendee file as arbitrary JSON, leaving
/// shape checks to the generator gates.
fn load_inputs(inputs: &InputArgs) -> Result<(Value, Value), ExitCode> {
    let template = fs::read_to_string(&inputs.template).map_err(|err| {
        report_read_error("template", &inputs.template, &err);
        ExitCode::Io
    })?;

    let raw = fs::read_to_string(&inputs.attendees).map_err(|err| {
        report_read_error("attendees", &inputs.attendees, &err);
        ExitCode::Io
    })?;
    let attendees = serde_json::from_str(&raw).map_err(|err| {
        eprintln!(
            "failed to parse attendees file {}: {err}",
            inputs.attendees.display()
        );
        ExitCode::InvalidInput
    })?;

    Ok((Value::String(template), attendees))
}

fn report_read_error(what: &str, path: &Path, err: &io::Error) {
    eprintln!("failed to read {what} file {}: {err}", path.display());
}

fn report_format(value: Option<FormatValue>) -> ReportFormat {
    match value.unwrap_or(FormatValue::Plain) {
        FormatValue::Plain => ReportFormat::Plain,
        FormatValue::Json => ReportFormat::Json,
    }
}

fn emit(content: &str) {
    print!("{}", content);
    if !content.ends_with('\n') {
        println!();
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Generate personalised invitations from a template",
    propagate_version = true
)]
struct Cli {
    /// Override configuration file (takes precedence over .invitations.toml)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write one invitation per attendee
    Generate(GenerateArgs),
    /// Validate the template and attendee list without writing anything
    Check(CheckArgs),
}

#[derive(Args)]
struct InputArgs {
    /// Template file containing {name}, {event_title}, {event_date} and {event_location}
    #[arg(long, value_name = "FILE")]
    template: PathBuf,
    /// JSON file holding a list of attendee objects
    #[arg(long, value_name = "FILE")]
    attendees: PathBuf,
}

#[derive(Args)]
struct GenerateArgs {
    #[command(flatten)]
    inputs: InputArgs,
    /// Write invitations here instead of the configured directory
    #[arg(long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,
    /// Report format
    #[arg(long, value_enum)]
    format: Option<FormatValue>,
    /// Suppress the report (logs still go to stderr)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Args)]
struct CheckArgs {
    #[command(flatten)]
    inputs: InputArgs,
    /// Report format
    #[arg(long, value_enum)]
    format: Option<FormatValue>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatValue {
    Plain,
    Json,
}
