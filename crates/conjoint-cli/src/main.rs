mod logging;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use conjoint_core::{SURVEY_VERSION, Survey, validate_survey};
use conjoint_design::{DesignEngine, DesignError, DesignOptions, emit_script};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("survey error: {0}")]
    Survey(#[from] conjoint_core::Error),
    #[error("design error: {0}")]
    Design(#[from] DesignError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "conjoint", version, about = "Conjoint design generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one task and print it as JSON.
    Preview(PreviewArgs),
    /// Generate the full design and print it as JSON.
    Design(PreviewArgs),
    /// Generate a CSV export with one task per row.
    Csv(CsvArgs),
    /// Emit the Qualtrics JavaScript block for a survey.
    Script(ScriptArgs),
    /// Print the survey definition JSON schema.
    Schema,
}

#[derive(Args, Debug)]
struct EngineArgs {
    /// Seed for reproducible output. Omit to seed from OS entropy.
    #[arg(long)]
    seed: Option<u64>,
    /// Attempt ceiling for sampling one restriction-satisfying profile.
    #[arg(long, default_value_t = 1000)]
    max_attempts_profile: u32,
    /// Attempt ceiling for assembling one cross-restriction-satisfying task.
    #[arg(long, default_value_t = 100)]
    max_attempts_task: u32,
}

impl EngineArgs {
    fn options(&self) -> DesignOptions {
        DesignOptions {
            seed: self.seed,
            max_attempts_profile: self.max_attempts_profile,
            max_attempts_task: self.max_attempts_task,
        }
    }
}

#[derive(Args, Debug)]
struct PreviewArgs {
    /// Path to the survey definition JSON.
    survey: PathBuf,
    #[command(flatten)]
    engine: EngineArgs,
}

#[derive(Args, Debug)]
struct CsvArgs {
    /// Path to the survey definition JSON.
    survey: PathBuf,
    /// Output CSV path. The generation report lands next to it.
    #[arg(long, default_value = "design.csv")]
    out: PathBuf,
    #[command(flatten)]
    engine: EngineArgs,
}

#[derive(Args, Debug)]
struct ScriptArgs {
    /// Path to the survey definition JSON, or a previously emitted script.
    survey: PathBuf,
    /// Output path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
    #[command(flatten)]
    engine: EngineArgs,
}

fn main() -> Result<(), CliError> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Preview(args) => run_preview(args),
        Command::Design(args) => run_design(args),
        Command::Csv(args) => run_csv(args),
        Command::Script(args) => run_script(args),
        Command::Schema => run_schema(),
    }
}

fn run_preview(args: PreviewArgs) -> Result<(), CliError> {
    let survey = load_survey(&args.survey)?;
    let engine = DesignEngine::new(args.engine.options());
    let preview = engine.preview(&survey)?;
    println!("{}", serde_json::to_string_pretty(&preview)?);
    Ok(())
}

fn run_design(args: PreviewArgs) -> Result<(), CliError> {
    let survey = load_survey(&args.survey)?;
    let engine = DesignEngine::new(args.engine.options());
    let result = engine.design(&survey)?;
    let output = serde_json::json!({
        "design": result.design,
        "report": result.report,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_csv(args: CsvArgs) -> Result<(), CliError> {
    let survey = load_survey(&args.survey)?;
    let engine = DesignEngine::new(args.engine.options());
    let report = engine.write_csv(&survey, &args.out)?;
    tracing::info!(path = %args.out.display(), rows = survey.csv_lines, "csv written");

    let report_path = args.out.with_extension("report.json");
    fs::write(&report_path, serde_json::to_string_pretty(&report)?)?;
    tracing::info!(path = %report_path.display(), "report written");
    Ok(())
}

fn run_script(args: ScriptArgs) -> Result<(), CliError> {
    let survey = load_survey(&args.survey)?;
    let script = emit_script(&survey, &args.engine.options())?;

    match args.out {
        Some(path) => {
            fs::write(&path, &script)?;
            tracing::info!(path = %path.display(), "script written");
        }
        None => print!("{script}"),
    }
    Ok(())
}

fn run_schema() -> Result<(), CliError> {
    let schema = schemars::schema_for!(Survey);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    tracing::info!(survey_version = SURVEY_VERSION, "schema emitted");
    Ok(())
}

/// Load a survey definition from plain JSON, or from the leading `//`
/// comment line of a previously emitted script.
fn load_survey(path: &Path) -> Result<Survey, CliError> {
    let contents = fs::read_to_string(path)?;
    let body = contents
        .lines()
        .next()
        .and_then(|line| line.strip_prefix("//"))
        .unwrap_or(&contents);
    let survey: Survey = serde_json::from_str(body)?;
    validate_survey(&survey)?;
    Ok(survey)
}
