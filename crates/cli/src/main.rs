// Rollcall CLI - joins course achievement and proctoring reports

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use rollcall_core::report;
use rollcall_core::{RosterConfig, RosterError, RosterPipeline, RosterResult};

/// Success - command completed without errors.
const EXIT_SUCCESS: u8 = 0;
/// Pipeline or data error (bad file, ceilings crossed, duplicate student).
const EXIT_ERROR: u8 = 1;
/// Usage error - bad arguments, unreadable config.
const EXIT_USAGE: u8 = 2;

#[derive(Parser)]
#[command(name = "rollcall")]
#[command(about = "Join course achievement and proctoring reports into a roster")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest both reports and print the reconciled roster
    #[command(after_help = "\
Examples:
  rollcall run --achievement grades.xlsx --proctoring proctoring.xlsx
  rollcall run --achievement grades.xlsx --proctoring proctoring.xlsx --json
  rollcall run --achievement grades.xlsx --proctoring proctoring.xlsx --config rollcall.toml")]
    Run {
        /// Educational achievement report (.xlsx)
        #[arg(long)]
        achievement: PathBuf,

        /// Proctoring status report (.xlsx)
        #[arg(long)]
        proctoring: PathBuf,

        /// TOML config overriding the stock column names and ceilings
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output JSON to stdout instead of the human table
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the default configuration as TOML
    Config,
}

struct CliError {
    code: u8,
    message: String,
    detail: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run {
            achievement,
            proctoring,
            config,
            json,
            output,
        } => cmd_run(achievement, proctoring, config, json, output),
        Commands::Config => cmd_config(),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(detail) = err.detail {
                eprintln!("detail: {}", detail);
            }
            ExitCode::from(err.code)
        }
    }
}

fn usage_err(message: impl Into<String>) -> CliError {
    CliError {
        code: EXIT_USAGE,
        message: message.into(),
        detail: None,
    }
}

/// Map a pipeline error, keeping the advanced message when it adds
/// anything over the short one.
fn data_err(err: RosterError) -> CliError {
    let message = err.to_string();
    let detail = err.detail();
    CliError {
        code: EXIT_ERROR,
        detail: (detail != message).then_some(detail),
        message,
    }
}

fn cmd_run(
    achievement: PathBuf,
    proctoring: PathBuf,
    config_path: Option<PathBuf>,
    json: bool,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = match config_path {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| usage_err(format!("cannot read {}: {e}", path.display())))?;
            RosterConfig::from_toml(&text).map_err(data_err)?
        }
        None => RosterConfig::default(),
    };

    let max_bytes = config.limits.max_file_bytes;
    let mut pipeline = RosterPipeline::new(config);

    let grid = rollcall_io::read_workbook(&achievement, max_bytes).map_err(data_err)?;
    let errors = pipeline.load_achievement(&grid).map_err(data_err)?;
    if !errors.is_empty() {
        eprintln!(
            "warning: {} achievement rows contain errors, check rows {}",
            errors.len(),
            report::bounded_list(&errors, report::ROW_DISPLAY_LIMIT)
        );
    }

    let grid = rollcall_io::read_workbook(&proctoring, max_bytes).map_err(data_err)?;
    let errors = pipeline.load_proctoring(&grid).map_err(data_err)?;
    if !errors.is_empty() {
        eprintln!(
            "warning: {} proctoring rows contain errors, check rows {}",
            errors.len(),
            report::bounded_list(&errors, report::ROW_DISPLAY_LIMIT)
        );
    }

    let extra = pipeline.extra_proctoring_count();
    let result = pipeline.reconcile().map_err(data_err)?.clone();

    if json || output.is_some() {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| data_err(RosterError::Io(format!("JSON serialization error: {e}"))))?;
        if let Some(ref path) = output {
            std::fs::write(path, &json_str)
                .map_err(|e| data_err(RosterError::Io(format!("cannot write output: {e}"))))?;
            eprintln!("wrote {}", path.display());
        }
        if json {
            println!("{json_str}");
        }
    } else {
        print_roster(&result, pipeline.config());
    }

    eprintln!("{}", report::roster_summary(&result));
    if !result.unmatched.is_empty() {
        eprintln!(
            "warning: no proctoring data for {} students: {}",
            result.unmatched.len(),
            report::bounded_list(&result.unmatched, report::EMAIL_DISPLAY_LIMIT)
        );
    }
    if extra > 0 {
        eprintln!("note: {extra} proctoring records have no achievement counterpart");
    }

    Ok(())
}

fn print_roster(result: &RosterResult, config: &RosterConfig) {
    for (student, passed) in &result.students {
        let token = if *passed {
            &config.proctoring.pass_token
        } else {
            &config.proctoring.fail_token
        };
        println!(
            "{:<32} {:<16} {:<16} {:<16} {:>2} {:>6}",
            student.email,
            student.last_name,
            student.first_name,
            student.second_name,
            student.grade.to_string(),
            token
        );
    }
}

fn cmd_config() -> Result<(), CliError> {
    let rendered = toml::to_string_pretty(&RosterConfig::default())
        .map_err(|e| usage_err(format!("cannot render config: {e}")))?;
    print!("{rendered}");
    Ok(())
}
