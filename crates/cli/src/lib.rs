pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use mater_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "mater",
    about = "Mater material recommendation CLI",
    long_about = "Rank catalog materials locally, inspect scores, extract recommendation cards, and stream assistant answers.",
    after_help = "Examples:\n  mater recommend orthopedics\n  mater recommend --case \"68 year old, hip replacement, titanium stem\"\n  mater score peek\n  mater chat \"tibial plateau fracture, 45 years\" --field medicine\n  mater doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Rank catalog materials for an application and pick three profiles")]
    Recommend {
        #[arg(help = "Applicability tag such as orthopedics, dental or spine")]
        application: Option<String>,
        #[arg(long, help = "Free-text case description to derive application and baseline from")]
        case: Option<String>,
        #[arg(long, help = "Reference material key for CO2 savings")]
        baseline: Option<String>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Show the score card and transport footprint of one material")]
    Score {
        #[arg(help = "Catalog material key")]
        material: String,
    },
    #[command(about = "List catalog materials with their global score")]
    Catalog {
        #[arg(long, help = "Restrict to medicine|architecture|mechanics|aerospace")]
        field: Option<String>,
    },
    #[command(about = "Extract ---CARD--- blocks from a file or stdin")]
    Cards {
        #[arg(help = "Text file to read; stdin when omitted")]
        file: Option<PathBuf>,
    },
    #[command(about = "Ask the assistant and stream its answer")]
    Chat {
        message: String,
        #[arg(long, help = "medicine|architecture|mechanics|aerospace")]
        field: Option<String>,
        #[arg(long)]
        specialty: Option<String>,
        #[arg(long)]
        optimization: Option<String>,
        #[arg(long, help = "Play a recorded event-stream transcript instead of calling the endpoint")]
        replay: Option<PathBuf>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, catalog, and assistant endpoint readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

/// Logs go to stderr so stdout stays parseable. A broken config falls back to
/// defaults here and is reported by the command itself.
fn init_logging() {
    use tracing::Level;

    let config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::WARN);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Recommend { application, case, baseline, json } => commands::recommend::run(
            application.as_deref(),
            case.as_deref(),
            baseline.as_deref(),
            json,
        ),
        Command::Score { material } => commands::score::run(&material),
        Command::Catalog { field } => commands::catalog::run(field.as_deref()),
        Command::Cards { file } => commands::cards::run(file.as_deref()),
        Command::Chat { message, field, specialty, optimization, replay } => {
            commands::chat::run(commands::chat::ChatOptions {
                message: &message,
                field: field.as_deref(),
                specialty: specialty.as_deref(),
                optimization: optimization.as_deref(),
                replay: replay.as_deref(),
            })
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            let (passed, output) = commands::doctor::run(json);
            commands::CommandResult { exit_code: if passed { 0 } else { 1 }, output }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
