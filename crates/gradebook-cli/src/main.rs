//! gradebook CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "gradebook", version, about = "Academic grade evaluation engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a single student's scores
    Evaluate {
        /// Unit 1 score (0-10)
        #[arg(long, allow_hyphen_values = true)]
        unit1: f64,

        /// Unit 2 score (0-10)
        #[arg(long, allow_hyphen_values = true)]
        unit2: f64,

        /// Unit 3 score (0-10)
        #[arg(long, allow_hyphen_values = true)]
        unit3: f64,

        /// Unit 4 score (0-10)
        #[arg(long, allow_hyphen_values = true)]
        unit4: f64,

        /// Recovery exam for units 1 and 2
        #[arg(long, allow_hyphen_values = true)]
        noa1: Option<f64>,

        /// Recovery exam for units 3 and 4
        #[arg(long, allow_hyphen_values = true)]
        noa2: Option<f64>,

        /// Attendance ratio (0-1)
        #[arg(long, allow_hyphen_values = true)]
        attendance: f64,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Evaluate class rosters and write reports
    Run {
        /// Path to .toml roster or directory
        #[arg(long)]
        roster: PathBuf,

        /// Output directory
        #[arg(long, default_value = "./gradebook-results")]
        output: PathBuf,

        /// Output format: json, html, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Only list students matching these statuses (approved, reproved, pending, noa)
        #[arg(long)]
        filter: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two class reports (e.g. before and after recovery exams)
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Exit code 1 if any student's classification got worse
        #[arg(long)]
        fail_on_demotion: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Validate roster TOML files
    Validate {
        /// Path to roster file or directory
        #[arg(long)]
        roster: PathBuf,
    },

    /// Print the grading rules
    Rules {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example roster
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gradebook=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Evaluate {
            unit1,
            unit2,
            unit3,
            unit4,
            noa1,
            noa2,
            attendance,
            format,
            config,
        } => commands::evaluate::execute(
            [unit1, unit2, unit3, unit4],
            noa1,
            noa2,
            attendance,
            format,
            config,
        ),
        Commands::Run {
            roster,
            output,
            format,
            filter,
            config,
        } => commands::run::execute(roster, output, format, filter, config),
        Commands::Compare {
            baseline,
            current,
            fail_on_demotion,
            format,
        } => commands::compare::execute(baseline, current, fail_on_demotion, format),
        Commands::Validate { roster } => commands::validate::execute(roster),
        Commands::Rules { config } => commands::rules::execute(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
