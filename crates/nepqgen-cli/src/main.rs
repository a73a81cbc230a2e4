//! nepqgen CLI: generate question papers and score them against NEP 2020.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "nepqgen",
    version,
    about = "NEP 2020 question paper generator and compliance checker"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a question set against the NEP 2020 rubric
    Evaluate {
        /// Question file (.json or .toml) or directory
        #[arg(long)]
        questions: PathBuf,

        /// Paper spec (.json or .toml) with title, subject and total marks
        #[arg(long)]
        paper: Option<PathBuf>,

        /// Rubric TOML overriding the built-in NEP 2020 rubric
        #[arg(long)]
        rubric: Option<PathBuf>,

        /// Output directory (default: output_dir from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, markdown, all (comma-separated)
        #[arg(long, default_value = "json")]
        format: String,

        /// Exit code 1 if the overall score is below this value
        #[arg(long)]
        min_score: Option<f64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate a question paper from a syllabus
    Generate {
        /// Syllabus: structured .json, or any text file to analyze
        #[arg(long)]
        syllabus: PathBuf,

        /// Paper spec (.json or .toml)
        #[arg(long)]
        paper: PathBuf,

        /// Use only the built-in question templates, no model calls
        #[arg(long)]
        offline: bool,

        /// Model as "provider/model" or just "model" for the default provider
        #[arg(long)]
        model: Option<String>,

        /// Output directory (default: output_dir from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, markdown, all (comma-separated)
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two paper reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Score drop (in points, 0-100 scale) counted as a regression
        #[arg(long, default_value = "5.0")]
        threshold: f64,

        /// Exit code 1 if regressions found
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Check question files for common problems
    Validate {
        /// Question file (.json or .toml) or directory
        #[arg(long)]
        questions: PathBuf,

        /// Paper spec to check total marks against
        #[arg(long)]
        paper: Option<PathBuf>,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example paper files
    Init,
}

#[tokio::main]
async fn main() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "nepqgen=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Evaluate {
            questions,
            paper,
            rubric,
            output,
            format,
            min_score,
            config,
        } => commands::evaluate::execute(questions, paper, rubric, output, format, min_score, config),
        Commands::Generate {
            syllabus,
            paper,
            offline,
            model,
            output,
            format,
            config,
        } => {
            commands::generate::execute(syllabus, paper, offline, model, output, format, config)
                .await
        }
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_regression, format),
        Commands::Validate { questions, paper } => commands::validate::execute(questions, paper),
        Commands::ListModels { provider, config } => {
            commands::list_models::execute(provider, config).await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
