use std::path::PathBuf;

use advection_convergence::{
    config::StudyConfig,
    pipeline::{analyze_all, run_study, solve_task},
    schema::{FluxScheme, InitialCondition, RefinementLevel},
    store::{create_store, Store},
};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(about = "Convergence study for periodic linear advection schemes")]
struct Cli {
    /// JSON study configuration; defaults are used when omitted
    #[arg(short, long, env = "ADVECTION_STUDY_CONFIG")]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the store and its schema if it does not exist yet
    Init,
    /// Compute and record a single solution
    Solve {
        condition: InitialCondition,
        scheme: FluxScheme,
        /// Refinement exponent in [6, 16]
        k: u32,
    },
    /// Conservation check and convergence tables for every computation
    Analyze,
    /// Init, solve every missing level, analyze
    Run,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match cli.config.as_deref() {
        Some(path) => StudyConfig::from_json_file(path)?,
        None => StudyConfig::default(),
    };

    match cli.command {
        Command::Init => {
            create_store(&config)?;
        }
        Command::Solve {
            condition,
            scheme,
            k,
        } => {
            let store = Store::open(&config.store_root)?;
            solve_task(&store, condition, scheme, RefinementLevel::new(k)?)?;
        }
        Command::Analyze => {
            let store = Store::open(&config.store_root)?;
            let analysis = analyze_all(&store, &config);
            print!("{}", analysis.conservation);
            for failure in &analysis.failures {
                println!("skipped {}: {}", failure.unit, failure.reason);
            }
        }
        Command::Run => {
            let summary = run_study(&config)?;
            println!(
                "solved {} task(s), {} already present, {} failed",
                summary.solve.solved,
                summary.solve.skipped,
                summary.solve.failures.len()
            );
            println!(
                "wrote {} convergence table(s) to {}",
                summary.analysis.tables.len(),
                config.report_dir.display()
            );
            print!("{}", summary.analysis.conservation);
            for failure in &summary.analysis.failures {
                println!("skipped {}: {}", failure.unit, failure.reason);
            }
        }
    }

    Ok(())
}
