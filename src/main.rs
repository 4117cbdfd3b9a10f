use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "gridq")]
#[command(version, about = "Q-learning grid navigation with a shortest-path reward oracle", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an agent on a map and dump its diagnostics
    Train(gridq::cli::TrainArgs),
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gridq=info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => {
            let outcome = gridq::cli::execute(args)?;
            tracing::info!(
                episodes = outcome.report.episodes,
                terminal = outcome.report.terminal_episodes,
                final_epsilon = outcome.report.final_epsilon,
                stats = %outcome.stats_path.display(),
                rewards = %outcome.rewards_path.display(),
                "training finished"
            );
            Ok(())
        }
    }
}
