use clap::{Parser, Subcommand};

mod commands;

use commands::{
    BatchArgs, ChiSquareArgs, CompareArgs, ConvergenceArgs, DieArgs, PlayArgs, SimulateArgs,
    ZTestArgs,
};
use rollquest_core::{AppConfig, ConfigLoader};

#[derive(Parser)]
#[command(name = "rollquest")]
#[command(about = "Weighted dice wagering simulator and statistical analyzer", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, default_value = "config/Config.toml")]
    config: String,

    /// Config profile overlay (loads Config.<profile>.toml next to the config file)
    #[arg(long, global = true, env = "ROLLQUEST_PROFILE")]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show probabilities and moments of a die
    Die(DieArgs),
    /// Run a single Monte Carlo betting simulation
    Simulate(SimulateArgs),
    /// Track how the empirical hit rate of a face converges
    Convergence(ConvergenceArgs),
    /// Run many independent simulations and report risk statistics
    Batch(BatchArgs),
    /// Chi-square goodness-of-fit test on per-face counts
    ChiSquare(ChiSquareArgs),
    /// Z-test of a win proportion against an expected probability
    ZTest(ZTestArgs),
    /// Compare a fair die against a tweaked die with identical parameters
    Compare(CompareArgs),
    /// Play rounds of the betting game as a player session
    Play(PlayArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON on stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli.config, cli.profile.as_deref())?;

    match cli.command {
        Commands::Die(args) => commands::run_die(args)?,
        Commands::Simulate(args) => commands::run_simulate(args, &config)?,
        Commands::Convergence(args) => commands::run_convergence(args, &config)?,
        Commands::Batch(args) => commands::run_batch(args, &config)?,
        Commands::ChiSquare(args) => commands::run_chi_square(args)?,
        Commands::ZTest(args) => commands::run_z_test(args)?,
        Commands::Compare(args) => commands::run_compare(args, &config)?,
        Commands::Play(args) => commands::run_play(args, &config)?,
    }

    Ok(())
}

fn load_config(path: &str, profile: Option<&str>) -> anyhow::Result<AppConfig> {
    let config = match profile {
        Some(profile) => ConfigLoader::load_with_profile(path, profile)?,
        None => ConfigLoader::load_from(path)?,
    };
    tracing::debug!("Loaded configuration from {}", path);
    Ok(config)
}
