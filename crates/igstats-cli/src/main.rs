mod manual;
mod output;
mod run;
mod targets;

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "igstats")]
#[command(about = "Instagram post engagement statistics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch statistics for post links from the link file or stdin
    Links {
        /// Link file, one URL per line (defaults to `IGSTATS_LINKS_PATH`)
        #[arg(long)]
        file: Option<PathBuf>,
        /// Use unauthenticated public page access if login fails
        #[arg(long)]
        fallback_public: bool,
    },
    /// Fetch statistics for the most recent posts of one account
    Account {
        /// Account handle (defaults to `INSTAGRAM_USERNAME`)
        #[arg(long)]
        username: Option<String>,
        /// Number of posts (defaults to `IGSTATS_ACCOUNT_POST_LIMIT`)
        #[arg(long, value_parser = parse_limit)]
        limit: Option<usize>,
    },
    /// Type statistics in by hand
    Manual {
        #[arg(long, default_value_t = 5)]
        count: usize,
    },
    /// Check post pages without logging in (no engagement counters)
    Public {
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn parse_limit(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match igstats_core::load_app_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let env_filter = match EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))
    {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("Invalid log filter: {e}");
            return ExitCode::FAILURE;
        }
    };
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: could not start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let code = runtime.block_on(run_or_cancel(
        dispatch(cli.command, &config),
        tokio::signal::ctrl_c(),
    ));

    // A stdin read still blocked in a worker must not keep the process alive.
    runtime.shutdown_background();
    code
}

/// Races `run` against `interrupt`. An interrupt that fails to install is
/// logged and never fires.
async fn run_or_cancel<R, I>(run: R, interrupt: I) -> ExitCode
where
    R: Future<Output = anyhow::Result<ExitCode>>,
    I: Future<Output = io::Result<()>>,
{
    let interrupted = async {
        if let Err(e) = interrupt.await {
            tracing::warn!(error = %e, "could not listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = run => result.unwrap_or_else(|e| {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }),
        () = interrupted => {
            println!("\nCancelled.");
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(
    command: Commands,
    config: &igstats_core::AppConfig,
) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Links {
            file,
            fallback_public,
        } => run::links(config, file, fallback_public).await,
        Commands::Account { username, limit } => run::account(config, username, limit).await,
        Commands::Manual { count } => run::manual(config, count).await,
        Commands::Public { file } => run::public(config, file).await,
    }
}
