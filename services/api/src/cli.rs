use crate::report::{
    run_context, run_evaluation, run_summaries, ContextArgs, EvaluateArgs, SummariesArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use morph_ai::config::AppConfig;
use morph_ai::error::AppError;
use morph_ai::telemetry::{self, LogTarget};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Morph.ai",
    about = "Evaluate weekly employee KPIs and surveys, and serve the results over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate one weekly batch from CSV exports and print the report
    Evaluate(EvaluateArgs),
    /// List stored evaluation summaries
    Summaries(SummariesArgs),
    /// Print the context block an assistant receives before a chat message
    Context(ContextArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the summary store path
    #[arg(long)]
    pub(crate) store: Option<PathBuf>,
}

fn cli_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogTarget::Cli)?;
    Ok(config)
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => {
            let config = cli_config()?;
            tokio::task::spawn_blocking(move || run_evaluation(&config, args)).await?
        }
        Command::Summaries(args) => run_summaries(&cli_config()?, args),
        Command::Context(args) => run_context(&cli_config()?, args),
    }
}
