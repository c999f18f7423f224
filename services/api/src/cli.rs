use crate::screen::{run_rank, run_score, RankArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use jobboard::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "jobboard",
    about = "Run the job board service or screen PDF resumes from the command line",
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
    /// Rank every PDF resume in a folder by raw keyword matches
    Rank(RankArgs),
    /// Extract a single PDF resume and print its ATS score as JSON
    Score(ScoreArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the directory holding users, jobs, and applications
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Override the directory where uploaded resumes are stored
    #[arg(long)]
    pub(crate) upload_dir: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Rank(args) => run_rank(args, &mut std::io::stdout().lock()),
        Command::Score(args) => run_score(args, &mut std::io::stdout().lock()),
    }
}
