use crate::demo::{run_demo, run_suggest, DemoArgs, SuggestArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use roommate_ai::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Roommate Matcher",
    about = "Generate, inspect, and serve co-renter group suggestions",
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
    /// Generate suggestions for one seeker and print them as JSON
    Suggest(SuggestArgs),
    /// Walk through generation, retrieval, and a status update against the sample seekers
    Demo(DemoArgs),
}

/// Where seeker profiles and lifestyle answers come from.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct DataArgs {
    /// Profile export to load instead of the bundled sample seekers
    #[arg(long)]
    pub(crate) profiles_csv: Option<PathBuf>,
    /// Lifestyle questionnaire export to load instead of the bundled answers
    #[arg(long)]
    pub(crate) lifestyle_csv: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) data: DataArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Suggest(args) => run_suggest(args),
        Command::Demo(args) => run_demo(args),
    }
}
