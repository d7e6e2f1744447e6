use crate::demo::{run_demo, run_poll_snapshot, DemoArgs, PollSnapshotArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use pollboard::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Pollboard",
    about = "Run the poll publication service or inspect a poll board from the command line",
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
    /// Inspect poll data without starting the server
    Polls {
        #[command(subcommand)]
        command: PollsCommand,
    },
    /// Run a seeded end-to-end demo covering listing, voting, and results
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum PollsCommand {
    /// Render the board as it would appear at a given instant
    Snapshot(PollSnapshotArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Polls {
            command: PollsCommand::Snapshot(args),
        } => run_poll_snapshot(args),
        Command::Demo(args) => run_demo(args),
    }
}
