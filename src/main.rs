mod cli;
mod gemini_client;
mod openweather_client;
mod settings;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use eyre::{Result, WrapErr};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use crate::cli::chat::ChatContext;
use crate::settings::Settings;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    chat: ChatArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a chat session with the Mega Chef
    Chat(ChatArgs),
}

#[derive(Args, Clone, Default)]
struct ChatArgs {
    /// Send a single message and exit
    #[arg(short, long)]
    input: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Where the conversation history is kept
    #[arg(long, value_name = "PATH")]
    history_file: Option<PathBuf>,

    /// Never look up weather or time, even with an OpenWeather key
    #[arg(long)]
    no_location: bool,

    /// Only accept short replies as a city name when one was asked for
    #[arg(long)]
    strict_city: bool,
}

impl ChatArgs {
    fn apply(&self, settings: &mut Settings) {
        if let Some(path) = &self.history_file {
            settings.history_file = Some(path.clone());
        }
        if self.no_location {
            settings.location_enabled = false;
        }
        if self.strict_city {
            settings.strict_city_replies = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();
    let args = match cli.command {
        Some(Commands::Chat(args)) => args,
        None => cli.chat,
    };

    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };

    // Logs go to stderr so they never interleave with the chat transcript
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .wrap_err("Failed to set tracing subscriber")?;

    info!("Starting Mega Chef chat");

    let mut settings = Settings::from_env();
    args.apply(&mut settings);

    let orchestrator = ChatContext::build_orchestrator(&settings);
    let interactive = args.input.is_none();
    let mut chat_context =
        ChatContext::new(Box::new(io::stdout()), args.input, interactive, orchestrator);
    chat_context.run().await
}
