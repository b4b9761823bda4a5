#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod command;

use chatrs_conversation::ClearPolicy;
use clap::{Parser, Subcommand};
use command::{
    ChatInput, ChatOverrides, ChatStrategy, CommandStrategy, InfoStrategy, InitStrategy,
    ModelsStrategy, VersionStrategy,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "chatrs")]
#[command(about = "Conversational chatbot with message history", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat interactively, or send a single message
    Chat {
        /// Single message to send
        #[arg(short = 'm', long)]
        message: Option<String>,

        /// Model to use
        #[arg(short = 'M', long)]
        model: Option<String>,

        /// Sampling temperature (0.0 to 1.0)
        #[arg(short = 't', long)]
        temperature: Option<f32>,

        /// Maximum response length in tokens
        #[arg(long, value_parser = clap::value_parser!(u32).range(50..=300))]
        max_tokens: Option<u32>,

        /// API key (overrides GROQ_API_KEY and the config file)
        #[arg(long)]
        api_key: Option<String>,

        /// What /clear wipes: clear-both or display-only
        #[arg(long)]
        clear_policy: Option<ClearPolicy>,
    },
    /// Initialize configuration
    Init,
    /// Show configuration
    Info,
    /// List supported models
    Models,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            message,
            model,
            temperature,
            max_tokens,
            api_key,
            clear_policy,
        } => {
            let input = ChatInput {
                message,
                overrides: ChatOverrides {
                    api_key,
                    model,
                    temperature,
                    max_tokens,
                    clear_policy,
                },
            };
            ChatStrategy.execute(input).await
        }
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Info => InfoStrategy.execute(()).await,
        Commands::Models => ModelsStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
