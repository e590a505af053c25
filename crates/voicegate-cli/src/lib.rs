//! Voicegate command-line interface.

pub mod commands;
pub mod openai;

use clap::{Parser, Subcommand};

/// Voicegate - realtime relay gateway for OpenAI
#[derive(Parser)]
#[command(name = "voicegate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the relay server
    Serve(commands::serve::ServeArgs),

    /// Transcribe an audio file and ask the chat model about it
    Ask(commands::ask::AskArgs),

    /// Show version information
    Version,
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve(args) => commands::serve::run(args).await,
        Commands::Ask(args) => commands::ask::run(args).await,
        Commands::Version => {
            println!("voicegate {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
