//! `voicegate ask` - one-shot transcribe-then-chat console utility.
//!
//! Shares nothing with the relay at runtime beyond the config file: it
//! uploads an audio recording for transcription, prints the transcript,
//! then asks the chat model the transcribed question and prints the answer.

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use voicegate_core::Config;

use crate::openai::OpenAIClient;

/// Arguments for the ask command.
#[derive(Args)]
pub struct AskArgs {
    /// Path to the audio recording to transcribe
    pub audio: PathBuf,

    /// Chat model answering the transcribed question
    #[arg(long, default_value = "gpt-4o")]
    pub model: String,
}

/// Transcribe the recording, then ask the chat model.
pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    let config = Config::load_default()
        .with_context(|| format!("loading {}", voicegate_core::config::CONFIG_FILE))?;

    let client = OpenAIClient::new(config.api_key)?;

    let transcript = client
        .transcribe(&args.audio)
        .await
        .with_context(|| format!("transcribing {}", args.audio.display()))?;
    println!("{transcript}");
    println!("-----------------------------");

    let answer = client
        .chat(&transcript, &args.model)
        .await
        .context("chat completion failed")?;
    println!("{answer}");

    Ok(())
}
