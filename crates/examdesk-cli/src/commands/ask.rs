//! Ask command

use crate::app::{AskArgs, OutputFormat};
use anyhow::{Context, Result};
use examdesk_core::{Config, ExamDeskError, GeminiTransport, KeyRing};
use std::path::Path;
use std::sync::Arc;

pub async fn run(
    args: AskArgs,
    config: &mut Config,
    config_path: &Path,
    format: OutputFormat,
) -> Result<()> {
    let question = args.prompt.join(" ");
    if question.trim().is_empty() {
        return Err(ExamDeskError::InvalidInput("question is empty".to_string()).into());
    }

    let context = match args.context_file {
        Some(ref path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read context file {}", path.display()))?,
        None => String::new(),
    };

    let transport = Arc::new(GeminiTransport::new(&config.generation)?);
    let mut ring = KeyRing::from_config(
        &config.keyring.with_env_keys(),
        config.generation.clone(),
        transport,
    );

    let outcome = ring.send(&question, &context).await;

    // Environment keys sit after the saved ones and are never persisted
    let saved = config.keyring.keys.len();
    let mut state = ring.to_config();
    state.stats.truncate(saved);
    config.keyring.stats = state.stats;
    if state.current_index < saved {
        config.keyring.current_index = state.current_index;
    }
    if saved > 0 {
        config.save_to(config_path)?;
    }

    let completion = outcome?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&completion)?),
        _ => {
            println!("{}", completion.message);
            if let Some(usage) = completion.usage {
                tracing::info!(
                    "Answered with key {} ({} tokens)",
                    completion.used_slot_index,
                    usage.total_tokens
                );
            }
        }
    }
    Ok(())
}
