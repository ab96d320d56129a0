//! API key management commands

use crate::app::{KeysAction, KeysArgs, OutputFormat, Toggle};
use anyhow::Result;
use examdesk_core::llm::mask_key;
use examdesk_core::{Config, ExamDeskError, GeminiTransport, KeyRing, KeyRingReport, SlotHealth};
use std::io::{IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

pub async fn run(
    args: KeysArgs,
    config: &mut Config,
    config_path: &Path,
    format: OutputFormat,
) -> Result<()> {
    let transport = Arc::new(GeminiTransport::new(&config.generation)?);
    let mut ring = KeyRing::from_config(&config.keyring, config.generation.clone(), transport);

    let changed = match args.action {
        KeysAction::Add { key } => {
            let key = key.trim();
            if key.is_empty() {
                return Err(ExamDeskError::InvalidInput("API key is empty".to_string()).into());
            }
            if ring.slots().iter().any(|slot| slot.key == key) {
                println!("Key {} is already configured", mask_key(key));
                false
            } else {
                let index = ring.add_credential(key);
                println!("Added key {} at index {}", mask_key(key), index);
                true
            }
        }
        KeysAction::List => {
            print_report(&ring.health_report(), format)?;
            false
        }
        KeysAction::Remove { index } => {
            let slot = ring
                .remove_credential(index)
                .ok_or(ExamDeskError::CredentialNotFound(index))?;
            println!("Removed key {}", mask_key(&slot.key));
            true
        }
        KeysAction::Rotate => match ring.rotate().map(mask_key) {
            Some(masked) => {
                println!("Current key: {} (index {})", masked, ring.current_index());
                true
            }
            None => {
                println!("Rotation needs at least two keys");
                false
            }
        },
        KeysAction::Select { index } => {
            ring.select(index)?;
            println!("Current key: {} (index {})", mask_key(&ring.slots()[index].key), index);
            true
        }
        KeysAction::Check { index } => {
            if ring.is_empty() {
                return Err(ExamDeskError::NotConfigured.into());
            }
            let indices: Vec<usize> = match index {
                Some(index) => vec![index],
                None => (0..ring.len()).collect(),
            };
            for index in indices {
                ring.check_credential(index).await?;
            }
            print_report(&ring.health_report(), format)?;
            true
        }
        KeysAction::Fallback { state } => {
            let enabled = matches!(state, Toggle::On);
            ring.set_fallback_enabled(enabled);
            println!("Fallback {}", if enabled { "enabled" } else { "disabled" });
            true
        }
    };

    if changed {
        config.keyring = ring.to_config();
        config.save_to(config_path)?;
        tracing::debug!("Saved key ring to {}", config_path.display());
    }
    Ok(())
}

fn print_report(report: &KeyRingReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Csv => {
            println!("index,key,current,health,requests,errors");
            for slot in &report.slots {
                println!(
                    "{},{},{},{},{},{}",
                    slot.index,
                    slot.masked_key,
                    slot.is_current,
                    slot.stats.health.as_str(),
                    slot.stats.request_count,
                    slot.stats.error_count
                );
            }
        }
        OutputFormat::Md => {
            println!("| # | Key | Current | Health | Requests | Errors |");
            println!("|---|-----|---------|--------|----------|--------|");
            for slot in &report.slots {
                println!(
                    "| {} | `{}` | {} | {} | {} | {} |",
                    slot.index,
                    slot.masked_key,
                    if slot.is_current { "yes" } else { "" },
                    slot.stats.health.as_str(),
                    slot.stats.request_count,
                    slot.stats.error_count
                );
            }
        }
        OutputFormat::Cli => print_report_terminal(report)?,
    }
    Ok(())
}

fn print_report_terminal(report: &KeyRingReport) -> Result<()> {
    let choice = if std::io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);

    if report.slots.is_empty() {
        writeln!(stdout, "No API keys configured")?;
        return Ok(());
    }

    for slot in &report.slots {
        let marker = if slot.is_current { '*' } else { ' ' };
        write!(stdout, "{} {:>2}  {:<16} ", marker, slot.index, slot.masked_key)?;
        stdout.set_color(ColorSpec::new().set_fg(health_color(slot.stats.health)))?;
        write!(stdout, "{:<8}", slot.stats.health.as_str())?;
        stdout.reset()?;
        writeln!(
            stdout,
            "  requests {:>4}  errors {:>4}",
            slot.stats.request_count, slot.stats.error_count
        )?;
        if let Some(ref error) = slot.stats.last_error {
            writeln!(stdout, "      last error: {}", error)?;
        }
    }

    writeln!(stdout)?;
    writeln!(
        stdout,
        "Fallback: {}",
        if report.fallback_enabled { "on" } else { "off" }
    )?;
    Ok(())
}

fn health_color(health: SlotHealth) -> Option<Color> {
    match health {
        SlotHealth::Unknown => None,
        SlotHealth::Active => Some(Color::Green),
        SlotHealth::Limited => Some(Color::Yellow),
        SlotHealth::Error => Some(Color::Red),
    }
}
