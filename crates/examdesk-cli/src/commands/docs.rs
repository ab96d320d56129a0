//! Document store commands

use crate::app::{DocsAction, DocsArgs, OutputFormat};
use crate::output::{self, DocumentRow, FormatOptions};
use anyhow::{Context, Result};
use chrono::Utc;
use examdesk_core::{Document, DocumentStore, ExamInfo};
use std::path::Path;

pub async fn run(args: DocsArgs, store_path: &Path, format: OutputFormat) -> Result<()> {
    let mut store = DocumentStore::open(store_path)?;

    match args.action {
        DocsAction::Add {
            file,
            name,
            subject,
            file_type,
            exam_type,
            year,
        } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let name = name.unwrap_or_else(|| {
                file.file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("unnamed")
                    .to_string()
            });

            let mut document = Document::new(name, content).with_upload_date(Utc::now());
            if let Some(subject) = subject {
                document = document.with_subject(subject);
            }
            document = document.with_file_type(file_type.unwrap_or_else(|| guess_mime(&file)));
            if exam_type.is_some() || year.is_some() {
                document = document.with_exam_info(ExamInfo {
                    exam_type,
                    year,
                    ..Default::default()
                });
            }

            let position = store.add(document);
            store.save()?;
            println!(
                "Added document '{}' at position {}",
                store.documents()[position].name,
                position
            );
        }
        DocsAction::List => {
            if store.is_empty() && format == OutputFormat::Cli {
                println!("No documents");
            } else {
                let rows: Vec<DocumentRow> = store
                    .documents()
                    .iter()
                    .enumerate()
                    .map(|(position, document)| DocumentRow { position, document })
                    .collect();
                print!(
                    "{}",
                    output::format_documents(&rows, format, &FormatOptions::default())
                );
            }
        }
        DocsAction::Remove { position } => {
            let removed = store.remove(position)?;
            store.save()?;
            println!("Removed document '{}'", removed.name);
        }
    }
    Ok(())
}

fn guess_mime(path: &Path) -> String {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "html" | "htm" => "text/html",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
    .to_string()
}
