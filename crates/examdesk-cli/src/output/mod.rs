//! Output formatters

pub mod csv;
pub mod json;
pub mod markdown;
pub mod terminal;

use crate::app::OutputFormat;
use examdesk_core::search::subject_display_name;
use examdesk_core::{highlight, Document};

/// A document together with its position in the store
pub struct DocumentRow<'a> {
    pub position: usize,
    pub document: &'a Document,
}

/// Format options
#[derive(Default)]
pub struct FormatOptions {
    /// Query whose terms are wrapped in `<mark>` tags
    pub highlight: Option<String>,
}

impl FormatOptions {
    fn apply(&self, text: &str) -> String {
        match self.highlight {
            Some(ref query) => highlight(text, query),
            None => text.to_string(),
        }
    }
}

/// Format a list of documents
pub fn format_documents(rows: &[DocumentRow], format: OutputFormat, options: &FormatOptions) -> String {
    match format {
        OutputFormat::Json => json::format_documents(rows, options),
        OutputFormat::Csv => csv::format_documents(rows, options),
        OutputFormat::Md => markdown::format_documents(rows, options),
        OutputFormat::Cli => terminal::format_documents(rows, options),
    }
}

fn subject_label(document: &Document) -> String {
    document
        .subject
        .as_deref()
        .map(subject_display_name)
        .unwrap_or("-")
        .to_string()
}

/// Leading part of the content, cut on a character boundary
fn excerpt(content: &str, max_chars: usize) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        assert_eq!(excerpt("Giới   hạn\nhàm số", 100), "Giới hạn hàm số");
        assert_eq!(excerpt("Giới hạn hàm số", 4), "Giới...");
    }

    #[test]
    fn test_subject_label_uses_display_name() {
        let doc = Document::new("a.pdf", "").with_subject("vanHoc");
        assert_eq!(subject_label(&doc), "Văn học");
        assert_eq!(subject_label(&Document::new("b.pdf", "")), "-");
    }
}
