//! JSON output formatter

use super::{DocumentRow, FormatOptions};

pub fn format_documents(rows: &[DocumentRow], options: &FormatOptions) -> String {
    let output: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            let doc = row.document;
            let mut value = serde_json::json!({
                "position": row.position,
                "name": doc.name,
                "subject": doc.subject,
                "type": doc.file_type,
                "uploadDate": doc.upload_date,
                "examType": doc.exam_type(),
                "year": doc.exam_year(),
            });
            if options.highlight.is_some() {
                value["highlightedName"] = serde_json::Value::String(options.apply(&doc.name));
                value["highlightedContent"] = serde_json::Value::String(options.apply(&doc.content));
            }
            value
        })
        .collect();

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "[]".to_string()) + "\n"
}
