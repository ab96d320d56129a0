//! Terminal output formatter

use super::{excerpt, subject_label, DocumentRow, FormatOptions};

pub fn format_documents(rows: &[DocumentRow], options: &FormatOptions) -> String {
    let mut output = String::new();

    for row in rows {
        let doc = row.document;
        let mut details = vec![subject_label(doc)];
        if let Some(ref file_type) = doc.file_type {
            details.push(file_type.clone());
        }
        if let Some(exam_type) = doc.exam_type() {
            details.push(exam_type.to_string());
        }
        if let Some(year) = doc.exam_year() {
            details.push(year.to_string());
        }

        output.push_str(&format!(
            "#{:<3} {}  [{}]\n",
            row.position,
            options.apply(&doc.name),
            details.join(", ")
        ));

        if options.highlight.is_some() && !doc.content.is_empty() {
            output.push_str(&format!("     {}\n", options.apply(&excerpt(&doc.content, 160))));
        }
    }

    output
}
