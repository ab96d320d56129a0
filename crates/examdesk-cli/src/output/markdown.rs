//! Markdown output formatter

use super::{excerpt, subject_label, DocumentRow, FormatOptions};

pub fn format_documents(rows: &[DocumentRow], options: &FormatOptions) -> String {
    let mut output = String::from("# Documents\n\n");

    for row in rows {
        let doc = row.document;
        output.push_str(&format!("## {} `#{}`\n\n", options.apply(&doc.name), row.position));
        output.push_str(&format!("**Subject:** {}\n", subject_label(doc)));
        if let Some(ref file_type) = doc.file_type {
            output.push_str(&format!("**Type:** {}\n", file_type));
        }
        if let Some(exam_type) = doc.exam_type() {
            output.push_str(&format!("**Exam:** {}\n", exam_type));
        }
        if let Some(year) = doc.exam_year() {
            output.push_str(&format!("**Year:** {}\n", year));
        }
        if options.highlight.is_some() && !doc.content.is_empty() {
            output.push_str(&format!("\n> {}\n", options.apply(&excerpt(&doc.content, 200))));
        }
        output.push('\n');
    }

    output
}
