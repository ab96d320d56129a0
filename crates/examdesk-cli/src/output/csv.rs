//! CSV output formatter

use super::{DocumentRow, FormatOptions};

pub fn format_documents(rows: &[DocumentRow], options: &FormatOptions) -> String {
    let mut output = String::from("position,name,subject,type,exam_type,year,uploaded\n");

    for row in rows {
        let doc = row.document;
        output.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            row.position,
            escape_csv(&options.apply(&doc.name)),
            escape_csv(doc.subject.as_deref().unwrap_or("")),
            escape_csv(doc.file_type.as_deref().unwrap_or("")),
            escape_csv(doc.exam_type().unwrap_or("")),
            doc.exam_year().map(|y| y.to_string()).unwrap_or_default(),
            doc.upload_date.map(|d| d.to_rfc3339()).unwrap_or_default()
        ));
    }

    output
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
