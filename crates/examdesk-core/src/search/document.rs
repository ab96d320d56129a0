//! Document records produced by file ingestion

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// An uploaded study document.
///
/// Its identity in search is its position in the corpus slice, which is not
/// stable across rebuilds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub name: String,

    #[serde(default)]
    pub content: String,

    /// Subject code such as `toanHoc`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// MIME type or extension reported by ingestion
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_info: Option<ExamInfo>,
}

/// Exam details detected for a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_type: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<i32>,

    /// Any further fields (semester, duration, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Document {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_file_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = Some(file_type.into());
        self
    }

    pub fn with_upload_date(mut self, date: DateTime<Utc>) -> Self {
        self.upload_date = Some(date);
        self
    }

    pub fn with_exam_info(mut self, exam_info: ExamInfo) -> Self {
        self.metadata.exam_info = Some(exam_info);
        self
    }

    pub fn exam_type(&self) -> Option<&str> {
        self.metadata
            .exam_info
            .as_ref()
            .and_then(|info| info.exam_type.as_deref())
    }

    pub fn exam_year(&self) -> Option<i32> {
        self.metadata.exam_info.as_ref().and_then(|info| info.year)
    }

    /// Lowercased `name content subject`, used for substring matching
    pub(crate) fn match_text(&self) -> String {
        format!(
            "{} {} {}",
            self.name,
            self.content,
            self.subject.as_deref().unwrap_or("")
        )
        .to_lowercase()
    }

    /// Everything fed to the tokenizer: match text plus exam info scalars
    pub(crate) fn index_text(&self) -> String {
        let mut text = format!(
            "{} {} {}",
            self.name,
            self.content,
            self.subject.as_deref().unwrap_or("")
        );
        if let Some(info) = &self.metadata.exam_info {
            for value in info.scalar_values() {
                text.push(' ');
                text.push_str(&value);
            }
        }
        text
    }
}

impl ExamInfo {
    pub fn new(exam_type: impl Into<String>, year: i32) -> Self {
        Self {
            exam_type: Some(exam_type.into()),
            year: Some(year),
            extra: BTreeMap::new(),
        }
    }

    /// String forms of every scalar field; arrays, objects and nulls are skipped
    pub fn scalar_values(&self) -> Vec<String> {
        let mut values = Vec::new();
        if let Some(exam_type) = &self.exam_type {
            values.push(exam_type.clone());
        }
        if let Some(year) = self.year {
            values.push(year.to_string());
        }
        for value in self.extra.values() {
            match value {
                serde_json::Value::String(s) => values.push(s.clone()),
                serde_json::Value::Number(n) => values.push(n.to_string()),
                serde_json::Value::Bool(b) => values.push(b.to_string()),
                _ => {}
            }
        }
        values
    }
}

/// Years arrive as numbers or numeric strings depending on the ingester
fn deserialize_year<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawYear {
        Number(i64),
        Text(String),
    }

    Ok(match Option::<RawYear>::deserialize(deserializer)? {
        Some(RawYear::Number(n)) => i32::try_from(n).ok(),
        Some(RawYear::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_ingested_record() {
        let json = r#"{
            "name": "de_toan_2023.pdf",
            "content": "Cau 1: tinh gioi han",
            "subject": "toanHoc",
            "type": "application/pdf",
            "uploadDate": "2024-03-01T08:00:00Z",
            "metadata": {"examInfo": {"examType": "cuoiKy", "year": "2023", "semester": 2}}
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();

        assert_eq!(doc.subject.as_deref(), Some("toanHoc"));
        assert_eq!(doc.file_type.as_deref(), Some("application/pdf"));
        assert_eq!(doc.exam_type(), Some("cuoiKy"));
        assert_eq!(doc.exam_year(), Some(2023));
        let info = doc.metadata.exam_info.as_ref().unwrap();
        assert_eq!(info.extra["semester"], 2);
    }

    #[test]
    fn test_minimal_record() {
        let doc: Document = serde_json::from_str(r#"{"name": "notes.txt"}"#).unwrap();
        assert_eq!(doc.content, "");
        assert!(doc.subject.is_none());
        assert!(doc.metadata.exam_info.is_none());
    }

    #[test]
    fn test_scalar_values_skip_nested() {
        let mut info = ExamInfo::new("giuaKy", 2022);
        info.extra
            .insert("room".to_string(), serde_json::json!("A101"));
        info.extra
            .insert("topics".to_string(), serde_json::json!(["a", "b"]));
        assert_eq!(info.scalar_values(), vec!["giuaKy", "2022", "A101"]);
    }

    #[test]
    fn test_index_text_includes_exam_info() {
        let doc = Document::new("de.pdf", "noi dung")
            .with_subject("vatLy")
            .with_exam_info(ExamInfo::new("cuoiKy", 2021));
        let text = doc.index_text();
        assert!(text.contains("vatLy"));
        assert!(text.contains("cuoiKy"));
        assert!(text.contains("2021"));
        assert!(!doc.match_text().contains("cuoiky"));
    }
}
