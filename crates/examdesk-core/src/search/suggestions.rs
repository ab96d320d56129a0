//! Type-ahead suggestions and the subject catalogue

use super::{Document, SearchIndex};
use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};

/// Default number of suggestions returned
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

lazy_static! {
    static ref SUBJECT_NAMES: HashMap<&'static str, &'static str> = HashMap::from([
        ("toanHoc", "Toán cao cấp"),
        ("vatLy", "Vật lý đại cương"),
        ("hoaHoc", "Hóa học"),
        ("sinhHoc", "Sinh học"),
        ("vanHoc", "Văn học"),
        ("tiengAnh", "Tiếng Anh"),
        ("lichSu", "Lịch sử"),
        ("diaLy", "Địa lý"),
        ("tinHoc", "Tin học đại cương"),
        ("kinhTe", "Kinh tế học"),
        ("trietHoc", "Triết học"),
    ]);
}

/// Display name for a subject code; unknown codes are shown as-is
pub fn subject_display_name(code: &str) -> &str {
    SUBJECT_NAMES.get(code).copied().unwrap_or(code)
}

impl SearchIndex {
    /// Suggest file names, subjects and exam types matching `partial`.
    ///
    /// Queries shorter than two characters yield nothing.
    pub fn suggestions(&self, partial: &str, documents: &[Document], limit: usize) -> Vec<String> {
        suggestions(partial, documents, limit)
    }
}

pub fn suggestions(partial: &str, documents: &[Document], limit: usize) -> Vec<String> {
    let needle = partial.trim().to_lowercase();
    if needle.chars().count() < 2 {
        return Vec::new();
    }

    let mut found = Suggestions::new(limit);

    for document in documents {
        if document.name.to_lowercase().contains(&needle) {
            found.push(&document.name);
        }
    }

    for code in documents.iter().filter_map(|d| d.subject.as_deref()) {
        let name = subject_display_name(code);
        if code.to_lowercase().contains(&needle) || name.to_lowercase().contains(&needle) {
            found.push(name);
        }
    }

    for exam_type in documents.iter().filter_map(|d| d.exam_type()) {
        if exam_type.to_lowercase().contains(&needle) {
            found.push(exam_type);
        }
    }

    found.into_vec()
}

/// First-found, deduplicated, capped list
struct Suggestions {
    items: Vec<String>,
    seen: HashSet<String>,
    limit: usize,
}

impl Suggestions {
    fn new(limit: usize) -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            limit,
        }
    }

    fn push(&mut self, value: &str) {
        if self.items.len() < self.limit && self.seen.insert(value.to_string()) {
            self.items.push(value.to_string());
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.items
    }
}
