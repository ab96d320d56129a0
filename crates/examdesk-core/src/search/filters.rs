//! Attribute filters and filter discovery

use super::{Document, SearchIndex};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Inclusive upload-date bounds; a missing bound is open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }

    fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Attribute filters selected in the UI. Empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSet {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub exam_type: Option<String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn with_file_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = Some(file_type.into());
        self
    }

    pub fn with_exam_type(mut self, exam_type: impl Into<String>) -> Self {
        self.exam_type = Some(exam_type.into());
        self
    }

    /// True when no filter would drop anything
    pub fn is_empty(&self) -> bool {
        set(&self.subject).is_none()
            && self.date_range().is_none()
            && set(&self.file_type).is_none()
            && set(&self.exam_type).is_none()
    }

    fn date_range(&self) -> Option<&DateRange> {
        self.date_range.as_ref().filter(|range| !range.is_open())
    }

    /// Intersect `candidates` with each active filter in turn:
    /// subject, upload date, file type, exam type.
    pub(crate) fn retain_matching(&self, candidates: &mut BTreeSet<usize>, documents: &[Document]) {
        if let Some(subject) = set(&self.subject) {
            candidates.retain(|&i| {
                documents.get(i).and_then(|d| d.subject.as_deref()) == Some(subject)
            });
        }

        if let Some(range) = self.date_range() {
            candidates.retain(|&i| {
                documents
                    .get(i)
                    .and_then(|d| d.upload_date)
                    .is_some_and(|date| range.contains(date))
            });
        }

        if let Some(file_type) = set(&self.file_type) {
            candidates.retain(|&i| {
                documents.get(i).and_then(|d| d.file_type.as_deref()) == Some(file_type)
            });
        }

        if let Some(exam_type) = set(&self.exam_type) {
            candidates.retain(|&i| documents.get(i).and_then(|d| d.exam_type()) == Some(exam_type));
        }
    }
}

fn set(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Distinct attribute values present in a corpus
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableFilters {
    pub subjects: Vec<String>,
    pub file_types: Vec<String>,
    pub exam_types: Vec<String>,
    /// Newest first
    pub years: Vec<i32>,
}

impl SearchIndex {
    /// Collect filter options from `documents` in a single pass
    pub fn available_filters(&self, documents: &[Document]) -> AvailableFilters {
        available_filters(documents)
    }
}

pub fn available_filters(documents: &[Document]) -> AvailableFilters {
    let mut subjects = BTreeSet::new();
    let mut file_types = BTreeSet::new();
    let mut exam_types = BTreeSet::new();
    let mut years = HashSet::new();

    for document in documents {
        if let Some(subject) = set(&document.subject) {
            subjects.insert(subject.to_string());
        }
        if let Some(file_type) = set(&document.file_type) {
            file_types.insert(file_type.to_string());
        }
        if let Some(exam_type) = document.exam_type().filter(|e| !e.is_empty()) {
            exam_types.insert(exam_type.to_string());
        }
        if let Some(year) = document.exam_year() {
            years.insert(year);
        }
    }

    let mut years: Vec<i32> = years.into_iter().collect();
    years.sort_unstable_by(|a, b| b.cmp(a));

    AvailableFilters {
        subjects: subjects.into_iter().collect(),
        file_types: file_types.into_iter().collect(),
        exam_types: exam_types.into_iter().collect(),
        years,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::ExamInfo;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn corpus() -> Vec<Document> {
        vec![
            Document::new("a.pdf", "")
                .with_subject("toanHoc")
                .with_file_type("application/pdf")
                .with_upload_date(day(1))
                .with_exam_info(ExamInfo::new("cuoiKy", 2022)),
            Document::new("b.docx", "")
                .with_subject("toanHoc")
                .with_file_type("application/msword")
                .with_upload_date(day(10))
                .with_exam_info(ExamInfo::new("giuaKy", 2023)),
            Document::new("c.pdf", "")
                .with_subject("vatLy")
                .with_file_type("application/pdf"),
        ]
    }

    fn run(filters: &FilterSet, docs: &[Document]) -> Vec<usize> {
        let mut candidates: BTreeSet<usize> = (0..docs.len()).collect();
        filters.retain_matching(&mut candidates, docs);
        candidates.into_iter().collect()
    }

    #[test]
    fn test_empty_strings_are_unset() {
        let filters = FilterSet {
            subject: Some(String::new()),
            date_range: Some(DateRange::default()),
            ..Default::default()
        };
        assert!(filters.is_empty());
        assert!(FilterSet::new().is_empty());
        assert!(!FilterSet::new().with_exam_type("cuoiKy").is_empty());
    }

    #[test]
    fn test_subject_filter_is_exact() {
        let docs = corpus();
        assert_eq!(run(&FilterSet::new().with_subject("toanHoc"), &docs), vec![0, 1]);
        assert!(run(&FilterSet::new().with_subject("toan"), &docs).is_empty());
    }

    #[test]
    fn test_date_range_inclusive_and_drops_undated() {
        let docs = corpus();
        let range = DateRange::new(Some(day(1)), Some(day(10)));
        assert_eq!(run(&FilterSet::new().with_date_range(range), &docs), vec![0, 1]);

        let open_start = DateRange::new(None, Some(day(5)));
        assert_eq!(run(&FilterSet::new().with_date_range(open_start), &docs), vec![0]);
    }

    #[test]
    fn test_filters_chain_as_intersection() {
        let docs = corpus();
        let filters = FilterSet::new()
            .with_file_type("application/pdf")
            .with_exam_type("cuoiKy");
        assert_eq!(run(&filters, &docs), vec![0]);
    }

    #[test]
    fn test_available_filters() {
        let filters = available_filters(&corpus());
        assert_eq!(filters.subjects, vec!["toanHoc", "vatLy"]);
        assert_eq!(
            filters.file_types,
            vec!["application/msword", "application/pdf"]
        );
        assert_eq!(filters.exam_types, vec!["cuoiKy", "giuaKy"]);
        assert_eq!(filters.years, vec![2023, 2022]);
    }

    #[test]
    fn test_available_filters_empty_corpus() {
        assert_eq!(available_filters(&[]), AvailableFilters::default());
    }
}
