//! Local document search
//!
//! Provides:
//! - Inverted index over uploaded documents
//! - Free-text queries with attribute filters
//! - Suggestions, highlighting and filter discovery

mod document;
mod filters;
mod highlight;
mod index;
mod suggestions;

pub use document::{Document, DocumentMetadata, ExamInfo};
pub use filters::{available_filters, AvailableFilters, DateRange, FilterSet};
pub use highlight::highlight;
pub use index::{tokenize, SearchIndex};
pub use suggestions::{subject_display_name, suggestions, DEFAULT_SUGGESTION_LIMIT};
