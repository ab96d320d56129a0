//! Term-level inverted index over a document corpus

use super::{Document, FilterSet};
use std::collections::{BTreeSet, HashMap};

/// Shortest indexed token, in characters
const MIN_TOKEN_CHARS: usize = 3;

/// Maps lowercase terms to the corpus positions that contain them.
///
/// The index keeps no reference to the corpus. Callers rebuild after any
/// corpus change and pass the same slice to `search`.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    terms: HashMap<String, BTreeSet<usize>>,
    document_count: usize,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index for `documents`
    pub fn from_documents(documents: &[Document]) -> Self {
        let mut index = Self::new();
        index.build(documents);
        index
    }

    /// Replace the index with one built from `documents`
    pub fn build(&mut self, documents: &[Document]) {
        self.terms.clear();
        self.document_count = documents.len();

        for (position, document) in documents.iter().enumerate() {
            for token in tokenize(&document.index_text()) {
                self.terms.entry(token).or_default().insert(position);
            }
        }

        tracing::debug!(
            "Built search index: {} documents, {} terms",
            self.document_count,
            self.terms.len()
        );
    }

    /// Resolve a free-text query plus filters against `documents`.
    ///
    /// An empty query with no filters returns every document. Results keep
    /// corpus order.
    pub fn search<'a>(
        &self,
        query: &str,
        filters: &FilterSet,
        documents: &'a [Document],
    ) -> Vec<&'a Document> {
        self.search_positions(query, filters, documents)
            .into_iter()
            .filter_map(|position| documents.get(position))
            .collect()
    }

    /// Same as `search`, returning ascending corpus positions
    pub fn search_positions(
        &self,
        query: &str,
        filters: &FilterSet,
        documents: &[Document],
    ) -> Vec<usize> {
        let query = query.trim();
        if query.is_empty() && filters.is_empty() {
            return (0..documents.len()).collect();
        }

        let mut candidates: BTreeSet<usize> = if query.is_empty() {
            (0..documents.len()).collect()
        } else {
            self.match_query(query, documents)
        };

        filters.retain_matching(&mut candidates, documents);
        candidates.into_iter().collect()
    }

    /// Union of index hits for any term and documents containing every term
    fn match_query(&self, query: &str, documents: &[Document]) -> BTreeSet<usize> {
        let lowered = query.to_lowercase();
        let terms: Vec<&str> = lowered.split_whitespace().collect();

        let mut candidates: BTreeSet<usize> = terms
            .iter()
            .filter_map(|term| self.terms.get(*term))
            .flatten()
            .copied()
            .filter(|&position| position < documents.len())
            .collect();

        // Substring pass catches terms embedded in longer tokens
        for (position, document) in documents.iter().enumerate() {
            let text = document.match_text();
            if terms.iter().all(|term| text.contains(term)) {
                candidates.insert(position);
            }
        }

        candidates
    }

    /// Positions indexed under `term` (exact, lowercase)
    pub fn positions_for(&self, term: &str) -> Option<&BTreeSet<usize>> {
        self.terms.get(&term.to_lowercase())
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Number of documents in the last build
    pub fn document_count(&self) -> usize {
        self.document_count
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Whitespace split, lowercase, drop short tokens
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(str::to_lowercase)
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
}
