//! Query term highlighting

use regex::{Captures, Regex};

/// Wrap each query term in `<mark>` tags, case-insensitively.
///
/// Terms are applied one after another to the already-marked text, so a
/// later term can also match inside tags inserted for an earlier one.
pub fn highlight(text: &str, query: &str) -> String {
    let mut marked = text.to_string();

    for term in query.split_whitespace() {
        let pattern = match Regex::new(&format!("(?i){}", regex::escape(term))) {
            Ok(re) => re,
            Err(e) => {
                tracing::debug!("Skipping highlight term {:?}: {}", term, e);
                continue;
            }
        };
        marked = pattern
            .replace_all(&marked, |caps: &Captures| format!("<mark>{}</mark>", &caps[0]))
            .into_owned();
    }

    marked
}
