//! Prompt assembly for study questions

/// Combine a question with optional reference material.
///
/// Material longer than `max_context_chars` characters is cut on a char
/// boundary.
pub fn build_prompt(question: &str, context: &str, max_context_chars: usize) -> String {
    let context = context.trim();
    if context.is_empty() {
        return question.to_string();
    }

    let truncated = truncate_chars(context, max_context_chars);

    format!(
        r#"You are a study assistant helping a student prepare for exams.
Answer the question using the reference material below. If the material does not cover the question, say so and answer from general knowledge.

Reference material:
{}

Question: {}"#,
        truncated, question
    )
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
