//! Prompt and comment text.

use critique_core::{DiffResult, ReviewText};

/// Build the single user message asking for a review of `diff` in `language`.
///
/// # Examples
///
/// ```
/// use critique_core::DiffResult;
/// use critique_review::prompt::build_review_prompt;
///
/// let prompt = build_review_prompt(&DiffResult::new("+new line"), "Japanese");
/// assert!(prompt.contains("+new line"));
/// assert!(prompt.contains("in Japanese"));
/// ```
pub fn build_review_prompt(diff: &DiffResult, language: &str) -> String {
    format!(
        "You are an excellent software engineer. Please propose some refactoring by \
         looking at the output of the following `git diff`. Please provide your \
         response in {language} using bullet points.\n```\n{}\n```",
        diff.as_str()
    )
}

/// Render the pull-request comment body: the review under a level-two heading.
///
/// # Examples
///
/// ```
/// use critique_core::ReviewText;
/// use critique_review::prompt::format_comment;
///
/// let body = format_comment("Review", &ReviewText::new("Looks good"));
/// assert_eq!(body, "## Review\n\nLooks good");
/// ```
pub fn format_comment(heading: &str, review: &ReviewText) -> String {
    format!("## {heading}\n\n{}", review.as_str())
}
