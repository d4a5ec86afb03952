//! Review orchestration for pull requests.
//!
//! Provides the review pipeline: LLM client, prompt construction,
//! event-metadata parsing, and GitHub comment publishing.

pub mod event;
pub mod github;
pub mod llm;
pub mod pipeline;
pub mod prompt;
