//! Core types, configuration, and error handling for critique.
//!
//! This crate provides the shared foundation used by the other critique crates:
//! - [`CritiqueError`]: unified error type using `thiserror` and `miette`
//! - [`CritiqueConfig`]: settings loaded from `.critique.toml`
//! - [`ActionConfig`]: per-run inputs validated from the workflow environment
//! - Shared types: [`RepositoryRef`], [`PullRequestRef`], [`ExclusionList`],
//!   [`DiffResult`], [`ReviewText`]

pub mod config;
mod error;
mod types;

pub use config::{
    ActionConfig, CommentConfig, CritiqueConfig, DiffConfig, LlmConfig, Secret,
    DEFAULT_IGNORE_PATH, DEFAULT_LANGUAGE,
};
pub use error::CritiqueError;
pub use types::{
    DiffDirection, DiffResult, ExclusionList, PullRequestRef, RepositoryRef, ResponseSchema,
    ReviewText,
};

/// A convenience `Result` type for critique operations.
pub type Result<T> = std::result::Result<T, CritiqueError>;
