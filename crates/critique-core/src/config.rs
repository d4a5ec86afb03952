use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CritiqueError;
use crate::types::{DiffDirection, RepositoryRef, ResponseSchema};

/// `owner/name` of the repository the workflow runs for.
pub const ENV_REPOSITORY: &str = "GITHUB_REPOSITORY";
/// Token used to clone the repository and post the comment.
pub const ENV_GITHUB_TOKEN: &str = "INPUT_GITHUB_TOKEN";
/// Target branch of the pull request.
pub const ENV_BASE_REF: &str = "GITHUB_BASE_REF";
/// Source branch of the pull request.
pub const ENV_HEAD_REF: &str = "GITHUB_HEAD_REF";
/// Optional path of the ignore file inside the checkout.
pub const ENV_IGNORE_PATH: &str = "INPUT_REVIEW_IGNORE_PATH";
/// Credential for the completion endpoint.
pub const ENV_API_KEY: &str = "INPUT_OPENAI_API_KEY";
/// Optional natural language for the review.
pub const ENV_LANGUAGE: &str = "INPUT_LANGUAGE";
/// JSON document describing the triggering event.
pub const ENV_EVENT_PATH: &str = "GITHUB_EVENT_PATH";
/// Optional model override.
pub const ENV_MODEL: &str = "INPUT_MODEL";
/// Optional completion endpoint override.
pub const ENV_ENDPOINT: &str = "INPUT_ENDPOINT";
/// Optional GitHub API root (set by GitHub Enterprise runners).
pub const ENV_API_URL: &str = "GITHUB_API_URL";

/// Ignore file used when [`ENV_IGNORE_PATH`] is unset.
pub const DEFAULT_IGNORE_PATH: &str = ".review-ignore";
/// Review language used when [`ENV_LANGUAGE`] is unset.
pub const DEFAULT_LANGUAGE: &str = "English";

/// Settings loaded from `.critique.toml`.
///
/// Resolution order: `INPUT_*` env overrides > config file > defaults.
///
/// # Examples
///
/// ```
/// use critique_core::CritiqueConfig;
///
/// let config = CritiqueConfig::default();
/// assert_eq!(config.comment.heading, "Review");
/// assert_eq!(config.diff.remote, "origin");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CritiqueConfig {
    /// Completion endpoint settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// How the diff is computed.
    #[serde(default)]
    pub diff: DiffConfig,
    /// How the comment is rendered.
    #[serde(default)]
    pub comment: CommentConfig,
}

impl CritiqueConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CritiqueError::Io`] if the file cannot be read, or
    /// [`CritiqueError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use critique_core::CritiqueConfig;
    /// use std::path::Path;
    ///
    /// let config = CritiqueConfig::from_file(Path::new(".critique.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, CritiqueError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`CritiqueError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use critique_core::{CritiqueConfig, ResponseSchema};
    ///
    /// let toml = r#"
    /// [llm]
    /// response_schema = "message"
    /// "#;
    /// let config = CritiqueConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.llm.response_schema, ResponseSchema::Message);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, CritiqueError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply `INPUT_MODEL` / `INPUT_ENDPOINT` overrides from `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = non_empty(&lookup, ENV_MODEL) {
            self.llm.model = model;
        }
        if let Some(endpoint) = non_empty(&lookup, ENV_ENDPOINT) {
            self.llm.endpoint = endpoint;
        }
    }
}

/// Completion endpoint configuration.
///
/// # Examples
///
/// ```
/// use critique_core::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.model, "gpt-3.5-turbo");
/// assert!(config.endpoint.ends_with("/v1/chat/completions"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,
    /// Full URL of the chat-completions endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Where the review text lives in the response body.
    #[serde(default)]
    pub response_schema: ResponseSchema,
}

fn default_model() -> String {
    "gpt-3.5-turbo".into()
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".into()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            response_schema: ResponseSchema::default(),
        }
    }
}

/// Diff computation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Remote whose tracking branches are compared. Empty compares local branches.
    #[serde(default = "default_remote")]
    pub remote: String,
    /// Order of the two refs on the `git diff` command line.
    #[serde(default)]
    pub direction: DiffDirection,
}

fn default_remote() -> String {
    "origin".into()
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            direction: DiffDirection::default(),
        }
    }
}

impl DiffConfig {
    /// The configured remote, or `None` when branches are compared locally.
    pub fn remote(&self) -> Option<&str> {
        let remote = self.remote.trim();
        (!remote.is_empty()).then_some(remote)
    }
}

/// Comment rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentConfig {
    /// Text of the level-two heading placed above the review.
    #[serde(default = "default_heading")]
    pub heading: String,
}

fn default_heading() -> String {
    "Review".into()
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self {
            heading: default_heading(),
        }
    }
}

/// A credential that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Per-run inputs read from the workflow environment.
///
/// Validation happens once, before any external call, and reports every
/// problem together.
#[derive(Debug, Clone)]
pub struct ActionConfig {
    pub repository: RepositoryRef,
    pub github_token: Secret,
    pub base_ref: String,
    pub head_ref: String,
    pub ignore_path: PathBuf,
    pub api_key: Secret,
    pub language: String,
    pub event_path: PathBuf,
    /// GitHub API root; `None` targets api.github.com.
    pub api_url: Option<String>,
}

impl ActionConfig {
    /// Read and validate configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`ActionConfig::from_lookup`].
    pub fn from_env() -> Result<Self, CritiqueError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read and validate configuration through `lookup`.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`CritiqueError::InvalidConfig`] listing every missing
    /// variable and a malformed repository identifier, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use critique_core::ActionConfig;
    ///
    /// let env: HashMap<&str, &str> = HashMap::from([
    ///     ("GITHUB_REPOSITORY", "octo/demo"),
    ///     ("INPUT_GITHUB_TOKEN", "ghs_x"),
    ///     ("GITHUB_BASE_REF", "main"),
    ///     ("GITHUB_HEAD_REF", "feature"),
    ///     ("INPUT_OPENAI_API_KEY", "sk-x"),
    ///     ("GITHUB_EVENT_PATH", "/tmp/event.json"),
    /// ]);
    /// let config = ActionConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
    /// assert_eq!(config.language, "English");
    /// assert_eq!(config.ignore_path.to_str(), Some(".review-ignore"));
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CritiqueError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut problems = Vec::new();
        let mut required = |key: &str| {
            let value = non_empty(&lookup, key);
            if value.is_none() {
                problems.push(format!("{key} environment variable must be set"));
            }
            value.unwrap_or_default()
        };

        let repository = required(ENV_REPOSITORY);
        let github_token = required(ENV_GITHUB_TOKEN);
        let base_ref = required(ENV_BASE_REF);
        let head_ref = required(ENV_HEAD_REF);
        let api_key = required(ENV_API_KEY);
        let event_path = required(ENV_EVENT_PATH);

        let repository = if repository.is_empty() {
            None
        } else {
            match RepositoryRef::parse(&repository) {
                Ok(repo) => Some(repo),
                Err(e) => {
                    problems.push(format!("{ENV_REPOSITORY}: {e}"));
                    None
                }
            }
        };

        let ignore_path =
            non_empty(&lookup, ENV_IGNORE_PATH).unwrap_or_else(|| DEFAULT_IGNORE_PATH.into());
        let language = non_empty(&lookup, ENV_LANGUAGE).unwrap_or_else(|| DEFAULT_LANGUAGE.into());
        let api_url = non_empty(&lookup, ENV_API_URL);

        match repository {
            Some(repository) if problems.is_empty() => Ok(Self {
                repository,
                github_token: Secret::new(github_token),
                base_ref,
                head_ref,
                ignore_path: PathBuf::from(ignore_path),
                api_key: Secret::new(api_key),
                language,
                event_path: PathBuf::from(event_path),
                api_url,
            }),
            _ => Err(CritiqueError::InvalidConfig { problems }),
        }
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}
