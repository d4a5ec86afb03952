use std::path::PathBuf;

/// Errors that can occur while producing and posting a review.
///
/// Every variant is fatal for the run. Library crates return this type
/// directly; the binary renders it through `miette` at the boundary.
///
/// # Examples
///
/// ```
/// use critique_core::CritiqueError;
///
/// let err = CritiqueError::Config("missing API key".into());
/// assert!(err.to_string().contains("missing API key"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum CritiqueError {
    /// A single invalid or missing setting.
    #[error("configuration error: {0}")]
    #[diagnostic(code(critique::config))]
    Config(String),

    /// Every problem found while validating configuration in one pass.
    #[error("configuration error: {}", .problems.join("; "))]
    #[diagnostic(
        code(critique::config),
        help("set the listed environment variables or adjust .critique.toml")
    )]
    InvalidConfig {
        /// Human-readable description of each problem.
        problems: Vec<String>,
    },

    /// The repository identifier is not of the form `owner/name`.
    #[error("invalid repository name: {0}")]
    #[diagnostic(
        code(critique::config),
        help("GITHUB_REPOSITORY must look like owner/name")
    )]
    InvalidRepository(String),

    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A file that exists could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    ReadFile {
        /// The file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// `git` could not be spawned or exited unsuccessfully.
    #[error("git error: {0}")]
    #[diagnostic(code(critique::git))]
    Git(String),

    /// An HTTP API answered with a non-success status.
    #[error("{service} API error {status}: {body}")]
    #[diagnostic(code(critique::transport))]
    Transport {
        /// Which API failed (`"completion"` or `"GitHub"`).
        service: &'static str,
        /// Numeric HTTP status code.
        status: u16,
        /// Response body or API error message.
        body: String,
    },

    /// The request never produced a response, or the response body was unreadable.
    #[error("{service} request failed: {message}")]
    #[diagnostic(code(critique::transport))]
    Http {
        /// Which API failed.
        service: &'static str,
        /// Description of the failure.
        message: String,
    },

    /// The completion response contained no choices to take a review from.
    #[error("completion response contained no choices")]
    #[diagnostic(code(critique::data))]
    EmptyCompletion,

    /// A JSON document lacked a field the run depends on.
    #[error("{document} is missing `{field}`")]
    #[diagnostic(code(critique::data))]
    MissingField {
        /// Which document was inspected.
        document: &'static str,
        /// Dotted path of the missing field.
        field: &'static str,
    },

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl CritiqueError {
    /// Return the HTTP status code carried by a transport error, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use critique_core::CritiqueError;
    ///
    /// let err = CritiqueError::Transport {
    ///     service: "GitHub",
    ///     status: 404,
    ///     body: "Not Found".into(),
    /// };
    /// assert_eq!(err.status(), Some(404));
    /// assert_eq!(CritiqueError::EmptyCompletion.status(), None);
    /// ```
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}
