use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CritiqueError;

/// A GitHub repository identified by owner and name.
///
/// # Examples
///
/// ```
/// use critique_core::RepositoryRef;
///
/// let repo = RepositoryRef::parse("octo/demo").unwrap();
/// assert_eq!(repo.owner, "octo");
/// assert_eq!(repo.name, "demo");
/// assert_eq!(repo.to_string(), "octo/demo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    /// Account or organization owning the repository.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RepositoryRef {
    /// Parse an `owner/name` identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CritiqueError::InvalidRepository`] unless the identifier has
    /// exactly one `/` with text on both sides.
    ///
    /// # Examples
    ///
    /// ```
    /// use critique_core::RepositoryRef;
    ///
    /// assert!(RepositoryRef::parse("a/b/c").is_err());
    /// assert!(RepositoryRef::parse("ab").is_err());
    /// ```
    pub fn parse(identifier: &str) -> Result<Self, CritiqueError> {
        let mut parts = identifier.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => Ok(Self {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            _ => Err(CritiqueError::InvalidRepository(identifier.to_string())),
        }
    }
}

impl FromStr for RepositoryRef {
    type Err = CritiqueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Number of the pull request being reviewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef(pub u64);

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Path globs excluded from the diff, one per non-blank ignore-file line.
///
/// # Examples
///
/// ```
/// use critique_core::ExclusionList;
///
/// let list = ExclusionList::parse("vendor/\n\nnode_modules/");
/// assert_eq!(list.patterns(), ["vendor/", "node_modules/"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionList(Vec<String>);

impl ExclusionList {
    /// Build a list from ignore-file content, dropping blank lines.
    ///
    /// Lines are otherwise kept verbatim; malformed globs are left for git to
    /// reject.
    pub fn parse(content: &str) -> Self {
        let patterns = content
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self(patterns)
    }

    pub fn patterns(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for ExclusionList {
    fn from(patterns: Vec<String>) -> Self {
        Self(patterns)
    }
}

/// Raw unified-diff text between two revisions, already filtered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffResult(String);

impl DiffResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Size of the diff in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when the two revisions do not differ outside excluded paths.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Review produced by the model, ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewText(String);

impl ReviewText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Order in which the two branches are handed to `git diff`.
///
/// # Examples
///
/// ```
/// use critique_core::DiffDirection;
///
/// let dir: DiffDirection = "head-to-base".parse().unwrap();
/// assert_eq!(dir, DiffDirection::HeadToBase);
/// assert_eq!(DiffDirection::default(), DiffDirection::BaseToHead);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffDirection {
    /// `git diff <base> <head>`: additions on the PR branch show as `+`.
    #[default]
    BaseToHead,
    /// `git diff <head> <base>`.
    HeadToBase,
}

impl fmt::Display for DiffDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffDirection::BaseToHead => write!(f, "base-to-head"),
            DiffDirection::HeadToBase => write!(f, "head-to-base"),
        }
    }
}

impl FromStr for DiffDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "base-to-head" => Ok(DiffDirection::BaseToHead),
            "head-to-base" => Ok(DiffDirection::HeadToBase),
            other => Err(format!("unknown diff direction: {other}")),
        }
    }
}

/// Shape of the completion endpoint's JSON response.
///
/// # Examples
///
/// ```
/// use critique_core::ResponseSchema;
///
/// let schema: ResponseSchema = "message".parse().unwrap();
/// assert_eq!(schema, ResponseSchema::Message);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSchema {
    /// OpenAI style: `choices[0].message.content`.
    #[default]
    Choices,
    /// Flat `{"message": "..."}` body.
    Message,
}

impl fmt::Display for ResponseSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseSchema::Choices => write!(f, "choices"),
            ResponseSchema::Message => write!(f, "message"),
        }
    }
}

impl FromStr for ResponseSchema {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "choices" => Ok(ResponseSchema::Choices),
            "message" => Ok(ResponseSchema::Message),
            other => Err(format!("unknown response schema: {other}")),
        }
    }
}
