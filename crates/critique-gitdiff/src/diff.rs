//! Building and running the filtered `git diff` between two branches.

use std::path::{Path, PathBuf};

use critique_core::{CritiqueError, DiffConfig, DiffDirection, DiffResult, ExclusionList};
use tracing::{debug, info};

use crate::command::run_git;

/// Anything that can produce the diff under review.
pub trait DiffSource {
    /// Produce the diff, leaving out every path matched by `exclusions`.
    ///
    /// # Errors
    ///
    /// Returns [`CritiqueError::Git`] if the diff cannot be computed.
    fn diff(&self, exclusions: &ExclusionList) -> Result<DiffResult, CritiqueError>;

    /// The revisions being compared, as `from..to`.
    fn range(&self) -> String;
}

/// A two-revision `git diff` over the whole tree.
///
/// # Examples
///
/// ```
/// use critique_core::ExclusionList;
/// use critique_gitdiff::diff::DiffQuery;
///
/// let query = DiffQuery::new("main", "feature").with_remote(Some("origin"));
/// let args = query.args(&ExclusionList::parse("vendor/\n*.lock"));
/// assert_eq!(
///     args,
///     ["diff", "origin/main", "origin/feature", "--", ".", ":!vendor/", ":!*.lock"]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffQuery {
    /// Branch the pull request merges into.
    pub base: String,
    /// Branch carrying the proposed changes.
    pub head: String,
    /// Remote prefix applied to both branches, e.g. `origin`.
    pub remote: Option<String>,
    /// Which branch goes first on the command line.
    pub direction: DiffDirection,
}

impl DiffQuery {
    /// Compare two local branches, base first.
    pub fn new(base: impl Into<String>, head: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            head: head.into(),
            remote: None,
            direction: DiffDirection::default(),
        }
    }

    /// Build a query for `base`/`head` using the remote and direction from `config`.
    pub fn from_config(base: &str, head: &str, config: &DiffConfig) -> Self {
        Self::new(base, head)
            .with_remote(config.remote())
            .with_direction(config.direction)
    }

    pub fn with_remote(mut self, remote: Option<&str>) -> Self {
        self.remote = remote.map(str::to_string);
        self
    }

    pub fn with_direction(mut self, direction: DiffDirection) -> Self {
        self.direction = direction;
        self
    }

    fn qualify(&self, branch: &str) -> String {
        match &self.remote {
            Some(remote) => format!("{remote}/{branch}"),
            None => branch.to_string(),
        }
    }

    /// The compared revisions as `from..to`, in command-line order.
    pub fn range(&self) -> String {
        let (from, to) = self.endpoints();
        format!("{from}..{to}")
    }

    fn endpoints(&self) -> (String, String) {
        let base = self.qualify(&self.base);
        let head = self.qualify(&self.head);
        match self.direction {
            DiffDirection::BaseToHead => (base, head),
            DiffDirection::HeadToBase => (head, base),
        }
    }

    /// The `git` arguments for this query: `diff <from> <to> -- . [:!pattern ...]`.
    ///
    /// One negated pathspec is appended per exclusion, in list order.
    pub fn args(&self, exclusions: &ExclusionList) -> Vec<String> {
        let (from, to) = self.endpoints();
        let mut args = vec!["diff".to_string(), from, to, "--".into(), ".".into()];
        args.extend(exclusions.patterns().iter().map(|p| format!(":!{p}")));
        args
    }

    /// Run the diff inside the checkout at `workdir`.
    ///
    /// # Errors
    ///
    /// Returns [`CritiqueError::Git`] if `git` is unavailable, either branch
    /// does not resolve, or the command otherwise fails.
    pub fn run(&self, workdir: &Path, exclusions: &ExclusionList) -> Result<DiffResult, CritiqueError> {
        let args = self.args(exclusions);
        debug!(?args, "diff command");

        let stdout = run_git(workdir, &args)?;
        let diff = DiffResult::new(String::from_utf8_lossy(&stdout));
        info!(
            from = %args[1],
            to = %args[2],
            excluded = exclusions.len(),
            bytes = diff.len(),
            "computed diff"
        );
        Ok(diff)
    }
}

/// [`DiffSource`] backed by the `git` executable and a local checkout.
#[derive(Debug, Clone)]
pub struct GitDiff {
    workdir: PathBuf,
    query: DiffQuery,
}

impl GitDiff {
    pub fn new(workdir: impl Into<PathBuf>, query: DiffQuery) -> Self {
        Self {
            workdir: workdir.into(),
            query,
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}

impl DiffSource for GitDiff {
    fn diff(&self, exclusions: &ExclusionList) -> Result<DiffResult, CritiqueError> {
        self.query.run(&self.workdir, exclusions)
    }

    fn range(&self) -> String {
        self.query.range()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_exclusions_add_no_pathspecs() {
        let args = DiffQuery::new("main", "feature").args(&ExclusionList::default());
        assert_eq!(args, ["diff", "main", "feature", "--", "."]);
        assert!(!args.iter().any(|a| a.starts_with(":!")));
    }

    #[test]
    fn one_negated_pathspec_per_exclusion_in_order() {
        let exclusions = ExclusionList::parse("vendor/\n\nnode_modules/\n*.snap");
        let args = DiffQuery::new("main", "feature").args(&exclusions);
        let negated: Vec<&str> = args
            .iter()
            .filter(|a| a.starts_with(":!"))
            .map(String::as_str)
            .collect();
        assert_eq!(negated, [":!vendor/", ":!node_modules/", ":!*.snap"]);
        assert_eq!(&args[3..5], ["--", "."]);
    }

    #[test]
    fn head_to_base_swaps_refs() {
        let args = DiffQuery::new("main", "feature")
            .with_remote(Some("origin"))
            .with_direction(DiffDirection::HeadToBase)
            .args(&ExclusionList::default());
        assert_eq!(&args[1..3], ["origin/feature", "origin/main"]);
    }

    #[test]
    fn range_follows_direction_and_remote() {
        let query = DiffQuery::new("main", "feature").with_remote(Some("origin"));
        assert_eq!(query.range(), "origin/main..origin/feature");

        let source = GitDiff::new(".", query.with_direction(DiffDirection::HeadToBase));
        assert_eq!(source.range(), "origin/feature..origin/main");
    }

    #[test]
    fn from_config_uses_remote_and_direction() {
        let config = DiffConfig::default();
        let query = DiffQuery::from_config("main", "feature", &config);
        assert_eq!(query.remote.as_deref(), Some("origin"));
        assert_eq!(query.direction, DiffDirection::BaseToHead);
    }

    #[test]
    fn missing_workdir_is_a_git_error() {
        let source = GitDiff::new("/definitely/not/a/checkout", DiffQuery::new("a", "b"));
        let err = source.diff(&ExclusionList::default()).unwrap_err();
        assert!(matches!(err, CritiqueError::Git(_)));
    }
}
