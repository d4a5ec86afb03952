use std::path::PathBuf;

use critique_core::{CritiqueError, PullRequestRef, RepositoryRef};
use critique_gitdiff::diff::DiffSource;
use critique_gitdiff::ignore::load_exclusions_in;
use tracing::{debug, info};

use crate::github::CommentPublisher;
use crate::llm::ReviewModel;
use crate::prompt::format_comment;

/// What to review and where to post it.
#[derive(Debug, Clone)]
pub struct ReviewJob {
    /// Repository owning the pull request.
    pub repository: RepositoryRef,
    /// Pull request receiving the comment.
    pub pull_request: PullRequestRef,
    /// Ignore file, relative to the checkout unless absolute.
    pub ignore_path: PathBuf,
    /// Natural language the review is written in.
    pub language: String,
    /// Heading placed above the review.
    pub heading: String,
    /// Render the comment without posting it.
    pub dry_run: bool,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The comment was posted; holds its URL.
    Posted(String),
    /// Dry run: holds the comment body that would have been posted.
    Rendered(String),
    /// The branches do not differ outside excluded paths; nothing was sent.
    NoChanges,
}

/// Review orchestrator: diff, ask the model, post the comment.
///
/// Steps run strictly in sequence and the first error aborts the run.
pub struct ReviewPipeline<D, M, P> {
    workdir: PathBuf,
    diff_source: D,
    model: M,
    publisher: P,
}

impl<D, M, P> ReviewPipeline<D, M, P>
where
    D: DiffSource,
    M: ReviewModel,
    P: CommentPublisher,
{
    /// Create a pipeline operating on the checkout at `workdir`.
    pub fn new(workdir: impl Into<PathBuf>, diff_source: D, model: M, publisher: P) -> Self {
        Self {
            workdir: workdir.into(),
            diff_source,
            model,
            publisher,
        }
    }

    /// Take the pipeline apart, returning its diff source, model, and publisher.
    pub fn into_parts(self) -> (D, M, P) {
        (self.diff_source, self.model, self.publisher)
    }

    /// Run one review.
    ///
    /// # Errors
    ///
    /// Propagates the first error from loading the ignore file, computing the
    /// diff, requesting the review, or posting the comment.
    pub async fn run(&self, job: &ReviewJob) -> Result<ReviewOutcome, CritiqueError> {
        let exclusions = load_exclusions_in(&self.workdir, &job.ignore_path)?;
        let diff = self.diff_source.diff(&exclusions)?;
        debug!("diff:\n{}", diff.as_str());

        if diff.is_empty() {
            let range = self.diff_source.range();
            info!(
                %range,
                excluded = exclusions.len(),
                "no changes outside excluded paths; skipping review"
            );
            return Ok(ReviewOutcome::NoChanges);
        }

        let review = self.model.review(&diff, &job.language).await?;
        let body = format_comment(&job.heading, &review);

        if job.dry_run {
            return Ok(ReviewOutcome::Rendered(body));
        }

        let url = self
            .publisher
            .publish(&job.repository, job.pull_request, &body)
            .await?;
        Ok(ReviewOutcome::Posted(url))
    }
}
