use std::future::Future;

use critique_core::{CritiqueError, PullRequestRef, RepositoryRef, Secret};
use tracing::info;

const SERVICE: &str = "GitHub";

/// Something that can post a comment on a pull request.
pub trait CommentPublisher {
    /// Post `body` as a new comment on pull request `pr` of `repo` and
    /// return the comment's URL.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the hosting API rejects the call.
    fn publish(
        &self,
        repo: &RepositoryRef,
        pr: PullRequestRef,
        body: &str,
    ) -> impl Future<Output = Result<String, CritiqueError>> + Send;
}

/// GitHub client for posting review comments.
///
/// # Examples
///
/// ```no_run
/// use critique_core::Secret;
/// use critique_review::github::GitHubClient;
///
/// let client = GitHubClient::new(&Secret::new("ghs_xxxx"), None).unwrap();
/// ```
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
}

impl GitHubClient {
    /// Create a client authenticated with `token`.
    ///
    /// `base_uri` points at a different API root (GitHub Enterprise, a test
    /// server); `None` targets api.github.com.
    ///
    /// # Errors
    ///
    /// Returns [`CritiqueError::Config`] if `base_uri` is not a valid URI, or
    /// [`CritiqueError::Http`] if the client cannot be built.
    pub fn new(token: &Secret, base_uri: Option<&str>) -> Result<Self, CritiqueError> {
        let mut builder = octocrab::Octocrab::builder().personal_token(token.expose().to_string());
        if let Some(uri) = base_uri {
            builder = builder.base_uri(uri).map_err(|e| {
                CritiqueError::Config(format!("invalid GitHub API URI '{uri}': {e}"))
            })?;
        }

        let octocrab = builder.build().map_err(|e| CritiqueError::Http {
            service: SERVICE,
            message: format!("failed to create GitHub client: {e}"),
        })?;
        Ok(Self { octocrab })
    }
}

impl CommentPublisher for GitHubClient {
    async fn publish(
        &self,
        repo: &RepositoryRef,
        pr: PullRequestRef,
        body: &str,
    ) -> Result<String, CritiqueError> {
        let comment = self
            .octocrab
            .issues(&repo.owner, &repo.name)
            .create_comment(pr.0, body)
            .await
            .map_err(from_octocrab)?;

        let url = comment.html_url.to_string();
        info!(repository = %repo, pull_request = %pr, %url, "posted review comment");
        Ok(url)
    }
}

fn from_octocrab(err: octocrab::Error) -> CritiqueError {
    match err {
        octocrab::Error::GitHub { source, .. } => CritiqueError::Transport {
            service: SERVICE,
            status: source.status_code.as_u16(),
            body: source.message.clone(),
        },
        other => CritiqueError::Http {
            service: SERVICE,
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_base_uri_is_a_config_error() {
        let result = GitHubClient::new(&Secret::new("t"), Some("not a uri"));
        assert!(matches!(result, Err(CritiqueError::Config(_))));
    }
}
