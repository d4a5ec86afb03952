//! Acquiring a local checkout of the repository under review.

use std::path::{Path, PathBuf};

use critique_core::{CritiqueError, RepositoryRef, Secret};
use tracing::info;

use crate::command::run_git;

/// Authenticated HTTPS clone URL for `repo` on github.com.
pub fn clone_url(repo: &RepositoryRef, token: &Secret) -> String {
    format!(
        "https://{}:{}@github.com/{}/{}",
        repo.owner,
        token.expose(),
        repo.owner,
        repo.name
    )
}

/// Make sure `root/<name>` holds a checkout of `repo` with fresh remote refs.
///
/// An existing checkout is reused; otherwise the repository is cloned. When
/// `remote` is set, `git fetch <remote>` runs afterwards.
///
/// # Errors
///
/// Returns [`CritiqueError::Git`] if cloning or fetching fails. The token is
/// scrubbed from the message.
pub fn acquire_checkout(
    root: &Path,
    repo: &RepositoryRef,
    token: &Secret,
    remote: Option<&str>,
) -> Result<PathBuf, CritiqueError> {
    let checkout = root.join(&repo.name);

    if checkout.join(".git").exists() {
        info!(path = %checkout.display(), "reusing existing checkout");
    } else {
        info!(repository = %repo, path = %checkout.display(), "cloning");
        // git runs inside `root`, so the target is relative to it
        let args = vec!["clone".to_string(), clone_url(repo, token), repo.name.clone()];
        run_git(root, &args).map_err(|e| redact(e, token))?;
    }

    if let Some(remote) = remote {
        fetch(&checkout, remote).map_err(|e| redact(e, token))?;
    }
    Ok(checkout)
}

/// Run `git fetch <remote>` inside `workdir`.
///
/// # Errors
///
/// Returns [`CritiqueError::Git`] if the fetch fails.
pub fn fetch(workdir: &Path, remote: &str) -> Result<(), CritiqueError> {
    info!(remote, "fetching");
    run_git(workdir, &["fetch".to_string(), remote.to_string()])?;
    Ok(())
}

fn redact(err: CritiqueError, token: &Secret) -> CritiqueError {
    match err {
        CritiqueError::Git(msg) if !token.expose().is_empty() => {
            CritiqueError::Git(msg.replace(token.expose(), "***"))
        }
        other => other,
    }
}
