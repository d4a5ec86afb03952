use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use critique_core::CritiqueError;
use tracing::debug;

/// Run `git` with `args` in `workdir` and return its captured stdout.
///
/// Only the subcommand is logged; arguments may carry credentials.
pub(crate) fn run_git(workdir: &Path, args: &[String]) -> Result<Vec<u8>, CritiqueError> {
    let subcommand = args.first().map(String::as_str).unwrap_or("");
    debug!(subcommand, workdir = %workdir.display(), "running git");

    if !workdir.is_dir() {
        return Err(CritiqueError::Git(format!(
            "working directory {} does not exist",
            workdir.display()
        )));
    }

    let output = Command::new("git")
        .args(args)
        .current_dir(workdir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                CritiqueError::Git("git executable not found on PATH".into())
            }
            _ => CritiqueError::Git(format!("failed to run git {subcommand}: {e}")),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CritiqueError::Git(format!(
            "git {subcommand} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(output.stdout)
}
