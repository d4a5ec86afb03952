//! Loading of the newline-delimited ignore file.

use std::io::ErrorKind;
use std::path::Path;

use critique_core::{CritiqueError, ExclusionList};
use tracing::{debug, info};

/// Load the exclusion list stored at `path`.
///
/// A missing file is a supported configuration and yields an empty list.
///
/// # Errors
///
/// Returns [`CritiqueError::ReadFile`] if the path exists but cannot be read
/// as UTF-8 text (permissions, a directory, binary content).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use critique_gitdiff::ignore::load_exclusions;
///
/// let list = load_exclusions(Path::new("/definitely/not/here/.review-ignore")).unwrap();
/// assert!(list.is_empty());
/// ```
pub fn load_exclusions(path: &Path) -> Result<ExclusionList, CritiqueError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let list = ExclusionList::parse(&content);
            info!(path = %path.display(), patterns = list.len(), "loaded ignore file");
            Ok(list)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no ignore file, diffing the whole tree");
            Ok(ExclusionList::default())
        }
        Err(source) => Err(CritiqueError::ReadFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Load the exclusion list for a checkout, resolving relative paths against `workdir`.
pub fn load_exclusions_in(workdir: &Path, path: &Path) -> Result<ExclusionList, CritiqueError> {
    load_exclusions(&workdir.join(path))
}
