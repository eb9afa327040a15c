// Output files are written in two steps: `stage` creates a temporary file in the
// destination directory and the caller fills it, then `commit` renames it over the
// destination. Dropping a staged file without committing deletes it, so a run that
// fails halfway leaves nothing behind.

use crate::error::Result;
use std::path::Path;
use tempfile::NamedTempFile;

/// Directory that will hold `path`, falling back to the working directory.
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Creates an empty temporary file beside `path`.
pub fn stage(path: &Path) -> Result<NamedTempFile> {
    Ok(NamedTempFile::new_in(parent_dir(path))?)
}

/// Renames a staged file onto `path`.
pub fn commit(staged: NamedTempFile, path: &Path) -> Result<()> {
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}
