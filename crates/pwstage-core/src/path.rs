//! Submission-side local path resolution. Pure path computation, no IO.

use std::path::{Path, PathBuf};

use crate::error::{StageError, StageResult};
use crate::model::DataFile;

/// Compute where `file` lands on the worker.
///
/// Unset paths default to the remote basename, relative paths are joined to
/// `working_dir` (or fall back to the basename without one), absolute paths
/// are kept.
///
/// # Errors
///
/// Returns [`StageError::InvalidFile`] when a basename is needed but the
/// remote path has none.
pub fn resolve_local_path(file: &DataFile, working_dir: Option<&Path>) -> StageResult<PathBuf> {
    match file.local_path.as_deref() {
        Some(local) if local.is_absolute() => Ok(local.to_path_buf()),
        Some(local) => working_dir.map_or_else(|| basename(file), |dir| Ok(dir.join(local))),
        None => basename(file),
    }
}

/// Resolve and store the local path on the descriptor.
///
/// # Errors
///
/// Propagates [`resolve_local_path`] failures; the descriptor is left untouched.
pub fn resolve_in_place(file: &mut DataFile, working_dir: Option<&Path>) -> StageResult<()> {
    let resolved = resolve_local_path(file, working_dir)?;
    file.local_path = Some(resolved);
    Ok(())
}

fn basename(file: &DataFile) -> StageResult<PathBuf> {
    let name = file.filename();
    if name.is_empty() {
        return Err(StageError::invalid_file(
            "path",
            "remote path has no file name",
            Some(file.path.clone()),
        ));
    }
    Ok(PathBuf::from(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(path: &str) -> DataFile {
        DataFile::new("file", "", path)
    }

    #[test]
    fn unset_local_path_uses_basename() -> StageResult<()> {
        let file = remote("/data/sets/input.csv");
        assert_eq!(
            resolve_local_path(&file, Some(Path::new("/scratch")))?,
            PathBuf::from("input.csv")
        );
        assert_eq!(resolve_local_path(&file, None)?, PathBuf::from("input.csv"));
        Ok(())
    }

    #[test]
    fn relative_local_path_joins_working_dir() -> StageResult<()> {
        let file = remote("/data/input.csv").with_local_path("inputs/input.csv");
        assert_eq!(
            resolve_local_path(&file, Some(Path::new("/scratch/run")))?,
            PathBuf::from("/scratch/run/inputs/input.csv")
        );
        Ok(())
    }

    #[test]
    fn relative_local_path_without_working_dir_falls_back_to_basename() -> StageResult<()> {
        let file = remote("/data/input.csv").with_local_path("inputs/renamed.csv");
        assert_eq!(resolve_local_path(&file, None)?, PathBuf::from("input.csv"));
        Ok(())
    }

    #[test]
    fn absolute_local_path_is_identity() -> StageResult<()> {
        let file = remote("/data/input.csv").with_local_path("/tmp/elsewhere.csv");
        assert_eq!(
            resolve_local_path(&file, Some(Path::new("/scratch")))?,
            PathBuf::from("/tmp/elsewhere.csv")
        );
        Ok(())
    }

    #[test]
    fn directory_remote_uses_last_component() -> StageResult<()> {
        let file = remote("/data/results/");
        assert_eq!(resolve_local_path(&file, None)?, PathBuf::from("results"));
        Ok(())
    }

    #[test]
    fn empty_remote_path_cannot_default() {
        let mut file = remote("");
        assert!(matches!(
            resolve_in_place(&mut file, None),
            Err(StageError::InvalidFile { field: "path", .. })
        ));
        assert!(file.local_path.is_none());
    }

    #[test]
    fn resolve_in_place_updates_descriptor() -> StageResult<()> {
        let mut file = remote("/a/b").with_local_path("b");
        resolve_in_place(&mut file, Some(Path::new("/work")))?;
        assert_eq!(file.local_path, Some(PathBuf::from("/work/b")));
        Ok(())
    }
}
