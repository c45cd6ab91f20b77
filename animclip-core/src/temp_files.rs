//! Temporary artifact management.
//!
//! Every file the pipeline writes (staged source, palette image, intermediate
//! video, optimized output) is held by a [`TempArtifact`] guard. Dropping the
//! guard deletes the file, so early returns and `?` reclaim intermediates
//! without explicit cleanup code. The one artifact handed back to the caller
//! is released with [`TempArtifact::keep`].
//!
//! Names are made collision-resistant with a timestamp plus a random suffix,
//! since concurrent conversions may share a directory and no locking is done.

use chrono::Local;
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};
use std::io;
use std::path::{Path, PathBuf};

/// Owns a file on disk and deletes it when dropped unless kept.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
    keep: bool,
}

impl TempArtifact {
    /// Takes ownership of `path`. The file does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            keep: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Releases ownership and returns the path; the file survives.
    pub fn keep(mut self) -> PathBuf {
        self.keep = true;
        std::mem::take(&mut self.path)
    }

    /// Renames the file onto `target`, replacing any file already there, and
    /// releases ownership. On failure the guard is dropped and the file
    /// deleted.
    pub fn persist(self, target: &Path) -> io::Result<PathBuf> {
        std::fs::rename(&self.path, target)?;
        self.keep();
        Ok(target.to_path_buf())
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if !self.keep {
            remove_artifact(&self.path);
        }
    }
}

/// Deletes `path` if present. Idempotent; failures are logged, never returned.
pub fn remove_artifact(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => {
            log::debug!("Removed artifact: {}", path.display());
            true
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            log::warn!("Failed to remove artifact {}: {}", path.display(), e);
            false
        }
    }
}

/// Returns `len` random alphanumeric characters, lowercased.
pub fn random_suffix(len: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect()
}

/// Millisecond timestamp used as a name prefix.
pub fn timestamp_millis() -> i64 {
    Local::now().timestamp_millis()
}

/// Name for a staged upload: `<millis>_<random>_<sanitized original>`.
pub fn upload_file_name(original: &str) -> String {
    format!(
        "{}_{}_{}",
        timestamp_millis(),
        random_suffix(9),
        crate::utils::sanitize_upload_name(original)
    )
}

/// Prefix of the names a conversion writes to before it finishes.
pub const WORK_FILE_PREFIX: &str = "partial_";

/// Per-run working name for an output that will be published as `final_name`:
/// `partial_<millis>_<random>_<final_name>`. Palettes and intermediates are
/// derived from it, so two runs never share a path even with equal names.
pub fn work_file_name(final_name: &str) -> String {
    format!(
        "{WORK_FILE_PREFIX}{}_{}_{final_name}",
        timestamp_millis(),
        random_suffix(6)
    )
}

/// Derives a sibling path by appending `suffix` to the stem and swapping the
/// extension, e.g. `clip.gif` + `_palette`/`png` -> `clip_palette.png`.
pub fn sibling_path(path: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}{suffix}.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_temp_artifact_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("palette.png");
        File::create(&path).unwrap();
        {
            let _artifact = TempArtifact::new(&path);
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_temp_artifact_keep_survives() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.gif");
        File::create(&path).unwrap();
        let kept = TempArtifact::new(&path).keep();
        assert_eq!(kept, path);
        assert!(path.exists());
    }

    #[test]
    fn test_remove_artifact_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.mp4");
        File::create(&path).unwrap();
        assert!(remove_artifact(&path));
        assert!(!remove_artifact(&path));
        // A guard for a file that never existed drops quietly
        drop(TempArtifact::new(dir.path().join("never.png")));
    }

    #[test]
    fn test_sibling_path() {
        let out = Path::new("/out/converted_1.gif");
        assert_eq!(
            sibling_path(out, "_palette", "png"),
            PathBuf::from("/out/converted_1_palette.png")
        );
        assert_eq!(
            sibling_path(Path::new("/out/clip.webp"), "_temp", "mp4"),
            PathBuf::from("/out/clip_temp.mp4")
        );
    }

    #[test]
    fn test_persist_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("clip.gif");
        std::fs::write(&target, b"old").unwrap();
        let work = dir.path().join(work_file_name("clip.gif"));
        std::fs::write(&work, b"new").unwrap();

        let published = TempArtifact::new(&work).persist(&target).unwrap();

        assert_eq!(published, target);
        assert_eq!(std::fs::read(&target).unwrap(), b"new");
        assert!(!work.exists());
    }

    #[test]
    fn test_failed_persist_removes_work_file() {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join(work_file_name("clip.gif"));
        File::create(&work).unwrap();

        let missing_dir = dir.path().join("gone").join("clip.gif");
        assert!(TempArtifact::new(&work).persist(&missing_dir).is_err());
        assert!(!work.exists());
    }

    #[test]
    fn test_work_file_names_differ() {
        let a = work_file_name("clip.gif");
        let b = work_file_name("clip.gif");
        assert_ne!(a, b);
        assert!(a.starts_with(WORK_FILE_PREFIX));
        assert!(a.ends_with("_clip.gif"));
    }

    #[test]
    fn test_upload_names_differ() {
        let a = upload_file_name("my clip.mp4");
        let b = upload_file_name("my clip.mp4");
        assert_ne!(a, b);
        assert!(a.ends_with("_my_clip.mp4"));
    }
}
