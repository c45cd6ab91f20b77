// ============================================================================
// animclip-core/src/intake.rs
// ============================================================================
//
// INTAKE: Staging Source Videos and Delivering Results
//
// receive_upload copies a user's video into the upload directory under a
// collision-resistant name; the conversion pipeline then owns (and deletes)
// that staged copy. deliver copies a finished artifact to wherever the user
// asked for it.

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::temp_files::upload_file_name;
use crate::utils::{format_bytes, get_filename_safe};

use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Video container extensions accepted for conversion (lowercase).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "webm", "mpeg", "mpg"];

/// A source video copied into the upload directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedSource {
    /// Location of the staged copy
    pub path: PathBuf,
    /// File name as the user supplied it
    pub original_filename: String,
    pub size: u64,
}

/// Whether `path` has one of the supported video extensions.
pub fn is_supported_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Copies `input` into the upload directory.
///
/// Rejects missing files, unsupported extensions and files above
/// `max_upload_size`. The original is never modified.
pub fn receive_upload(input: &Path, config: &CoreConfig) -> CoreResult<StagedSource> {
    let metadata = fs::metadata(input).map_err(|e| {
        CoreError::UnsupportedInput(format!("cannot read '{}': {}", input.display(), e))
    })?;
    if !metadata.is_file() {
        return Err(CoreError::UnsupportedInput(format!(
            "'{}' is not a file",
            input.display()
        )));
    }
    if !is_supported_video(input) {
        return Err(CoreError::UnsupportedInput(format!(
            "unsupported file type '{}'; upload an MP4, AVI, MOV, WebM or MPEG video",
            input.display()
        )));
    }
    if metadata.len() > config.max_upload_size {
        return Err(CoreError::UnsupportedInput(format!(
            "'{}' is {}, above the {} upload limit",
            input.display(),
            format_bytes(metadata.len()),
            format_bytes(config.max_upload_size)
        )));
    }

    let original_filename = get_filename_safe(input)?;
    fs::create_dir_all(&config.upload_dir).map_err(|e| {
        CoreError::PathError(format!(
            "Failed to create upload directory '{}': {}",
            config.upload_dir.display(),
            e
        ))
    })?;

    let staged = config.upload_dir.join(upload_file_name(&original_filename));
    let size = fs::copy(input, &staged)?;
    info!("Staged {} as {}", original_filename, staged.display());

    Ok(StagedSource {
        path: staged,
        original_filename,
        size,
    })
}

/// Copies a finished artifact to `destination`.
///
/// An existing directory receives the artifact under its own name; any
/// other path is used as the target file. Returns the written path.
pub fn deliver(artifact: &Path, destination: &Path) -> CoreResult<PathBuf> {
    let target = if destination.is_dir() {
        destination.join(get_filename_safe(artifact)?)
    } else {
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        destination.to_path_buf()
    };

    if target == artifact {
        return Ok(target);
    }

    fs::copy(artifact, &target)?;
    debug!("Delivered {} to {}", artifact.display(), target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfigBuilder;

    fn config_in(dir: &Path) -> CoreConfig {
        CoreConfigBuilder::new()
            .upload_dir(dir.join("uploads"))
            .output_dir(dir.join("output"))
            .build()
    }

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_video(Path::new("a.mp4")));
        assert!(is_supported_video(Path::new("b.MOV")));
        assert!(is_supported_video(Path::new("c.webm")));
        assert!(!is_supported_video(Path::new("d.mkv")));
        assert!(!is_supported_video(Path::new("noext")));
    }

    #[test]
    fn test_receive_upload_stages_copy() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("my clip.mp4");
        fs::write(&input, b"video bytes").unwrap();
        let config = config_in(dir.path());

        let staged = receive_upload(&input, &config).unwrap();

        assert!(input.exists());
        assert!(staged.path.starts_with(&config.upload_dir));
        assert_eq!(staged.original_filename, "my clip.mp4");
        assert_eq!(staged.size, 11);
        let name = staged.path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with("_my_clip.mp4"), "{name}");
        assert_eq!(fs::read(&staged.path).unwrap(), b"video bytes");
    }

    #[test]
    fn test_receive_upload_rejects_bad_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());

        let missing = receive_upload(&dir.path().join("nope.mp4"), &config);
        assert!(matches!(missing, Err(CoreError::UnsupportedInput(_))));

        let text = dir.path().join("notes.txt");
        fs::write(&text, b"hello").unwrap();
        assert!(matches!(
            receive_upload(&text, &config),
            Err(CoreError::UnsupportedInput(_))
        ));

        let big = dir.path().join("big.mp4");
        fs::write(&big, vec![0u8; 64]).unwrap();
        config.max_upload_size = 32;
        assert!(matches!(
            receive_upload(&big, &config),
            Err(CoreError::UnsupportedInput(_))
        ));
        assert!(!config.upload_dir.exists());
    }

    #[test]
    fn test_deliver_into_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("clip.gif");
        fs::write(&artifact, b"GIF89a").unwrap();

        let dest_dir = dir.path().join("dest");
        fs::create_dir(&dest_dir).unwrap();
        let delivered = deliver(&artifact, &dest_dir).unwrap();
        assert_eq!(delivered, dest_dir.join("clip.gif"));
        assert!(delivered.exists());

        let renamed = deliver(&artifact, &dir.path().join("nested/final.gif")).unwrap();
        assert_eq!(fs::read(renamed).unwrap(), b"GIF89a");
        assert!(artifact.exists());
    }
}
