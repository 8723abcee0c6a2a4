//! Output location for a finished track.

use std::path::{Path, PathBuf};

use super::error::{DownloadError, Result};

const MP3_SUFFIX: &str = ".mp3";

/// Reject caller-provided filenames that would escape the output directory.
pub fn validate_filename(filename: Option<&str>) -> Result<()> {
    let Some(name) = filename.filter(|name| !name.is_empty()) else {
        return Ok(());
    };

    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(DownloadError::InvalidInput(format!(
            "invalid filename '{name}': must not contain path separators"
        )));
    }

    Ok(())
}

/// Build `<dir>/<filename>`.
///
/// The directory falls back to `default_dir`, the filename to
/// `soundcloud_<track_id>.mp3`; a filename without the `.mp3` suffix gets it
/// appended.
pub fn output_path(
    output_directory: Option<&str>,
    filename: Option<&str>,
    track_id: &str,
    default_dir: &Path,
) -> PathBuf {
    let dir = output_directory
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| default_dir.to_path_buf());

    let mut name = filename
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| format!("soundcloud_{track_id}{MP3_SUFFIX}"));
    if !name.ends_with(MP3_SUFFIX) {
        name.push_str(MP3_SUFFIX);
    }

    dir.join(name)
}
