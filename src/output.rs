//! Versioned image files in the output folder.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::constants::IMAGE_EXTENSION;
use crate::error::SpriteError;

/// Ensures the output folder exists, creating parents as needed.
pub fn setup_output_folder(path: &Path) -> Result<PathBuf, SpriteError> {
    fs::create_dir_all(path).map_err(|err| SpriteError::OutputFolder(path.to_path_buf(), err))?;
    Ok(path.to_path_buf())
}

/// Finds the first `<expression>_<n>.png` in `output_folder` that doesn't exist yet, counting from 1.
pub fn next_versioned_filename(output_folder: &Path, expression: &str) -> PathBuf {
    let mut version: u64 = 1;
    loop {
        let candidate = output_folder.join(format!("{expression}_{version}.{IMAGE_EXTENSION}"));
        if !candidate.exists() {
            return candidate;
        }
        version += 1;
    }
}

/// Writes `bytes` to the next free versioned filename and returns its path.
pub fn save_image(
    output_folder: &Path,
    expression: &str,
    bytes: &[u8],
) -> Result<PathBuf, SpriteError> {
    let path = next_versioned_filename(output_folder, expression);
    // create_new so a file that appeared after probing is never clobbered
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)?;
    file.write_all(bytes)?;
    Ok(path)
}
