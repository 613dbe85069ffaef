//! Completion markers for build artifacts.
//!
//! An artifact `X` counts as complete only when `X.done` exists and records both the
//! digest of the inputs it was built from and the digest of `X` itself. Both files are
//! written to a temporary file first and then atomically renamed into place, so a
//! crashed or concurrent build never leaves a half-written artifact that looks done.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

/// MD5 digest as lower-case hex
#[must_use]
pub fn digest(bytes: &[u8]) -> String {
    format!("{:x}", md5::compute(bytes))
}

/// Contents of a `.done` marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointMarker {
    pub input_digest: String,
    pub output_digest: String,
    pub created_at: DateTime<Utc>,
}

/// An artifact on disk plus the digest of the inputs it is built from
#[derive(Debug, Clone)]
pub struct Checkpoint {
    artifact: PathBuf,
    input_digest: String,
}

impl Checkpoint {
    #[must_use]
    pub fn new(artifact: impl Into<PathBuf>, inputs: &[u8]) -> Self {
        Self {
            artifact: artifact.into(),
            input_digest: digest(inputs),
        }
    }

    #[must_use]
    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    #[must_use]
    pub fn marker_path(&self) -> PathBuf {
        let mut name = self.artifact.as_os_str().to_owned();
        name.push(".done");
        PathBuf::from(name)
    }

    fn marker(&self) -> Option<CheckpointMarker> {
        let text = fs::read_to_string(self.marker_path()).ok()?;
        serde_json::from_str(&text).ok()
    }

    /// Contents of the artifact if it is complete for the current inputs.
    #[must_use]
    pub fn load(&self) -> Option<Vec<u8>> {
        let marker = self.marker()?;
        if marker.input_digest != self.input_digest {
            debug!("Inputs of {} changed", self.artifact.display());
            return None;
        }
        let contents = fs::read(&self.artifact).ok()?;
        if digest(&contents) != marker.output_digest {
            debug!("{} does not match its marker", self.artifact.display());
            return None;
        }
        Some(contents)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.load().is_some()
    }

    /// Atomically write the artifact, then its marker.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be written.
    pub fn commit(&self, contents: &[u8]) -> io::Result<()> {
        write_atomically(&self.artifact, contents)?;

        let marker = CheckpointMarker {
            input_digest: self.input_digest.clone(),
            output_digest: digest(contents),
            created_at: Utc::now(),
        };
        let json = serde_json::to_vec_pretty(&marker).map_err(io::Error::other)?;
        write_atomically(&self.marker_path(), &json)?;

        debug!("Committed {}", self.artifact.display());
        Ok(())
    }
}

/// Write `contents` to `path` via a temporary file in the same directory.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be written.
pub fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.flush()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_digest() {
        assert_eq!(digest(b""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_commit_then_load() {
        let dir = TempDir::new().unwrap();
        let checkpoint = Checkpoint::new(dir.path().join("16S.clustalw.fasta"), b"inputs");
        assert!(!checkpoint.is_complete());

        checkpoint.commit(b">16S\nACGT\n").unwrap();
        assert!(checkpoint.is_complete());
        assert_eq!(checkpoint.load().unwrap(), b">16S\nACGT\n");
        assert!(dir.path().join("16S.clustalw.fasta.done").exists());
    }

    #[test]
    fn test_changed_inputs_invalidate() {
        let dir = TempDir::new().unwrap();
        let artifact = dir.path().join("out.fasta");
        Checkpoint::new(&artifact, b"v1").commit(b"data").unwrap();
        assert!(!Checkpoint::new(&artifact, b"v2").is_complete());
    }

    #[test]
    fn test_modified_artifact_invalidates() {
        let dir = TempDir::new().unwrap();
        let checkpoint = Checkpoint::new(dir.path().join("out.fasta"), b"inputs");
        checkpoint.commit(b"data").unwrap();
        fs::write(checkpoint.artifact(), b"other").unwrap();
        assert!(!checkpoint.is_complete());
    }

    #[test]
    fn test_artifact_without_marker_is_incomplete() {
        let dir = TempDir::new().unwrap();
        let checkpoint = Checkpoint::new(dir.path().join("out.fasta"), b"inputs");
        fs::write(checkpoint.artifact(), b"data").unwrap();
        assert!(!checkpoint.is_complete());

        fs::write(checkpoint.marker_path(), b"not json").unwrap();
        assert!(!checkpoint.is_complete());
    }

    #[test]
    fn test_write_atomically_creates_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b.txt");
        write_atomically(&path, b"x").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"x");
    }
}
