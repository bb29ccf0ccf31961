//! Scoped test-data files for upload scenarios

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::HarnessResult;

/// A temporary directory of test-created data files.
///
/// The whole tree is removed when the value drops, so cleanup happens on
/// every exit path, test failure included.
pub struct TestDataDir {
    root: TempDir,
}

impl TestDataDir {
    pub fn new() -> HarnessResult<Self> {
        Ok(Self {
            root: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Write a data file under the scoped directory and return its path.
    pub fn create_file(&self, name: &str, contents: &[u8]) -> HarnessResult<PathBuf> {
        let path = self.root.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_file_and_cleanup_on_drop() {
        let dir = TestDataDir::new().unwrap();
        let file = dir.create_file("upload/sample.pdf", b"%PDF-1.4").unwrap();

        assert!(file.exists());
        assert_eq!(std::fs::read(&file).unwrap(), b"%PDF-1.4");

        let root = dir.path().to_path_buf();
        drop(dir);
        assert!(!root.exists());
        assert!(!file.exists());
    }
}
