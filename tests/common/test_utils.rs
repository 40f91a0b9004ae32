//! Temporary files for IO tests
//!
//! Paths respect TMPDIR, TEMP and TMP, and files are removed on drop.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

static TEST_FILE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Get the temporary directory, respecting environment variables
pub fn get_temp_dir() -> PathBuf {
    env::var("TMPDIR")
        .or_else(|_| env::var("TEMP"))
        .or_else(|_| env::var("TMP"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir())
}

/// Unique path per call so parallel tests never collide
pub fn test_temp_path(test_name: &str, extension: &str) -> PathBuf {
    let counter = TEST_FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
    let filename = format!(
        "datacn_test_{}_{}_{}.{}",
        test_name,
        std::process::id(),
        counter,
        extension
    );
    get_temp_dir().join(filename)
}

/// RAII wrapper for temporary test files with automatic cleanup
pub struct TempTestFile {
    path: PathBuf,
}

impl TempTestFile {
    pub fn new(test_name: &str, extension: &str) -> Self {
        TempTestFile {
            path: test_temp_path(test_name, extension),
        }
    }

    /// Creates the file with `contents`
    pub fn with_contents(test_name: &str, extension: &str, contents: &str) -> Self {
        let file = TempTestFile::new(test_name, extension);
        fs::write(file.path(), contents).expect("Failed to write test file");
        file
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempTestFile {
    fn drop(&mut self) {
        if self.path.exists() {
            let _ = fs::remove_file(&self.path);
        }
    }
}
