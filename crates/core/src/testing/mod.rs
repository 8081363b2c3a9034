//! Testing utilities and mock implementations.
//!
//! `MockMedia` stands in for ffmpeg so the pool can be exercised end to end
//! against temporary directories.
//!
//! # Example
//!
//! ```rust,ignore
//! use soundpool_core::testing::{fixtures, MockMedia};
//!
//! let dir = tempfile::TempDir::new()?;
//! fixtures::video(&dir.path().join("videos/cats"), "a.mov");
//!
//! let media = MockMedia::new();
//! media.set_no_audio("a").await;
//! ```

mod mock_media;

pub use mock_media::{MediaCall, MockMedia};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    /// Create a placeholder video file named `name` inside `dir`, creating
    /// `dir` if needed.
    pub fn video(dir: &Path, name: &str) -> PathBuf {
        std::fs::create_dir_all(dir).expect("Failed to create video directory");
        let path = dir.join(name);
        std::fs::write(&path, b"not really a video").expect("Failed to create video");
        path
    }

    /// Create several placeholder videos in `dir`.
    pub fn videos(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|name| video(dir, name)).collect()
    }

    /// Read a log file into its lines, or an empty list if it does not exist.
    pub fn log_lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .map(|content| content.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}
