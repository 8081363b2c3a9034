use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::media::MediaConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub pool: PoolConfig,
    #[serde(default)]
    pub media: MediaConfig,
}

/// Pool configuration: where videos come from, where audio goes, and how
/// many workers share the load.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PoolConfig {
    /// Directory holding the source videos (flat, or one folder per category).
    pub source_root: PathBuf,
    /// Directory receiving the extracted audio files.
    pub target_root: PathBuf,
    /// Optional ordered list of category names. When absent the source root
    /// is treated as a single flat collection.
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    /// Number of concurrent conversion workers.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Capacity of every queue in the pool.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Append-only file receiving identifiers of failed conversions.
    #[serde(default)]
    pub failed_log: Option<PathBuf>,
    /// Append-only file receiving identifiers of videos without audio.
    #[serde(default)]
    pub no_audio_log: Option<PathBuf>,
    /// Case-insensitive extension allow-list. Empty accepts every file.
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl PoolConfig {
    /// Creates a flat-layout config with default sizing and no outcome logs.
    pub fn new(source_root: impl Into<PathBuf>, target_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            target_root: target_root.into(),
            categories: None,
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            failed_log: None,
            no_audio_log: None,
            extensions: Vec::new(),
        }
    }

    /// Sets the category list.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the number of workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the queue capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Sets the failure log path.
    pub fn with_failed_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.failed_log = Some(path.into());
        self
    }

    /// Sets the no-audio log path.
    pub fn with_no_audio_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.no_audio_log = Some(path.into());
        self
    }

    /// Sets the extension allow-list.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }
}

fn default_workers() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    100
}
