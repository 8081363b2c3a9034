//! Types shared by the pool roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Extension given to every extracted audio file.
pub const TARGET_EXTENSION: &str = "mp3";

/// Element of every pool queue.
///
/// `Stop` tells exactly one consumer that no more input will arrive for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message<T> {
    Item(T),
    Stop,
}

/// One video to convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Source filename without its final extension.
    pub id: String,
    /// Path of the source video.
    pub source_path: PathBuf,
    /// Directory that will hold the audio file.
    pub target_dir: PathBuf,
    /// Path of the audio file, `<target_dir>/<id>.mp3`.
    pub target_path: PathBuf,
}

impl WorkItem {
    /// Builds the work item for `source_path`, placing its audio in `target_dir`.
    ///
    /// Returns `None` when the path has no file name.
    pub fn new(source_path: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Option<Self> {
        let source_path = source_path.into();
        let target_dir = target_dir.into();
        let id = identifier_for(&source_path)?;
        let target_path = target_dir.join(format!("{}.{}", id, TARGET_EXTENSION));

        Some(Self {
            id,
            source_path,
            target_dir,
            target_path,
        })
    }
}

/// Identifier of a source file: its name with only the last extension removed.
///
/// `clip.v2.mov` gives `clip.v2`; names without an extension (including
/// dot-files such as `.hidden`) are kept whole.
pub fn identifier_for(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

/// The two kinds of recorded outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Extraction (or inspection) failed.
    Failed,
    /// The video has no audio track.
    NoAudio,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed => write!(f, "failed"),
            Self::NoAudio => write!(f, "no-audio"),
        }
    }
}

/// Lifecycle of a [`ConversionPool`](super::ConversionPool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolState {
    Idle,
    Running,
    Draining,
    Stopped,
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Counters for one run of the pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Work items pushed by the feeder.
    pub enqueued: u64,
    /// Items whose audio was extracted.
    pub converted: u64,
    /// Items skipped because the target already existed.
    pub skipped: u64,
    /// Items without an audio track.
    pub no_audio: u64,
    /// Items whose inspection or extraction failed.
    pub failed: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    /// Items that reached a worker.
    pub fn processed(&self) -> u64 {
        self.converted + self.skipped + self.no_audio + self.failed
    }

    /// Wall-clock duration of the run in milliseconds.
    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// Shared counters updated by the feeder and the workers.
#[derive(Default)]
pub(crate) struct PoolStats {
    pub(crate) enqueued: AtomicU64,
    pub(crate) converted: AtomicU64,
    pub(crate) skipped: AtomicU64,
    pub(crate) no_audio: AtomicU64,
    pub(crate) failed: AtomicU64,
}

impl PoolStats {
    pub(crate) fn to_summary(
        &self,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> RunSummary {
        RunSummary {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            converted: self.converted.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            no_audio: self.no_audio.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            started_at,
            finished_at,
        }
    }
}
