//! Mock media capability for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::media::{MediaCapability, MediaError};
use crate::pool::identifier_for;

/// A recorded call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaCall {
    HasAudioTrack { source: PathBuf },
    ExtractAudio { source: PathBuf, target: PathBuf },
}

impl MediaCall {
    /// Source path the call was made for.
    pub fn source(&self) -> &Path {
        match self {
            Self::HasAudioTrack { source } | Self::ExtractAudio { source, .. } => source,
        }
    }
}

/// Mock implementation of the MediaCapability trait.
///
/// Behavior is keyed by identifier (source filename without its extension):
/// - By default every video has audio and extraction succeeds, writing a
///   small placeholder file at the target path
/// - `set_no_audio` makes the probe report no audio track
/// - `set_failing` makes extraction fail
/// - `set_probe_error` makes the probe itself fail
///
/// Clones share state, so keep one clone for assertions and hand another to
/// the pool.
///
/// # Example
///
/// ```rust,ignore
/// use soundpool_core::testing::MockMedia;
///
/// let media = MockMedia::new();
/// media.set_no_audio("a").await;
///
/// let pool = ConversionPool::new(config, media.clone())?;
/// pool.run().await?;
///
/// assert_eq!(media.extraction_count().await, 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockMedia {
    calls: Arc<RwLock<Vec<MediaCall>>>,
    no_audio: Arc<RwLock<HashSet<String>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    probe_errors: Arc<RwLock<HashSet<String>>>,
    /// Simulated extraction duration in milliseconds.
    extraction_duration_ms: Arc<RwLock<u64>>,
}

impl Default for MockMedia {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMedia {
    /// Create a new mock where every video has audio and converts.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            no_audio: Arc::new(RwLock::new(HashSet::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            probe_errors: Arc::new(RwLock::new(HashSet::new())),
            extraction_duration_ms: Arc::new(RwLock::new(0)),
        }
    }

    /// Report no audio track for this identifier.
    pub async fn set_no_audio(&self, id: &str) {
        self.no_audio.write().await.insert(id.to_string());
    }

    /// Fail extraction for this identifier.
    pub async fn set_failing(&self, id: &str) {
        self.failing.write().await.insert(id.to_string());
    }

    /// Fail the audio probe for this identifier.
    pub async fn set_probe_error(&self, id: &str) {
        self.probe_errors.write().await.insert(id.to_string());
    }

    /// Set the simulated extraction duration.
    pub async fn set_extraction_duration(&self, duration: Duration) {
        *self.extraction_duration_ms.write().await = duration.as_millis() as u64;
    }

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<MediaCall> {
        self.calls.read().await.clone()
    }

    /// Calls made for one identifier.
    pub async fn calls_for(&self, id: &str) -> Vec<MediaCall> {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| identifier_for(c.source()).as_deref() == Some(id))
            .cloned()
            .collect()
    }

    /// Number of extraction attempts.
    pub async fn extraction_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| matches!(c, MediaCall::ExtractAudio { .. }))
            .count()
    }

    /// Number of audio probes.
    pub async fn probe_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| matches!(c, MediaCall::HasAudioTrack { .. }))
            .count()
    }

    /// Clear recorded calls.
    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
    }

    fn id_of(path: &Path) -> String {
        identifier_for(path).unwrap_or_default()
    }
}

#[async_trait]
impl MediaCapability for MockMedia {
    fn name(&self) -> &str {
        "mock"
    }

    async fn has_audio_track(&self, path: &Path) -> Result<bool, MediaError> {
        self.calls.write().await.push(MediaCall::HasAudioTrack {
            source: path.to_path_buf(),
        });

        let id = Self::id_of(path);
        if self.probe_errors.read().await.contains(&id) {
            return Err(MediaError::probe_failed(format!("mock probe error for {}", id)));
        }

        Ok(!self.no_audio.read().await.contains(&id))
    }

    async fn extract_audio(&self, source: &Path, target: &Path) -> Result<(), MediaError> {
        self.calls.write().await.push(MediaCall::ExtractAudio {
            source: source.to_path_buf(),
            target: target.to_path_buf(),
        });

        let duration_ms = *self.extraction_duration_ms.read().await;
        if duration_ms > 0 {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        }

        let id = Self::id_of(source);
        if self.failing.read().await.contains(&id) {
            return Err(MediaError::extraction_failed(
                format!("mock extraction error for {}", id),
                None,
            ));
        }

        tokio::fs::write(target, b"ID3").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_defaults_convert() {
        let dir = TempDir::new().unwrap();
        let media = MockMedia::new();
        let target = dir.path().join("b.mp3");

        assert!(media.has_audio_track(Path::new("/v/b.mov")).await.unwrap());
        media
            .extract_audio(Path::new("/v/b.mov"), &target)
            .await
            .unwrap();

        assert!(target.exists());
        assert_eq!(media.probe_count().await, 1);
        assert_eq!(media.extraction_count().await, 1);
    }

    #[tokio::test]
    async fn test_configured_behaviour() {
        let dir = TempDir::new().unwrap();
        let media = MockMedia::new();
        media.set_no_audio("a").await;
        media.set_failing("c").await;
        media.set_probe_error("d").await;

        assert!(!media.has_audio_track(Path::new("/v/a.mov")).await.unwrap());
        assert!(media.has_audio_track(Path::new("/v/d.mov")).await.is_err());
        let target = dir.path().join("c.mp3");
        assert!(media
            .extract_audio(Path::new("/v/c.mov"), &target)
            .await
            .is_err());
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let media = MockMedia::new();
        let clone = media.clone();
        clone.set_no_audio("x").await;

        assert!(!media.has_audio_track(Path::new("/v/x.mp4")).await.unwrap());
        assert_eq!(clone.calls_for("x").await.len(), 1);

        media.clear_recorded().await;
        assert!(clone.recorded_calls().await.is_empty());
    }
}
