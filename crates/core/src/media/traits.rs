//! Trait definitions for the media module.

use async_trait::async_trait;
use std::path::Path;

use super::error::MediaError;

/// Inspects videos and extracts their audio.
///
/// Errors returned from either operation are per-item failures: the caller
/// records them and moves on to the next video.
#[async_trait]
pub trait MediaCapability: Send + Sync {
    /// Returns the name of this implementation.
    fn name(&self) -> &str;

    /// Whether the file at `path` carries at least one audio stream.
    async fn has_audio_track(&self, path: &Path) -> Result<bool, MediaError>;

    /// Extracts the audio of `source` into `target`.
    ///
    /// On success `target` exists and is complete.
    async fn extract_audio(&self, source: &Path, target: &Path) -> Result<(), MediaError>;

    /// Validates that the capability is usable (binaries present, etc.).
    async fn validate(&self) -> Result<(), MediaError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SilentMedia;

    #[async_trait]
    impl MediaCapability for SilentMedia {
        fn name(&self) -> &str {
            "silent"
        }

        async fn has_audio_track(&self, _path: &Path) -> Result<bool, MediaError> {
            Ok(false)
        }

        async fn extract_audio(&self, _source: &Path, _target: &Path) -> Result<(), MediaError> {
            Err(MediaError::extraction_failed("no audio to extract", None))
        }
    }

    #[tokio::test]
    async fn test_default_validate_is_ok() {
        assert!(SilentMedia.validate().await.is_ok());
    }

    #[tokio::test]
    async fn test_trait_object_dispatch() {
        let media: Box<dyn MediaCapability> = Box::new(SilentMedia);
        assert_eq!(media.name(), "silent");
        assert!(!media.has_audio_track(Path::new("/a.mov")).await.unwrap());
        assert!(media
            .extract_audio(Path::new("/a.mov"), Path::new("/a.mp3"))
            .await
            .is_err());
    }
}
