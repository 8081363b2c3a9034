//! FFmpeg-based media capability.

use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use super::config::MediaConfig;
use super::error::MediaError;
use super::traits::MediaCapability;

/// Suffix appended to the target path while ffmpeg is still writing.
const PARTIAL_SUFFIX: &str = ".part";

/// FFmpeg-based media capability.
///
/// Audio is written to `<target>.part` and renamed onto `target` only once
/// ffmpeg exits successfully, so a target file never exists half-written.
pub struct FfmpegMedia {
    config: MediaConfig,
}

impl FfmpegMedia {
    /// Creates a new FFmpeg media capability with the given configuration.
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }

    /// Creates a media capability with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(MediaConfig::default())
    }

    /// Path ffmpeg writes to before the final rename.
    fn partial_path(target: &Path) -> PathBuf {
        let mut name: OsString = target.as_os_str().to_owned();
        name.push(PARTIAL_SUFFIX);
        PathBuf::from(name)
    }

    /// Builds ffprobe arguments listing only audio streams.
    fn build_probe_args(path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "quiet".to_string(),
            "-print_format".to_string(),
            "json".to_string(),
            "-show_streams".to_string(),
            "-select_streams".to_string(),
            "a".to_string(),
            path.to_string_lossy().to_string(),
        ]
    }

    /// Builds ffmpeg arguments extracting the first audio stream as MP3.
    fn build_extract_args(&self, source: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            source.to_string_lossy().to_string(),
            "-vn".to_string(),
            "-map".to_string(),
            "0:a:0".to_string(),
            "-c:a".to_string(),
            "libmp3lame".to_string(),
            "-b:a".to_string(),
            format!("{}k", self.config.bitrate_kbps),
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
            // The output name ends in ".part", so the muxer must be explicit.
            "-f".to_string(),
            "mp3".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }

    /// Parses ffprobe JSON output and reports whether an audio stream is listed.
    fn parse_probe_output(output: &str) -> Result<bool, MediaError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            #[serde(default)]
            streams: Vec<ProbeStream>,
        }

        #[derive(Deserialize)]
        struct ProbeStream {
            codec_type: Option<String>,
        }

        let probe: ProbeOutput =
            serde_json::from_str(output).map_err(|e| MediaError::ParseError {
                reason: format!("Failed to parse ffprobe output: {}", e),
            })?;

        Ok(probe
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("audio")))
    }

    fn spawn_error(&self, e: std::io::Error, binary: &Path, probe: bool) -> MediaError {
        if e.kind() != std::io::ErrorKind::NotFound {
            return MediaError::Io(e);
        }
        let path = binary.to_path_buf();
        if probe {
            MediaError::FfprobeNotFound { path }
        } else {
            MediaError::FfmpegNotFound { path }
        }
    }

    async fn discard_partial(partial: &Path) {
        if let Err(e) = tokio::fs::remove_file(partial).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove partial output {:?}: {}", partial, e);
            }
        }
    }
}

#[async_trait]
impl MediaCapability for FfmpegMedia {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn has_audio_track(&self, path: &Path) -> Result<bool, MediaError> {
        if !path.exists() {
            return Err(MediaError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let output = Command::new(&self.config.ffprobe_path)
            .args(Self::build_probe_args(path))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e, &self.config.ffprobe_path, true))?;

        if !output.status.success() {
            return Err(MediaError::probe_failed(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        Self::parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }

    async fn extract_audio(&self, source: &Path, target: &Path) -> Result<(), MediaError> {
        if !source.exists() {
            return Err(MediaError::InputNotFound {
                path: source.to_path_buf(),
            });
        }

        let start = Instant::now();
        let partial = Self::partial_path(target);

        let child = Command::new(&self.config.ffmpeg_path)
            .args(self.build_extract_args(source, &partial))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e, &self.config.ffmpeg_path, false))?;

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let output = match timeout(timeout_duration, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                Self::discard_partial(&partial).await;
                return Err(MediaError::Io(e));
            }
            Err(_) => {
                // Dropping the wait future drops the child, which kills it.
                Self::discard_partial(&partial).await;
                return Err(MediaError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        };

        if !output.status.success() {
            Self::discard_partial(&partial).await;
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(MediaError::extraction_failed(
                format!("FFmpeg exited with code: {:?}", output.status.code()),
                if stderr.is_empty() { None } else { Some(stderr) },
            ));
        }

        if let Err(e) = tokio::fs::rename(&partial, target).await {
            Self::discard_partial(&partial).await;
            return Err(MediaError::Io(e));
        }

        tracing::debug!(
            "Extracted audio {:?} -> {:?} in {} ms",
            source,
            target,
            start.elapsed().as_millis()
        );

        Ok(())
    }

    async fn validate(&self) -> Result<(), MediaError> {
        Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await
            .map_err(|e| self.spawn_error(e, &self.config.ffmpeg_path, false))?;

        Command::new(&self.config.ffprobe_path)
            .arg("-version")
            .output()
            .await
            .map_err(|e| self.spawn_error(e, &self.config.ffprobe_path, true))?;

        Ok(())
    }
}
