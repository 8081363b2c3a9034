//! Media capability used by the conversion workers.
//!
//! The pool never touches codecs itself. It asks a [`MediaCapability`] two
//! questions per video: does it carry an audio track, and can that track be
//! extracted to a given target path.
//!
//! # Example
//!
//! ```ignore
//! use soundpool_core::media::{FfmpegMedia, MediaCapability, MediaConfig};
//!
//! let media = FfmpegMedia::new(MediaConfig::default());
//! media.validate().await?;
//!
//! if media.has_audio_track(Path::new("/videos/clip.mp4")).await? {
//!     media
//!         .extract_audio(Path::new("/videos/clip.mp4"), Path::new("/audio/clip.mp3"))
//!         .await?;
//! }
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;

pub use config::MediaConfig;
pub use error::MediaError;
pub use ffmpeg::FfmpegMedia;
pub use traits::MediaCapability;
