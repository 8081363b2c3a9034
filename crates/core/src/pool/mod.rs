//! Conversion pool: the concurrent pipeline turning videos into audio.
//!
//! Three roles cooperate over bounded queues:
//! - **Feeder**: enumerates the source tree into the work queue
//! - **Conversion workers**: skip finished items, inspect, extract, and route
//!   outcomes
//! - **Outcome loggers**: append failed / no-audio identifiers to their files
//!
//! The `ConversionPool` owns every queue and task handle and enforces start
//! and shutdown ordering. Each queue carries `Message::Item` values and is
//! terminated per consumer by `Message::Stop`.
//!
//! # Example
//!
//! ```ignore
//! use soundpool_core::{ConversionPool, FfmpegMedia, MediaConfig, PoolConfig};
//!
//! let config = PoolConfig::new("/data/videos", "/data/audio")
//!     .with_categories(["playing guitar", "cats"])
//!     .with_workers(8)
//!     .with_failed_log("/data/failed.txt")
//!     .with_no_audio_log("/data/no_audio.txt");
//!
//! let pool = ConversionPool::new(config, FfmpegMedia::new(MediaConfig::default()))?;
//! let summary = pool.run().await?;
//! println!("Converted {} videos", summary.converted);
//! ```

mod controller;
mod error;
mod feeder;
mod logger;
mod queue;
mod types;
mod worker;

pub use controller::ConversionPool;
pub use error::PoolError;
pub use feeder::Feeder;
pub use logger::{create_outcome_channel, OutcomeLogger};
pub use queue::{work_queue, OutcomeHandle, OutcomeSender, WorkQueue, WorkSender};
pub use types::{
    identifier_for, Message, OutcomeKind, PoolState, RunSummary, WorkItem, TARGET_EXTENSION,
};
