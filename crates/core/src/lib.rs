pub mod config;
pub mod media;
pub mod pool;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, PoolConfig,
};
pub use media::{FfmpegMedia, MediaCapability, MediaConfig, MediaError};
pub use pool::{ConversionPool, OutcomeKind, PoolError, PoolState, RunSummary, WorkItem};
