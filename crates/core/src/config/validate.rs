use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - At least one worker and a non-zero queue capacity
/// - Source root exists and is a directory
/// - Source and target roots differ
/// - Media timeout and bitrate are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let pool = &config.pool;

    if pool.workers == 0 {
        return Err(ConfigError::ValidationError(
            "pool.workers cannot be 0".to_string(),
        ));
    }

    if pool.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "pool.queue_capacity cannot be 0".to_string(),
        ));
    }

    if !pool.source_root.is_dir() {
        return Err(ConfigError::ValidationError(format!(
            "pool.source_root is not a readable directory: {}",
            pool.source_root.display()
        )));
    }

    if pool.source_root == pool.target_root {
        return Err(ConfigError::ValidationError(
            "pool.source_root and pool.target_root must differ".to_string(),
        ));
    }

    if config.media.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "media.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.media.bitrate_kbps == 0 {
        return Err(ConfigError::ValidationError(
            "media.bitrate_kbps cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use crate::media::MediaConfig;
    use tempfile::TempDir;

    fn config_for(source: &TempDir) -> Config {
        Config {
            pool: PoolConfig::new(source.path(), source.path().join("out")),
            media: MediaConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        let source = TempDir::new().unwrap();
        assert!(validate_config(&config_for(&source)).is_ok());
    }

    #[test]
    fn test_validate_zero_workers_fails() {
        let source = TempDir::new().unwrap();
        let mut config = config_for(&source);
        config.pool.workers = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_capacity_fails() {
        let source = TempDir::new().unwrap();
        let mut config = config_for(&source);
        config.pool.queue_capacity = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_missing_source_root_fails() {
        let source = TempDir::new().unwrap();
        let mut config = config_for(&source);
        config.pool.source_root = source.path().join("does-not-exist");
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("source_root"));
    }

    #[test]
    fn test_validate_same_roots_fails() {
        let source = TempDir::new().unwrap();
        let mut config = config_for(&source);
        config.pool.target_root = config.pool.source_root.clone();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let source = TempDir::new().unwrap();
        let mut config = config_for(&source);
        config.media.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }
}
