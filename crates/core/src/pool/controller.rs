//! Pool controller: owns every queue and task handle.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::PoolConfig;
use crate::media::MediaCapability;

use super::error::PoolError;
use super::feeder::Feeder;
use super::logger::create_outcome_channel;
use super::queue::{work_queue, OutcomeSender, WorkQueue, WorkSender};
use super::types::{Message, OutcomeKind, PoolState, PoolStats, RunSummary};
use super::worker::ConversionWorker;

/// A running outcome logger and the sender used to stop it.
struct ActiveLogger {
    kind: OutcomeKind,
    tx: OutcomeSender,
    handle: JoinHandle<u64>,
}

/// Converts a tree of videos into audio files with a pool of workers.
///
/// Lifecycle: `Idle -> Running -> Draining -> Stopped`. Loggers start before
/// workers; on stop, workers are drained and joined before any logger is
/// told to stop, since workers are the only producers of outcomes.
pub struct ConversionPool<M: MediaCapability + 'static> {
    config: PoolConfig,
    media: Arc<M>,
    state: PoolState,
    feeder: Feeder,
    work_tx: WorkSender,
    // Released once workers own their clones, so the queue closes if they all die.
    work_queue: Option<WorkQueue>,
    workers: Vec<JoinHandle<u64>>,
    loggers: Vec<ActiveLogger>,
    stats: Arc<PoolStats>,
    started_at: Option<DateTime<Utc>>,
}

impl<M: MediaCapability + 'static> ConversionPool<M> {
    /// Creates an idle pool.
    ///
    /// Fails if the worker count or queue capacity is zero.
    pub fn new(config: PoolConfig, media: M) -> Result<Self, PoolError> {
        Self::with_shared_media(config, Arc::new(media))
    }

    /// Creates an idle pool around an already shared media capability.
    pub fn with_shared_media(config: PoolConfig, media: Arc<M>) -> Result<Self, PoolError> {
        if config.workers == 0 {
            return Err(PoolError::InvalidConfig("workers cannot be 0".to_string()));
        }
        if config.queue_capacity == 0 {
            return Err(PoolError::InvalidConfig(
                "queue_capacity cannot be 0".to_string(),
            ));
        }

        let (work_tx, work_queue) = work_queue(config.queue_capacity);

        Ok(Self {
            feeder: Feeder::new(&config),
            config,
            media,
            state: PoolState::Idle,
            work_tx,
            work_queue: Some(work_queue),
            workers: Vec::new(),
            loggers: Vec::new(),
            stats: Arc::new(PoolStats::default()),
            started_at: None,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PoolState {
        self.state
    }

    /// The pool configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Starts the outcome loggers, then the workers.
    ///
    /// An unwritable log path fails here, before any worker exists.
    pub async fn start(&mut self) -> Result<(), PoolError> {
        if self.state != PoolState::Idle {
            return Err(PoolError::invalid_state("start", self.state));
        }

        let capacity = self.config.queue_capacity;
        let (failed, failed_logger) = create_outcome_channel(
            OutcomeKind::Failed,
            self.config.failed_log.as_deref(),
            capacity,
        )
        .await?;
        let (no_audio, no_audio_logger) = create_outcome_channel(
            OutcomeKind::NoAudio,
            self.config.no_audio_log.as_deref(),
            capacity,
        )
        .await?;

        let Some(work_queue) = self.work_queue.take() else {
            return Err(PoolError::invalid_state("start", self.state));
        };

        for (kind, active) in [
            (OutcomeKind::Failed, failed_logger),
            (OutcomeKind::NoAudio, no_audio_logger),
        ] {
            if let Some((tx, logger)) = active {
                self.loggers.push(ActiveLogger {
                    kind,
                    tx,
                    handle: tokio::spawn(logger.run()),
                });
            }
        }

        for index in 0..self.config.workers {
            let worker = ConversionWorker::new(
                index,
                Arc::clone(&self.media),
                work_queue.clone(),
                failed.clone(),
                no_audio.clone(),
                Arc::clone(&self.stats),
            );
            self.workers.push(tokio::spawn(worker.run()));
        }

        self.started_at = Some(Utc::now());
        self.state = PoolState::Running;
        info!(
            "Conversion pool started: {} workers, {} loggers, media: {}",
            self.workers.len(),
            self.loggers.len(),
            self.media.name()
        );
        Ok(())
    }

    /// Enumerates the source tree into the work queue.
    ///
    /// Waits whenever the queue is full while running. While idle nothing
    /// consumes the queue yet, so filling it fails with `QueueFull`; the
    /// items already enqueued stay queued for the workers.
    pub async fn feed(&self) -> Result<u64, PoolError> {
        let wait_when_full = match self.state {
            PoolState::Idle => false,
            PoolState::Running => true,
            state => return Err(PoolError::invalid_state("feed", state)),
        };
        self.feeder
            .feed_counted(&self.work_tx, Some(&self.stats), wait_when_full)
            .await
    }

    /// Drains the pool and returns the run summary.
    ///
    /// Every item enqueued before this call is processed: stop messages queue
    /// up behind it, one per worker.
    pub async fn stop(&mut self) -> Result<RunSummary, PoolError> {
        if self.state != PoolState::Running {
            return Err(PoolError::invalid_state("stop", self.state));
        }
        self.state = PoolState::Draining;
        info!("Draining conversion pool");

        let mut failures = Vec::new();

        for _ in 0..self.workers.len() {
            if self.work_tx.send(Message::Stop).await.is_err() {
                // Every worker is gone and the queue closed with them.
                break;
            }
        }
        for (index, result) in join_all(self.workers.drain(..)).await.into_iter().enumerate() {
            match result {
                Ok(handled) => debug!("Worker {} joined after {} items", index, handled),
                Err(e) => {
                    error!("Worker {} failed: {}", index, e);
                    failures.push(format!("worker {}: {}", index, e));
                }
            }
        }

        for logger in self.loggers.drain(..) {
            if logger.tx.send(Message::Stop).await.is_err() {
                debug!("{} logger already gone", logger.kind);
            }
            match logger.handle.await {
                Ok(written) => debug!("{} logger joined after {} records", logger.kind, written),
                Err(e) => {
                    error!("{} logger failed: {}", logger.kind, e);
                    failures.push(format!("{} logger: {}", logger.kind, e));
                }
            }
        }

        self.state = PoolState::Stopped;
        let finished_at = Utc::now();
        let summary = self
            .stats
            .to_summary(self.started_at.unwrap_or(finished_at), finished_at);

        info!(
            "Conversion pool stopped: {} enqueued, {} converted, {} skipped, {} without audio, {} failed",
            summary.enqueued, summary.converted, summary.skipped, summary.no_audio, summary.failed
        );

        if !failures.is_empty() {
            return Err(PoolError::TaskFailed(failures.join("; ")));
        }
        Ok(summary)
    }

    /// Starts the pool, feeds the whole source tree, and drains it.
    ///
    /// A feed error still drains the pool before being returned.
    pub async fn run(mut self) -> Result<RunSummary, PoolError> {
        self.start().await?;
        let fed = self.feed().await;
        let summary = self.stop().await?;
        fed?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaError;
    use crate::testing::{fixtures, MockMedia};
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    fn flat_config(dir: &TempDir) -> PoolConfig {
        PoolConfig::new(dir.path().join("videos"), dir.path().join("audio")).with_workers(2)
    }

    #[test]
    fn test_new_rejects_zero_workers_and_capacity() {
        let dir = TempDir::new().unwrap();
        let err = ConversionPool::new(flat_config(&dir).with_workers(0), MockMedia::new())
            .err()
            .unwrap();
        assert!(matches!(err, PoolError::InvalidConfig(_)));

        let err = ConversionPool::new(flat_config(&dir).with_queue_capacity(0), MockMedia::new())
            .err()
            .unwrap();
        assert!(matches!(err, PoolError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let dir = TempDir::new().unwrap();
        fixtures::videos(&dir.path().join("videos"), &["a.mov"]);
        let mut pool = ConversionPool::new(flat_config(&dir), MockMedia::new()).unwrap();
        assert_eq!(pool.state(), PoolState::Idle);

        pool.start().await.unwrap();
        assert_eq!(pool.state(), PoolState::Running);

        assert_eq!(pool.feed().await.unwrap(), 1);
        let summary = pool.stop().await.unwrap();
        assert_eq!(pool.state(), PoolState::Stopped);
        assert_eq!(summary.enqueued, 1);
        assert_eq!(summary.converted, 1);
    }

    #[tokio::test]
    async fn test_wrong_state_operations_fail() {
        let dir = TempDir::new().unwrap();
        fixtures::videos(&dir.path().join("videos"), &["a.mov"]);
        let mut pool = ConversionPool::new(flat_config(&dir), MockMedia::new()).unwrap();

        assert!(matches!(
            pool.stop().await,
            Err(PoolError::InvalidState { state: PoolState::Idle, .. })
        ));

        pool.start().await.unwrap();
        assert!(matches!(
            pool.start().await,
            Err(PoolError::InvalidState { state: PoolState::Running, .. })
        ));

        pool.stop().await.unwrap();
        assert!(matches!(
            pool.feed().await,
            Err(PoolError::InvalidState { state: PoolState::Stopped, .. })
        ));
        assert!(pool.stop().await.is_err());
    }

    #[tokio::test]
    async fn test_feed_before_start_within_capacity() {
        let dir = TempDir::new().unwrap();
        fixtures::videos(&dir.path().join("videos"), &["a.mov", "b.mov"]);
        let media = MockMedia::new();
        let mut pool = ConversionPool::new(flat_config(&dir), media.clone()).unwrap();

        assert_eq!(pool.feed().await.unwrap(), 2);
        pool.start().await.unwrap();
        let summary = pool.stop().await.unwrap();

        assert_eq!(summary.converted, 2);
        assert_eq!(media.extraction_count().await, 2);
    }

    #[tokio::test]
    async fn test_feed_while_idle_fails_when_queue_fills() {
        let dir = TempDir::new().unwrap();
        fixtures::videos(&dir.path().join("videos"), &["a.mov", "b.mov", "c.mov"]);
        let media = MockMedia::new();
        let config = flat_config(&dir).with_queue_capacity(2);
        let mut pool = ConversionPool::new(config, media.clone()).unwrap();

        let err = pool.feed().await.unwrap_err();
        assert!(matches!(err, PoolError::QueueFull(2)));

        // What made it into the queue is still processed
        pool.start().await.unwrap();
        let summary = pool.stop().await.unwrap();
        assert_eq!(summary.enqueued, 2);
        assert_eq!(summary.converted, 2);
        assert_eq!(media.extraction_count().await, 2);
    }

    /// Media whose probe panics, taking the worker down with it.
    struct PanickingMedia;

    #[async_trait::async_trait]
    impl MediaCapability for PanickingMedia {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn has_audio_track(&self, _source: &Path) -> Result<bool, MediaError> {
            panic!("probe crashed");
        }

        async fn extract_audio(&self, _source: &Path, _target: &Path) -> Result<(), MediaError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_stop_reports_dead_workers() {
        let dir = TempDir::new().unwrap();
        fixtures::videos(&dir.path().join("videos"), &["a.mov", "b.mov", "c.mov"]);
        let config = flat_config(&dir).with_workers(1).with_queue_capacity(2);
        let mut pool = ConversionPool::new(config, PanickingMedia).unwrap();

        pool.start().await.unwrap();
        // Either fills the queue or sees it close once the worker dies
        let _ = pool.feed().await;

        let result = tokio::time::timeout(Duration::from_secs(5), pool.stop())
            .await
            .expect("stop must not hang when every worker died");
        assert!(matches!(result, Err(PoolError::TaskFailed(_))));
        assert_eq!(pool.state(), PoolState::Stopped);
    }

    #[tokio::test]
    async fn test_unwritable_log_fails_start() {
        let dir = TempDir::new().unwrap();
        let config = flat_config(&dir).with_failed_log(dir.path().join("no-such-dir/failed.txt"));
        let mut pool = ConversionPool::new(config, MockMedia::new()).unwrap();

        let err = pool.start().await.unwrap_err();
        assert!(matches!(err, PoolError::LogOpenFailed { kind: OutcomeKind::Failed, .. }));
        assert_eq!(pool.state(), PoolState::Idle);
    }

    #[tokio::test]
    async fn test_run_drains_after_feed_error() {
        let dir = TempDir::new().unwrap();
        // Source root never created
        let pool = ConversionPool::new(flat_config(&dir), MockMedia::new()).unwrap();

        let err = pool.run().await.unwrap_err();
        assert!(matches!(err, PoolError::SourceUnreadable { .. }));
    }
}
