//! Conversion worker.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::media::MediaCapability;

use super::queue::{OutcomeHandle, WorkQueue};
use super::types::{Message, PoolStats, WorkItem};

/// What a worker did with one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ItemResult {
    /// Target already existed.
    Skipped,
    Converted,
    NoAudio,
    Failed,
}

/// Pulls work items until it receives `Stop`.
pub(crate) struct ConversionWorker<M: MediaCapability + ?Sized> {
    index: usize,
    media: Arc<M>,
    queue: WorkQueue,
    failed: OutcomeHandle,
    no_audio: OutcomeHandle,
    stats: Arc<PoolStats>,
}

impl<M: MediaCapability + ?Sized> ConversionWorker<M> {
    pub(crate) fn new(
        index: usize,
        media: Arc<M>,
        queue: WorkQueue,
        failed: OutcomeHandle,
        no_audio: OutcomeHandle,
        stats: Arc<PoolStats>,
    ) -> Self {
        Self {
            index,
            media,
            queue,
            failed,
            no_audio,
            stats,
        }
    }

    /// Processes items until `Stop`, returning how many were handled.
    pub(crate) async fn run(self) -> u64 {
        debug!("Worker {} started", self.index);
        let mut handled = 0;

        loop {
            match self.queue.recv().await {
                Some(Message::Item(item)) => {
                    let result = self.process(&item).await;
                    self.record(result);
                    handled += 1;
                }
                Some(Message::Stop) => break,
                None => {
                    warn!("Worker {}: work queue closed without a stop message", self.index);
                    break;
                }
            }
        }

        debug!("Worker {} finished after {} items", self.index, handled);
        handled
    }

    pub(crate) async fn process(&self, item: &WorkItem) -> ItemResult {
        if tokio::fs::try_exists(&item.target_path).await.unwrap_or(false) {
            debug!("Skipping {}: {:?} already exists", item.id, item.target_path);
            return ItemResult::Skipped;
        }

        if let Err(e) = tokio::fs::create_dir_all(&item.target_dir).await {
            warn!(
                "Failed to create target directory {:?} for {}: {}",
                item.target_dir, item.id, e
            );
            self.failed.emit(item.id.clone()).await;
            return ItemResult::Failed;
        }

        match self.media.has_audio_track(&item.source_path).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("{} has no audio track", item.id);
                self.no_audio.emit(item.id.clone()).await;
                return ItemResult::NoAudio;
            }
            Err(e) => {
                warn!("Failed to inspect {:?}: {}", item.source_path, e);
                self.failed.emit(item.id.clone()).await;
                return ItemResult::Failed;
            }
        }

        match self
            .media
            .extract_audio(&item.source_path, &item.target_path)
            .await
        {
            Ok(()) => {
                info!("Converted {} -> {:?}", item.id, item.target_path);
                ItemResult::Converted
            }
            Err(e) => {
                warn!("Failed to extract audio from {:?}: {}", item.source_path, e);
                self.failed.emit(item.id.clone()).await;
                ItemResult::Failed
            }
        }
    }

    fn record(&self, result: ItemResult) {
        let counter = match result {
            ItemResult::Skipped => &self.stats.skipped,
            ItemResult::Converted => &self.stats.converted,
            ItemResult::NoAudio => &self.stats.no_audio,
            ItemResult::Failed => &self.stats.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
