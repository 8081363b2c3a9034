//! Feeder: turns the source tree into work items.

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info};

use crate::config::PoolConfig;

use super::error::PoolError;
use super::queue::WorkSender;
use super::types::{Message, PoolStats, WorkItem};

/// Enumerates source videos and pushes one work item per file.
///
/// The target tree mirrors only the categories that exist in the source
/// tree. Sending blocks while the work queue is full.
#[derive(Debug, Clone)]
pub struct Feeder {
    source_root: PathBuf,
    target_root: PathBuf,
    categories: Option<Vec<String>>,
    extensions: Vec<String>,
}

impl Feeder {
    pub fn new(config: &PoolConfig) -> Self {
        Self {
            source_root: config.source_root.clone(),
            target_root: config.target_root.clone(),
            categories: config.categories.clone(),
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Directory name used for a category on both sides.
    pub fn category_dir_name(category: &str) -> String {
        category.replace(' ', "_")
    }

    /// Pushes every source file into `tx`, returning how many were sent.
    pub async fn feed(&self, tx: &WorkSender) -> Result<u64, PoolError> {
        self.feed_counted(tx, None, true).await
    }

    /// With `wait_when_full` unset, a full queue fails with `QueueFull`
    /// instead of waiting for a consumer.
    pub(crate) async fn feed_counted(
        &self,
        tx: &WorkSender,
        stats: Option<&Arc<PoolStats>>,
        wait_when_full: bool,
    ) -> Result<u64, PoolError> {
        let Some(categories) = &self.categories else {
            let sent = self
                .feed_dir(&self.source_root, &self.target_root, tx, stats, wait_when_full)
                .await?;
            info!("Fed {} videos from {:?}", sent, self.source_root);
            return Ok(sent);
        };

        // The root itself must be readable even if every category is missing.
        if let Err(source) = tokio::fs::metadata(&self.source_root).await {
            return Err(PoolError::SourceUnreadable {
                path: self.source_root.clone(),
                source,
            });
        }

        let mut total = 0;
        for category in categories {
            let dir_name = Self::category_dir_name(category);
            let source_dir = self.source_root.join(&dir_name);
            let target_dir = self.target_root.join(&dir_name);

            if !is_dir(&source_dir).await {
                debug!("Skipping category {:?}: {:?} does not exist", category, source_dir);
                continue;
            }

            // Another pool may create it concurrently; create_dir_all treats
            // an existing directory as success.
            tokio::fs::create_dir_all(&target_dir)
                .await
                .map_err(|source| PoolError::TargetDirFailed {
                    path: target_dir.clone(),
                    source,
                })?;

            let sent = self
                .feed_dir(&source_dir, &target_dir, tx, stats, wait_when_full)
                .await?;
            debug!("Fed {} videos from category {:?}", sent, category);
            total += sent;
        }

        info!(
            "Fed {} videos from {} categories under {:?}",
            total,
            categories.len(),
            self.source_root
        );
        Ok(total)
    }

    async fn feed_dir(
        &self,
        source_dir: &Path,
        target_dir: &Path,
        tx: &WorkSender,
        stats: Option<&Arc<PoolStats>>,
        wait_when_full: bool,
    ) -> Result<u64, PoolError> {
        let unreadable = |source| PoolError::SourceUnreadable {
            path: source_dir.to_path_buf(),
            source,
        };

        let mut entries = tokio::fs::read_dir(source_dir).await.map_err(unreadable)?;
        let mut sent = 0;

        while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
            let path = entry.path();
            // Follows symlinks, so linked videos are fed too.
            if !is_file(&path).await || !self.accepts(&path) {
                continue;
            }

            let Some(item) = WorkItem::new(path, target_dir) else {
                continue;
            };

            let message = Message::Item(item);
            if wait_when_full {
                tx.send(message).await.map_err(|_| PoolError::QueueClosed)?;
            } else {
                tx.try_send(message).map_err(|e| match e {
                    TrySendError::Full(_) => PoolError::QueueFull(tx.max_capacity()),
                    TrySendError::Closed(_) => PoolError::QueueClosed,
                })?;
            }
            if let Some(stats) = stats {
                stats.enqueued.fetch_add(1, Ordering::Relaxed);
            }
            sent += 1;
        }

        Ok(sent)
    }

    fn accepts(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|allowed| e.eq_ignore_ascii_case(allowed)))
            .unwrap_or(false)
    }
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}
