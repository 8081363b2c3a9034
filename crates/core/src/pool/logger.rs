use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use super::error::PoolError;
use super::queue::{OutcomeHandle, OutcomeSender};
use super::types::{Message, OutcomeKind};

/// Background task that appends outcome identifiers to a log file
pub struct OutcomeLogger {
    kind: OutcomeKind,
    path: PathBuf,
    file: File,
    rx: mpsc::Receiver<Message<String>>,
}

impl OutcomeLogger {
    /// Open `path` for appending (creating it if missing) and bind it to `rx`
    pub async fn open(
        kind: OutcomeKind,
        path: &Path,
        rx: mpsc::Receiver<Message<String>>,
    ) -> Result<Self, PoolError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|source| PoolError::LogOpenFailed {
                kind,
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            kind,
            path: path.to_path_buf(),
            file,
            rx,
        })
    }

    /// Run the logger until `Stop` arrives (or every sender is gone)
    ///
    /// Returns the number of identifiers written. This should be spawned as a
    /// background task.
    pub async fn run(mut self) -> u64 {
        tracing::info!("{} logger started ({:?})", self.kind, self.path);
        let mut written = 0;

        while let Some(Message::Item(id)) = self.rx.recv().await {
            let line = format!("{}\n", id);
            match self.file.write_all(line.as_bytes()).await {
                Ok(()) => written += 1,
                Err(e) => tracing::error!("Failed to write {} outcome {}: {}", self.kind, id, e),
            }
        }

        if let Err(e) = self.file.flush().await {
            tracing::error!("Failed to flush {} log {:?}: {}", self.kind, self.path, e);
        }

        tracing::info!("{} logger shutting down ({} written)", self.kind, written);
        written
    }
}

/// Create the queue for one outcome kind
///
/// Returns:
/// - `OutcomeHandle` - clone this into every worker
/// - the sender used to deliver the final `Stop`, and the `OutcomeLogger` to
///   spawn, when a log path is configured
///
/// # Arguments
/// * `kind` - Which outcome the queue carries
/// * `path` - Log file, or `None` to trace outcomes without a logger
/// * `capacity` - Size of the queue (emitters wait while it is full)
pub async fn create_outcome_channel(
    kind: OutcomeKind,
    path: Option<&Path>,
    capacity: usize,
) -> Result<(OutcomeHandle, Option<(OutcomeSender, OutcomeLogger)>), PoolError> {
    let Some(path) = path else {
        return Ok((OutcomeHandle::disabled(kind), None));
    };

    let (tx, rx) = mpsc::channel(capacity);
    let logger = OutcomeLogger::open(kind, path, rx).await?;
    Ok((OutcomeHandle::new(kind, tx.clone()), Some((tx, logger))))
}
