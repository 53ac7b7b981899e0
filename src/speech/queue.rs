//! Sequential synthesis queue
//!
//! A single worker task drains an unbounded channel, so utterances play in
//! the order they were enqueued and `speak` never waits on playback.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{SpeechEngine, SpeechQueue, Utterance};
use crate::error::{CivicError, Result};

#[derive(Debug, Clone)]
pub struct SynthesisQueue {
    tx: mpsc::UnboundedSender<Utterance>,
}

/// Handle on the playback task
pub struct SpeechWorker {
    handle: JoinHandle<usize>,
}

impl SynthesisQueue {
    /// Start the playback worker. Must be called inside a Tokio runtime.
    pub fn spawn(engine: Arc<dyn SpeechEngine>) -> (Self, SpeechWorker) {
        let (tx, mut rx) = mpsc::unbounded_channel::<Utterance>();

        let handle = tokio::spawn(async move {
            let mut played = 0usize;
            while let Some(utterance) = rx.recv().await {
                match engine.play(&utterance).await {
                    Ok(()) => played += 1,
                    Err(e) => tracing::warn!("Failed to play utterance {:?}: {}", utterance.text, e),
                }
            }
            tracing::debug!("Speech queue closed after {} utterance(s)", played);
            played
        });

        (Self { tx }, SpeechWorker { handle })
    }
}

impl SpeechQueue for SynthesisQueue {
    fn speak(&self, utterance: Utterance) -> Result<()> {
        tracing::debug!("Enqueue utterance: {}", utterance.text);
        self.tx
            .send(utterance)
            .map_err(|_| CivicError::Speech("speech queue is closed".to_string()))
    }
}

impl SpeechWorker {
    /// Wait until every queue handle is dropped and the backlog has played.
    /// Returns how many utterances played successfully.
    pub async fn drain(self) -> Result<usize> {
        self.handle
            .await
            .map_err(|e| CivicError::Speech(format!("speech worker failed: {}", e)))
    }

    /// Stop playback immediately, discarding anything still queued.
    #[cfg(test)]
    fn abort(&self) {
        self.handle.abort();
    }
}
