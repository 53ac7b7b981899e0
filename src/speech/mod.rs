//! Speech Synthesis Module
//!
//! Utterances are enqueued on a [`SpeechQueue`] and played one after another
//! by a [`SpeechEngine`] owned by the queue's worker.

mod engine;
mod queue;

pub use engine::{ConsoleEngine, OpenAiTtsEngine, SpeechEngine};
pub use queue::{SpeechWorker, SynthesisQueue};

use crate::error::Result;

/// A unit of text submitted for playback
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub pitch: f32,
    pub rate: f32,
    pub volume: f32,
}

impl Utterance {
    /// Utterance at neutral pitch, normal rate and full volume.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pitch: 1.0,
            rate: 1.0,
            volume: 1.0,
        }
    }
}

/// Ordered playback queue. `speak` only enqueues; playback happens later.
#[cfg_attr(test, mockall::automock)]
pub trait SpeechQueue: Send + Sync {
    fn speak(&self, utterance: Utterance) -> Result<()>;
}

/// Enqueue `text` with the default voice parameters.
pub fn speak(queue: &dyn SpeechQueue, text: &str) -> Result<()> {
    queue.speak(Utterance::new(text))
}
