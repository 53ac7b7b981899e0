//! Voice Controller
//!
//! One listening session decides between running the predict flow and
//! prompting the user for parameters.

use std::sync::Arc;
use std::time::Duration;

use super::recognition::SpeechRecognizer;
use crate::config::VoiceConfig;
use crate::error::{CivicError, Result};
use crate::predictor::{PredictFlow, PredictionResult};
use crate::speech::{self, SpeechQueue};

pub const DEFAULT_LOCALE: &str = "en-US";
pub const DEFAULT_TRIGGER: &str = "analyze";
pub const DEFAULT_PROMPT: &str = "Please provide civic parameters first.";

/// What a session did
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceOutcome {
    /// The trigger was heard and the predict flow completed
    Analyzed(PredictionResult),
    /// The trigger was not heard; the prompt was spoken
    Prompted { transcript: String },
}

pub struct VoiceController {
    recognizer: Arc<dyn SpeechRecognizer>,
    predictor: Arc<dyn PredictFlow>,
    speech: Arc<dyn SpeechQueue>,
    locale: String,
    trigger: String,
    prompt: String,
    listen_timeout: Duration,
}

impl VoiceController {
    pub fn new(
        recognizer: Arc<dyn SpeechRecognizer>,
        predictor: Arc<dyn PredictFlow>,
        speech: Arc<dyn SpeechQueue>,
    ) -> Self {
        Self::with_config(recognizer, predictor, speech, &VoiceConfig::default())
    }

    pub fn with_config(
        recognizer: Arc<dyn SpeechRecognizer>,
        predictor: Arc<dyn PredictFlow>,
        speech: Arc<dyn SpeechQueue>,
        config: &VoiceConfig,
    ) -> Self {
        Self {
            recognizer,
            predictor,
            speech,
            locale: config.locale.clone(),
            trigger: config.trigger.to_lowercase(),
            prompt: config.prompt.clone(),
            listen_timeout: Duration::from_secs(config.listen_timeout_secs),
        }
    }

    pub fn with_listen_timeout(mut self, timeout: Duration) -> Self {
        self.listen_timeout = timeout;
        self
    }

    /// Listen once, then analyze or prompt.
    pub async fn start_voice(&self) -> Result<VoiceOutcome> {
        tracing::info!("Listening for a command ({})", self.locale);

        let recognition = tokio::time::timeout(
            self.listen_timeout,
            self.recognizer.recognize(&self.locale),
        )
        .await
        .map_err(|_| CivicError::ListenTimeout(self.listen_timeout))??;

        let transcript = recognition.best_transcript()?;
        tracing::info!("Heard: {:?}", transcript);

        if transcript.contains(&self.trigger) {
            let result = self.predictor.predict().await?;
            Ok(VoiceOutcome::Analyzed(result))
        } else {
            speech::speak(self.speech.as_ref(), &self.prompt)?;
            Ok(VoiceOutcome::Prompted { transcript })
        }
    }
}
