//! Speech recognition
//!
//! A listening session is one async call that yields every recognized
//! phrase with its ranked alternatives.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::service::transcribe_audio;
use crate::error::{CivicError, Result};

/// One candidate reading of a phrase
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub transcript: String,
    pub confidence: f32,
}

impl Alternative {
    pub fn new(transcript: impl Into<String>, confidence: f32) -> Self {
        Self {
            transcript: transcript.into(),
            confidence,
        }
    }
}

/// Everything a listening session produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recognition {
    pub phrases: Vec<Vec<Alternative>>,
}

impl Recognition {
    /// A session that heard exactly one phrase with one reading.
    pub fn single(transcript: impl Into<String>) -> Self {
        Self {
            phrases: vec![vec![Alternative::new(transcript, 1.0)]],
        }
    }

    /// Most confident reading of the first phrase, lowercased. Later phrases
    /// are ignored; on equal confidence the earlier alternative wins.
    pub fn best_transcript(&self) -> Result<String> {
        let first = self.phrases.first().ok_or(CivicError::NoSpeech)?;

        let best = first
            .iter()
            .fold(None::<&Alternative>, |best, alt| match best {
                Some(b) if b.confidence >= alt.confidence => Some(b),
                _ => Some(alt),
            })
            .ok_or(CivicError::NoSpeech)?;

        Ok(best.transcript.to_lowercase())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Listen for a single utterance in `locale` (BCP-47, e.g. `en-US`).
    async fn recognize(&self, locale: &str) -> Result<Recognition>;
}

/// Recognizer fed with typed text instead of audio.
pub struct TypedRecognizer {
    transcript: Option<String>,
}

impl TypedRecognizer {
    /// Always "hears" `transcript`.
    pub fn fixed(transcript: impl Into<String>) -> Self {
        Self {
            transcript: Some(transcript.into()),
        }
    }

    /// Reads one line from stdin per session.
    pub fn stdin() -> Self {
        Self { transcript: None }
    }
}

#[async_trait]
impl SpeechRecognizer for TypedRecognizer {
    async fn recognize(&self, locale: &str) -> Result<Recognition> {
        let line = match &self.transcript {
            Some(text) => text.clone(),
            None => {
                println!("🎙️  Listening ({}), type your command:", locale);
                let mut line = String::new();
                BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
                line
            }
        };

        let line = line.trim();
        if line.is_empty() {
            return Ok(Recognition::default());
        }
        Ok(Recognition::single(line))
    }
}

/// Recognizer that transcribes a recorded audio file with Groq Whisper.
pub struct WhisperRecognizer {
    api_key: String,
    audio_path: PathBuf,
}

impl WhisperRecognizer {
    pub fn new(api_key: impl Into<String>, audio_path: impl Into<PathBuf>) -> Self {
        Self {
            api_key: api_key.into(),
            audio_path: audio_path.into(),
        }
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperRecognizer {
    async fn recognize(&self, locale: &str) -> Result<Recognition> {
        let audio = tokio::fs::read(&self.audio_path).await.map_err(|e| {
            CivicError::Recognition(format!(
                "Failed to read audio file {}: {}",
                self.audio_path.display(),
                e
            ))
        })?;

        let file_name = self
            .audio_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "voice.ogg".to_string());

        let text = transcribe_audio(audio, &file_name, &self.api_key, language_of(locale)).await?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(Recognition::default());
        }
        Ok(Recognition::single(text))
    }
}

/// Language subtag of a locale: `en-US` → `en`.
pub fn language_of(locale: &str) -> &str {
    locale
        .split(['-', '_'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(locale)
}
