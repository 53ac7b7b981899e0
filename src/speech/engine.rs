//! Playback engines

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::Utterance;
use crate::config::SpeechConfig;
use crate::error::{CivicError, Result};
use crate::voice::service::{OPENAI_SPEECH_URL, synthesize_speech};

/// Host speech engine. `play` resolves once the utterance has been rendered.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    async fn play(&self, utterance: &Utterance) -> Result<()>;
}

/// Prints each utterance to stdout.
#[derive(Debug, Default)]
pub struct ConsoleEngine;

#[async_trait]
impl SpeechEngine for ConsoleEngine {
    async fn play(&self, utterance: &Utterance) -> Result<()> {
        println!("🔊 {}", utterance.text);
        Ok(())
    }
}

/// Synthesizes each utterance through OpenAI TTS and stores the Opus clip
/// as `utterance-NNNN.opus` under the output directory.
pub struct OpenAiTtsEngine {
    api_key: String,
    voice: String,
    model: String,
    output_dir: PathBuf,
    url: String,
    counter: AtomicUsize,
}

impl OpenAiTtsEngine {
    pub fn new(api_key: impl Into<String>, config: &SpeechConfig) -> Self {
        Self {
            api_key: api_key.into(),
            voice: config.tts_voice.clone(),
            model: config.tts_model.clone(),
            output_dir: config.output_dir.clone(),
            url: OPENAI_SPEECH_URL.to_string(),
            counter: AtomicUsize::new(0),
        }
    }

    /// Send synthesis requests to `url` instead of the OpenAI endpoint.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Build from config, taking the key from `speech.openai_api_key`.
    pub fn from_config(config: &SpeechConfig) -> Result<Self> {
        let api_key = config.openai_api_key.as_deref().ok_or_else(|| {
            CivicError::Config("OpenAI TTS selected but OPENAI_API_KEY is not set".to_string())
        })?;
        Ok(Self::new(api_key, config))
    }

    fn next_clip_path(&self) -> PathBuf {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.output_dir.join(format!("utterance-{:04}.opus", n))
    }
}

#[async_trait]
impl SpeechEngine for OpenAiTtsEngine {
    async fn play(&self, utterance: &Utterance) -> Result<()> {
        let audio = synthesize_speech(
            &utterance.text,
            &self.api_key,
            &self.voice,
            &self.model,
            utterance.rate,
            &self.url,
        )
        .await?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.next_clip_path();
        tokio::fs::write(&path, &audio).await?;

        tracing::info!("Saved utterance audio to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_console_engine_plays() {
        let engine = ConsoleEngine;
        assert!(engine.play(&Utterance::new("hello")).await.is_ok());
    }

    #[test]
    fn test_openai_engine_requires_key() {
        let config = SpeechConfig {
            openai_api_key: None,
            ..SpeechConfig::default()
        };
        let err = OpenAiTtsEngine::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_clip_paths_are_numbered() {
        let dir = tempfile::tempdir().unwrap();
        let config = SpeechConfig {
            output_dir: dir.path().to_path_buf(),
            ..SpeechConfig::default()
        };
        let engine = OpenAiTtsEngine::new("key", &config);
        assert_eq!(engine.next_clip_path(), dir.path().join("utterance-0001.opus"));
        assert_eq!(engine.next_clip_path(), dir.path().join("utterance-0002.opus"));
    }

    #[tokio::test]
    async fn test_openai_engine_saves_numbered_clips() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("POST", "/")
            .match_header("Authorization", "Bearer test-openai-key")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"input":"Calm Reduce water use"}"#.to_string(),
            ))
            .with_status(200)
            .with_body(vec![0x01u8; 16])
            .create_async()
            .await;
        let second = server
            .mock("POST", "/")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"input":"Please provide civic parameters first."}"#.to_string(),
            ))
            .with_status(200)
            .with_body(vec![0x02u8; 8])
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = SpeechConfig {
            output_dir: dir.path().join("speech"),
            ..SpeechConfig::default()
        };
        let engine = OpenAiTtsEngine::new("test-openai-key", &config).with_url(server.url());

        engine.play(&Utterance::new("Calm Reduce water use")).await.unwrap();
        engine
            .play(&Utterance::new("Please provide civic parameters first."))
            .await
            .unwrap();

        first.assert_async().await;
        second.assert_async().await;
        let clips = dir.path().join("speech");
        assert_eq!(std::fs::read(clips.join("utterance-0001.opus")).unwrap(), vec![0x01u8; 16]);
        assert_eq!(std::fs::read(clips.join("utterance-0002.opus")).unwrap(), vec![0x02u8; 8]);
    }

    #[tokio::test]
    async fn test_openai_engine_api_error_writes_nothing() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(500)
            .with_body("upstream down")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = SpeechConfig {
            output_dir: dir.path().to_path_buf(),
            ..SpeechConfig::default()
        };
        let engine = OpenAiTtsEngine::new("key", &config).with_url(server.url());

        let err = engine.play(&Utterance::new("hello")).await.unwrap_err();
        assert!(matches!(err, CivicError::Speech(_)));
        assert!(!dir.path().join("utterance-0001.opus").exists());
    }
}
