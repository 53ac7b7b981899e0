//! Hosted speech services
//!
//! Speech-to-text (Groq Whisper) backing the audio-file recognizer, and
//! text-to-speech (OpenAI TTS) backing the OpenAI playback engine.

use reqwest::Client;
use serde::Deserialize;

use crate::error::{CivicError, Result};

const GROQ_TRANSCRIPTION_URL: &str = "https://api.groq.com/openai/v1/audio/transcriptions";
pub const OPENAI_SPEECH_URL: &str = "https://api.openai.com/v1/audio/speech";

const WHISPER_MODEL: &str = "whisper-large-v3-turbo";

/// Transcribe audio bytes using Groq Whisper.
///
/// `language` is an ISO-639-1 code (`en`, `de`, ...).
pub async fn transcribe_audio(
    audio_bytes: Vec<u8>,
    file_name: &str,
    groq_api_key: &str,
    language: &str,
) -> Result<String> {
    transcribe_audio_with_url(audio_bytes, file_name, groq_api_key, language, GROQ_TRANSCRIPTION_URL)
        .await
}

async fn transcribe_audio_with_url(
    audio_bytes: Vec<u8>,
    file_name: &str,
    api_key: &str,
    language: &str,
    url: &str,
) -> Result<String> {
    let client = Client::new();

    let file_part = reqwest::multipart::Part::bytes(audio_bytes)
        .file_name(file_name.to_string())
        .mime_str(mime_for(file_name))
        .map_err(|e| CivicError::Recognition(format!("Invalid audio mime type: {}", e)))?;

    let form = reqwest::multipart::Form::new()
        .part("file", file_part)
        .text("model", WHISPER_MODEL)
        .text("language", language.to_string())
        .text("response_format", "json");

    let response = client
        .post(url)
        .header("Authorization", format!("Bearer {}", api_key))
        .multipart(form)
        .send()
        .await
        .map_err(|e| CivicError::Recognition(format!("Failed to send audio to Groq Whisper: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(CivicError::Recognition(format!(
            "Groq STT error ({}): {}",
            status, error_text
        )));
    }

    let result: TranscriptionResponse = response.json().await.map_err(|e| {
        CivicError::Recognition(format!("Failed to parse Groq transcription response: {}", e))
    })?;

    tracing::info!("Groq STT: transcribed {} chars", result.text.len());

    Ok(result.text)
}

/// Synthesize speech from text using OpenAI TTS. Returns Opus audio bytes.
///
/// `url` is normally [`OPENAI_SPEECH_URL`].
pub async fn synthesize_speech(
    text: &str,
    api_key: &str,
    voice: &str,
    model: &str,
    speed: f32,
    url: &str,
) -> Result<Vec<u8>> {
    let client = Client::new();

    let body = serde_json::json!({
        "model": model,
        "input": text,
        "voice": voice,
        "speed": speed,
        "response_format": "opus",
    });

    let response = client
        .post(url)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| CivicError::Speech(format!("Failed to send TTS request to OpenAI: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(CivicError::Speech(format!(
            "OpenAI TTS error ({}): {}",
            status, error_text
        )));
    }

    let audio_bytes = response
        .bytes()
        .await
        .map_err(|e| CivicError::Speech(format!("Failed to read TTS audio bytes: {}", e)))?
        .to_vec();

    tracing::info!(
        "OpenAI TTS: generated {} bytes of audio (voice={}, model={})",
        audio_bytes.len(),
        voice,
        model,
    );

    Ok(audio_bytes)
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "webm" => "audio/webm",
        "m4a" => "audio/mp4",
        _ => "audio/ogg",
    }
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcription_response_parse() {
        let json = r#"{"text": "Please analyze the city."}"#;
        let result: TranscriptionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(result.text, "Please analyze the city.");
    }

    #[test]
    fn test_mime_for_extensions() {
        assert_eq!(mime_for("command.wav"), "audio/wav");
        assert_eq!(mime_for("command.MP3"), "audio/mpeg");
        assert_eq!(mime_for("voice.ogg"), "audio/ogg");
        assert_eq!(mime_for("no_extension"), "audio/ogg");
    }

    #[tokio::test]
    async fn test_stt_success_sends_language() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("Authorization", "Bearer test-groq-key")
            .match_body(mockito::Matcher::Regex(r#"name="language"\s+en"#.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"text": "Analyze the city"}"#)
            .create_async()
            .await;

        let result =
            transcribe_audio_with_url(vec![0u8; 100], "voice.wav", "test-groq-key", "en", &server.url())
                .await;

        mock.assert_async().await;
        assert_eq!(result.unwrap(), "Analyze the city");
    }

    #[tokio::test]
    async fn test_stt_api_error_returns_recognition_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(401)
            .with_body(r#"{"error": "Invalid API key"}"#)
            .create_async()
            .await;

        let result =
            transcribe_audio_with_url(vec![0u8; 50], "voice.ogg", "bad-key", "en", &server.url()).await;

        mock.assert_async().await;
        let err = result.unwrap_err();
        assert!(matches!(err, CivicError::Recognition(_)));
        assert!(err.to_string().contains("401"), "error should mention status code: {}", err);
    }

    #[tokio::test]
    async fn test_stt_malformed_json_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json at all")
            .create_async()
            .await;

        let result =
            transcribe_audio_with_url(vec![0u8; 50], "voice.ogg", "key", "en", &server.url()).await;

        mock.assert_async().await;
        assert!(result.unwrap_err().to_string().contains("parse"));
    }

    #[tokio::test]
    async fn test_tts_sends_correct_json_body() {
        let fake_audio = vec![0xFFu8; 64];
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("Authorization", "Bearer test-openai-key")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"model":"gpt-4o-mini-tts","voice":"ash","input":"Calm Reduce water use","speed":1.0,"response_format":"opus"}"#
                    .to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "audio/opus")
            .with_body(fake_audio.clone())
            .create_async()
            .await;

        let result = synthesize_speech(
            "Calm Reduce water use",
            "test-openai-key",
            "ash",
            "gpt-4o-mini-tts",
            1.0,
            &server.url(),
        )
        .await;

        mock.assert_async().await;
        assert_eq!(result.unwrap(), fake_audio);
    }

    #[tokio::test]
    async fn test_tts_rate_limit_returns_speech_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(429)
            .with_body(r#"{"error": "Rate limit exceeded"}"#)
            .create_async()
            .await;

        let result =
            synthesize_speech("Hello", "key", "ash", "tts-1", 1.0, &server.url()).await;

        mock.assert_async().await;
        let err = result.unwrap_err();
        assert!(matches!(err, CivicError::Speech(_)));
        assert!(err.to_string().contains("429"));
    }
}
