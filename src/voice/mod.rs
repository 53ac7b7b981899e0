//! Voice Module
//!
//! Speech recognition, the voice controller that triggers predictions, and
//! the hosted STT/TTS services behind them.

mod controller;
pub mod recognition;
pub mod service;

pub use controller::{
    DEFAULT_LOCALE, DEFAULT_PROMPT, DEFAULT_TRIGGER, VoiceController, VoiceOutcome,
};
pub use recognition::{
    Alternative, Recognition, SpeechRecognizer, TypedRecognizer, WhisperRecognizer,
};
