//! The predict flow: page → service → page + speech.

use std::sync::Arc;

use async_trait::async_trait;

use super::markup::{self, MarkupMode};
use super::{CivicInputs, PredictionClient, PredictionResult};
use crate::error::Result;
use crate::page::{FormSource, OUTPUT_ID, Renderer};
use crate::speech::{self, SpeechQueue};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PredictFlow: Send + Sync {
    /// Run one full predict cycle and return what was rendered.
    async fn predict(&self) -> Result<PredictionResult>;
}

pub struct Predictor {
    client: PredictionClient,
    form: Arc<dyn FormSource>,
    renderer: Arc<dyn Renderer>,
    speech: Arc<dyn SpeechQueue>,
    mode: MarkupMode,
}

impl Predictor {
    pub fn new(
        client: PredictionClient,
        form: Arc<dyn FormSource>,
        renderer: Arc<dyn Renderer>,
        speech: Arc<dyn SpeechQueue>,
    ) -> Self {
        Self {
            client,
            form,
            renderer,
            speech,
            mode: MarkupMode::default(),
        }
    }

    pub fn with_markup_mode(mut self, mode: MarkupMode) -> Self {
        self.mode = mode;
        self
    }
}

#[async_trait]
impl PredictFlow for Predictor {
    async fn predict(&self) -> Result<PredictionResult> {
        let inputs = CivicInputs::read_from(self.form.as_ref())?;

        let result = self.client.submit(&inputs).await?;

        self.renderer
            .replace_inner(OUTPUT_ID, &markup::render_result(&result, self.mode))?;
        speech::speak(self.speech.as_ref(), &markup::spoken_summary(&result))?;

        Ok(result)
    }
}
