//! CLI Module
//!
//! Command-line interface for CivicTwin using Clap v4.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::page::{Document, OUTPUT_ID};
use crate::predictor::{CivicInputs, MarkupMode, PredictFlow, PredictionClient, Predictor};
use crate::speech::{ConsoleEngine, OpenAiTtsEngine, SpeechEngine, SpeechQueue, SynthesisQueue};
use crate::voice::{SpeechRecognizer, TypedRecognizer, VoiceController, VoiceOutcome, WhisperRecognizer};

/// CivicTwin - voice-driven civic stress prediction client
#[derive(Parser, Debug)]
#[command(name = "civictwin")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug mode (creates log files in .civictwin/logs/)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send the civic readings to the prediction service and show the verdict
    Predict {
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Listen for one voice command; "analyze" runs a prediction
    Voice {
        #[command(flatten)]
        fields: FieldArgs,

        /// Use this text as the recognized transcript
        #[arg(short, long, conflicts_with = "audio")]
        transcript: Option<String>,

        /// Transcribe this recorded audio file (requires GROQ_API_KEY)
        #[arg(short, long)]
        audio: Option<PathBuf>,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration
    Config {
        /// Show full configuration including secrets
        #[arg(short, long)]
        show_secrets: bool,
    },
}

/// Values of the page's input fields. Passed through verbatim.
#[derive(Args, Debug, Clone, Default)]
pub struct FieldArgs {
    #[arg(long, default_value = "")]
    pub traffic: String,

    #[arg(long, default_value = "")]
    pub pollution: String,

    #[arg(long, default_value = "")]
    pub power_usage: String,

    #[arg(long, default_value = "")]
    pub water_use: String,

    #[arg(long, default_value = "")]
    pub complaints: String,
}

impl From<FieldArgs> for CivicInputs {
    fn from(args: FieldArgs) -> Self {
        Self {
            traffic: args.traffic,
            pollution: args.pollution,
            power_usage: args.power_usage,
            water_use: args.water_use,
            complaints: args.complaints,
        }
    }
}

/// Main CLI entry point
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    if cli.debug {
        tracing::info!("Debug mode enabled");
    }

    match cli.command {
        Commands::Predict { fields } => cmd_predict(&config, fields).await,
        Commands::Voice {
            fields,
            transcript,
            audio,
        } => cmd_voice(&config, fields, transcript, audio).await,
        Commands::Init { force } => cmd_init(force),
        Commands::Config { show_secrets } => cmd_config(&config, show_secrets),
    }
}

/// Load configuration from file or defaults
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config = match config_path {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    config.validate()?;

    Ok(config)
}

fn build_engine(config: &Config) -> Result<Arc<dyn SpeechEngine>> {
    match config.speech.engine.as_str() {
        "openai" => Ok(Arc::new(OpenAiTtsEngine::from_config(&config.speech)?)),
        _ => Ok(Arc::new(ConsoleEngine)),
    }
}

fn build_predictor(
    config: &Config,
    page: &Document,
    speech: Arc<dyn SpeechQueue>,
) -> Result<Predictor> {
    let client = PredictionClient::new(&config.predictor)?;
    tracing::debug!("Prediction endpoint: {}", client.url());

    Ok(Predictor::new(client, Arc::new(page.clone()), Arc::new(page.clone()), speech)
        .with_markup_mode(MarkupMode::from_escape_flag(config.predictor.escape_markup)))
}

fn print_output(page: &Document) {
    println!("{}", page.get(OUTPUT_ID).unwrap_or_default());
}

async fn cmd_predict(config: &Config, fields: FieldArgs) -> Result<()> {
    let page = Document::civic_form(&fields.into());
    let (queue, worker) = SynthesisQueue::spawn(build_engine(config)?);

    let outcome = {
        let predictor = build_predictor(config, &page, Arc::new(queue))?;
        predictor.predict().await
    };

    // Every queue handle is gone once the predictor is dropped.
    settle(outcome, worker.drain().await, "Prediction failed")?;
    print_output(&page);
    Ok(())
}

async fn cmd_voice(
    config: &Config,
    fields: FieldArgs,
    transcript: Option<String>,
    audio: Option<PathBuf>,
) -> Result<()> {
    let recognizer: Arc<dyn SpeechRecognizer> = match (transcript, audio) {
        (Some(text), _) => Arc::new(TypedRecognizer::fixed(text)),
        (None, Some(path)) => {
            let api_key = config
                .voice
                .groq_api_key
                .as_deref()
                .context("Audio transcription requires GROQ_API_KEY")?;
            Arc::new(WhisperRecognizer::new(api_key, path))
        }
        (None, None) => Arc::new(TypedRecognizer::stdin()),
    };

    let page = Document::civic_form(&fields.into());
    let (queue, worker) = SynthesisQueue::spawn(build_engine(config)?);

    let outcome = {
        let speech: Arc<dyn SpeechQueue> = Arc::new(queue);
        let predictor = build_predictor(config, &page, speech.clone())?;
        let controller =
            VoiceController::with_config(recognizer, Arc::new(predictor), speech, &config.voice);
        controller.start_voice().await
    };

    match settle(outcome, worker.drain().await, "Voice command failed")? {
        VoiceOutcome::Analyzed(_) => print_output(&page),
        VoiceOutcome::Prompted { transcript } => {
            tracing::info!("No trigger phrase in {:?}", transcript);
        }
    }
    Ok(())
}

/// The command's own error wins over a speech queue failure, which is then
/// only logged.
fn settle<T>(
    outcome: crate::Result<T>,
    drained: crate::Result<usize>,
    failure: &'static str,
) -> Result<T> {
    match (outcome, drained) {
        (Ok(value), Ok(_)) => Ok(value),
        (Ok(_), Err(e)) => Err(e).context("Speech queue failed"),
        (Err(e), drained) => {
            if let Err(queue_err) = drained {
                tracing::warn!("Speech queue failed: {}", queue_err);
            }
            Err(e).context(failure)
        }
    }
}

/// Initialize configuration file
fn cmd_init(force: bool) -> Result<()> {
    println!("🏙️ CivicTwin Configuration Initialization\n");

    let config_path =
        Config::system_config_path().context("Could not determine config directory")?;

    if config_path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at: {}\nUse --force to overwrite",
            config_path.display()
        );
    }

    Config::default().save(&config_path)?;

    println!("✅ Configuration initialized at: {}", config_path.display());
    println!("\n📝 Next steps:");
    println!("   1. Set predictor.base_url to your prediction service");
    println!("   2. Optionally set GROQ_API_KEY / OPENAI_API_KEY for voice");
    println!("   3. Run 'civictwin predict --traffic 70 ...' or 'civictwin voice'");

    Ok(())
}

/// Show configuration
fn cmd_config(config: &Config, show_secrets: bool) -> Result<()> {
    println!("🏙️ CivicTwin Configuration\n");

    if show_secrets {
        println!("{:#?}", config);
        return Ok(());
    }

    println!(
        "Prediction endpoint: {}",
        PredictionClient::new(&config.predictor)?.url()
    );
    println!("Escape markup: {}", config.predictor.escape_markup);
    println!("Log level: {}", config.logging.level);
    println!("\nVoice:");
    println!("  Locale: {}", config.voice.locale);
    println!("  Trigger: {:?}", config.voice.trigger);
    println!("  Groq API Key: {}", key_status(config.voice.groq_api_key.as_deref()));
    println!("\nSpeech:");
    println!("  Engine: {}", config.speech.engine);
    println!("  Voice: {} ({})", config.speech.tts_voice, config.speech.tts_model);
    println!(
        "  OpenAI API Key: {}",
        key_status(config.speech.openai_api_key.as_deref())
    );
    println!("\n💡 Use --show-secrets to display API keys");

    Ok(())
}

fn key_status(key: Option<&str>) -> &'static str {
    if key.is_some() { "[SET]" } else { "[NOT SET]" }
}
