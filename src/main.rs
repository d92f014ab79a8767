use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidsum::acquire::{Session, SpeechTranscriber, TranscriptAcquisition};
use vidsum::cli::{Cli, Commands, OutputFormat};
use vidsum::config::Config;
use vidsum::providers::inference::{HttpSummaryModel, HttpSynthesizer, HttpTranslator};
use vidsum::providers::whisper::WhisperCli;
use vidsum::providers::youtube::YtDlpClient;
use vidsum::providers::{SpeechSynthesizer, VideoResolver};
use vidsum::summarize::{self, ModelChoice, SummarizationPipeline};
use vidsum::{output, text, utils, ErrorSignal};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "vidsum=debug" } else { "vidsum=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().await?;

    // Check for required external dependencies (non-fatal)
    if !cli.quiet {
        let missing_deps = check_dependencies(&config).await;
        if !missing_deps.is_empty() {
            eprintln!("Dependency check warnings:");
            for dep in missing_deps {
                eprintln!("   - {}", dep);
            }
            eprintln!("   (Continuing anyway - tools may be available)");
        }
    }

    match cli.command {
        Commands::Summarize {
            url,
            model,
            output,
            format,
            translate,
            speak,
        } => {
            run_summarize(&config, &url, model, output, format, translate, speak).await?;
        }
        Commands::TranscribeAudio { file, output } => {
            run_transcribe_audio(&config, &file, output).await?;
        }
        Commands::Info { url } => {
            let resolver = YtDlpClient::with_path(&config.tools.yt_dlp_path);
            match resolver.metadata(&url).await {
                Ok(meta) => {
                    println!("Title: {}", meta.title.as_deref().unwrap_or("(unknown)"));
                    if let Some(duration) = meta.duration {
                        println!("Duration: {}", utils::format_duration(duration));
                    }
                    if let Some(description) = meta.description {
                        println!("Description:\n{}", description);
                    }
                }
                Err(e) => {
                    tracing::warn!("Metadata fetch failed: {}", e);
                    fail(ErrorSignal::DataFetchFailed);
                }
            }
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                println!("Edit the config file manually:");
                println!("  {}", Config::config_path()?.display());
            }
        }
        Commands::Models => {
            println!("Available summarization models:");
            println!("  1: fast - shorter-focus model (t5-base style)");
            println!("  2: news - longer-context news-style model (distilbart-cnn style)");
            println!("  any other value runs both and prints both summaries");
        }
    }

    Ok(())
}

async fn run_summarize(
    config: &Config,
    url: &str,
    model: u8,
    output_path: Option<PathBuf>,
    format: OutputFormat,
    translate: Option<String>,
    speak: bool,
) -> Result<()> {
    let resolver = Arc::new(YtDlpClient::with_path(&config.tools.yt_dlp_path));
    let captions = Box::new(YtDlpClient::with_path(&config.tools.yt_dlp_path));
    let engine = Box::new(WhisperCli::new(
        &config.tools.whisper_path,
        &config.tools.whisper_model,
    ));

    let acquisition = TranscriptAcquisition::new(captions, resolver, engine);
    let session = Session::new()?;

    tracing::info!("Acquiring transcript for: {}", url);
    let transcript = match acquisition.acquire(url, &session).await {
        Ok(transcript) => transcript,
        Err(signal) => fail(signal),
    };

    tracing::info!(
        chars = transcript.raw_text.len(),
        grade = ?transcript.source_grade,
        "Transcript acquired"
    );

    if config.app.keep_audio {
        preserve_scratch_audio(&session)?;
    }

    let token = config.inference.api_token.as_deref();
    let pipeline = SummarizationPipeline::new(
        Box::new(HttpSummaryModel::new(
            &config.inference.fast_model_endpoint,
            token,
            "fast",
        )),
        Box::new(HttpSummaryModel::new(
            &config.inference.news_model_endpoint,
            token,
            "news",
        )),
    );

    let result = match pipeline
        .summarize(
            &transcript.raw_text,
            transcript.source_grade,
            ModelChoice::from(model),
        )
        .await
    {
        Ok(result) => result,
        Err(signal) => fail(signal),
    };

    let result = match &translate {
        Some(lang) => {
            let translator =
                HttpTranslator::new(&config.inference.translation_endpoint, token);
            match summarize::translate_summary(&translator, &result, lang).await {
                Ok(result) => result,
                Err(signal) => fail(signal),
            }
        }
        None => result,
    };

    let content = output::format_summary(&result, &transcript, &format)?;
    match output_path {
        Some(path) => {
            output::save_to_file(&content, &path)?;
            println!("Summary saved to: {}", path.display());
        }
        None => println!("{}", content),
    }

    if speak {
        let synthesizer = HttpSynthesizer::new(&config.inference.tts_endpoint, token);
        let dest = PathBuf::from("summary.mp3");
        let parts = result.parts();
        let spoken = parts[0].1;
        let language = spoken_language(translate.as_deref());
        match synthesizer.synthesize(spoken, language, &dest).await {
            Ok(()) => println!("Audible summary saved to: {}", dest.display()),
            Err(e) => {
                tracing::warn!("Speech synthesis failed: {}", e);
                fail(ErrorSignal::SpeechSynthesisFailed);
            }
        }
    }

    Ok(())
}

async fn run_transcribe_audio(
    config: &Config,
    file: &PathBuf,
    output_path: Option<PathBuf>,
) -> Result<()> {
    let resolver = Arc::new(YtDlpClient::with_path(&config.tools.yt_dlp_path));
    let engine = Box::new(WhisperCli::new(
        &config.tools.whisper_path,
        &config.tools.whisper_model,
    ));
    let transcriber = SpeechTranscriber::new(resolver, engine);

    match transcriber.transcribe_file(file).await {
        Ok(speech) => {
            let cleaned = text::clean(&speech.text);
            match output_path {
                Some(path) => {
                    output::save_to_file(&cleaned, &path)?;
                    println!("Transcript saved to: {}", path.display());
                }
                None => println!("{}", cleaned),
            }
        }
        Err(e) => {
            tracing::warn!("Local audio transcription failed: {}", e);
            fail(ErrorSignal::AudioTranscriptionFailed);
        }
    }

    Ok(())
}

/// Language the audible summary is rendered in: the translation target when
/// one was requested, English otherwise
fn spoken_language(translate: Option<&str>) -> &str {
    translate.unwrap_or("en")
}

/// Probe the configured external tools, collecting warnings for missing ones
async fn check_dependencies(config: &Config) -> Vec<String> {
    let mut missing = Vec::new();

    let yt_dlp = YtDlpClient::with_path(&config.tools.yt_dlp_path);
    if !yt_dlp.check_availability().await {
        missing.push(format!(
            "{} - required for caption lookup and audio download",
            config.tools.yt_dlp_path
        ));
    }

    let whisper = WhisperCli::new(&config.tools.whisper_path, &config.tools.whisper_model);
    if !whisper.check_availability().await {
        missing.push(format!(
            "{} - required for speech-to-text fallback",
            config.tools.whisper_path
        ));
    }

    if !utils::check_command_available("ffmpeg").await {
        missing.push("ffmpeg - recommended for audio extraction".to_string());
    }

    missing
}

/// Copy the session scratch audio into the working directory
fn preserve_scratch_audio(session: &Session) -> Result<()> {
    let scratch = session.scratch_audio_path();
    if scratch.exists() {
        let filename = format!("audio_{}.mp3", chrono::Utc::now().format("%Y%m%d_%H%M%S"));
        let dest = std::env::current_dir()?.join(filename);
        fs_err::copy(scratch, &dest)?;
        println!("Audio saved to: {}", dest.display());
    }
    Ok(())
}

/// Print the terminal signal as user-facing output and exit
fn fail(signal: ErrorSignal) -> ! {
    println!("{}", signal);
    std::process::exit(1);
}
