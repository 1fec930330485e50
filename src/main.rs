// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_arguments)]

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use crate::app_config::{Config, SpeechProviderKind, TimingStrategy};
use crate::file_utils::FileManager;
use crate::pipeline::{Pipeline, RenderRequest};

mod app_config;
mod errors;
mod file_utils;
mod media;
mod pipeline;
mod providers;
mod segmenter;
mod sync;

/// CLI Wrapper for SpeechProviderKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSpeechProvider {
    ElevenLabs,
    OpenAI,
}

impl From<CliSpeechProvider> for SpeechProviderKind {
    fn from(cli_provider: CliSpeechProvider) -> Self {
        match cli_provider {
            CliSpeechProvider::ElevenLabs => SpeechProviderKind::ElevenLabs,
            CliSpeechProvider::OpenAI => SpeechProviderKind::OpenAI,
        }
    }
}

/// CLI Wrapper for TimingStrategy to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTimingStrategy {
    Uniform,
    Alignment,
    PerClip,
}

impl From<CliTimingStrategy> for TimingStrategy {
    fn from(cli_strategy: CliTimingStrategy) -> Self {
        match cli_strategy {
            CliTimingStrategy::Uniform => TimingStrategy::Uniform,
            CliTimingStrategy::Alignment => TimingStrategy::Alignment,
            CliTimingStrategy::PerClip => TimingStrategy::PerClip,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a narrated, captioned story video (default command)
    Render(RenderArgs),

    /// Generate shell completions for storysync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Transcript text file to narrate
    #[arg(value_name = "TRANSCRIPT")]
    transcript: PathBuf,

    /// Background video file
    #[arg(value_name = "VIDEO")]
    video: PathBuf,

    /// Output video path
    #[arg(short, long, default_value = "final_story.mp4")]
    output: PathBuf,

    /// Speech provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliSpeechProvider>,

    /// Voice identifier for the provider
    #[arg(long)]
    voice: Option<String>,

    /// Caption timing strategy
    #[arg(short, long, value_enum)]
    strategy: Option<CliTimingStrategy>,

    /// Force 9:16 vertical output
    #[arg(long)]
    vertical: bool,

    /// Force overwrite of an existing output file
    #[arg(short, long)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// StorySync - Narrated Story Video Generator
///
/// Turns a text transcript and a background video into a narrated video
/// with burned-in captions, using hosted speech synthesis providers.
#[derive(Parser, Debug)]
#[command(name = "storysync")]
#[command(version = "1.0.0")]
#[command(about = "Narrated story video generator")]
#[command(long_about = "StorySync narrates a text transcript with a TTS provider and renders it
over a background video with synchronized captions.

EXAMPLES:
    storysync story.txt background.mp4                  # Render using default config
    storysync -f story.txt background.mp4               # Force overwrite the output
    storysync -p open-ai --voice alloy story.txt bg.mp4 # Use a specific provider and voice
    storysync -s uniform story.txt background.mp4       # Spread captions evenly
    storysync --vertical story.txt background.mp4       # 9:16 output for shorts
    storysync completions bash > storysync.bash         # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.

SUPPORTED PROVIDERS:
    elevenlabs - ElevenLabs API (requires API key; supports alignment timing)
    openai     - OpenAI speech API (requires API key; no alignment timing)

TIMING STRATEGIES:
    per-clip   - one synthesis call per caption, captions follow clip lengths
    uniform    - one synthesis call, narration time divided evenly
    alignment  - one synthesis call, captions follow character timestamps")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Transcript text file to narrate
    #[arg(value_name = "TRANSCRIPT")]
    transcript: Option<PathBuf>,

    /// Background video file
    #[arg(value_name = "VIDEO")]
    video: Option<PathBuf>,

    /// Output video path
    #[arg(short, long, default_value = "final_story.mp4")]
    output: PathBuf,

    /// Speech provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliSpeechProvider>,

    /// Voice identifier for the provider
    #[arg(long)]
    voice: Option<String>,

    /// Caption timing strategy
    #[arg(short, long, value_enum)]
    strategy: Option<CliTimingStrategy>,

    /// Force 9:16 vertical output
    #[arg(long)]
    vertical: bool,

    /// Force overwrite of an existing output file
    #[arg(short, long)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger; verbosity follows log::max_level so the
    // configured level can still be applied after startup
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let emoji = Self::get_emoji_for_level(record.level());

            let mut stderr = std::io::stderr();
            let color = match record.level() {
                Level::Error => "\x1B[1;31m",
                Level::Warn => "\x1B[1;33m",
                Level::Info => "\x1B[1;32m",
                Level::Debug => "\x1B[1;36m",
                Level::Trace => "\x1B[1;35m",
            };
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let options = CommandLineOptions::parse();

    match options.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "storysync", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Render(args)) => run_render(args).await,
        None => {
            // No subcommand: treat the top-level arguments as a render call
            let (Some(transcript), Some(video)) = (options.transcript, options.video) else {
                return Err(anyhow!(
                    "Missing TRANSCRIPT and VIDEO arguments; run with --help for usage"
                ));
            };

            run_render(RenderArgs {
                transcript,
                video,
                output: options.output,
                provider: options.provider,
                voice: options.voice,
                strategy: options.strategy,
                vertical: options.vertical,
                force_overwrite: options.force_overwrite,
                config_path: options.config_path,
                log_level: options.log_level,
            })
            .await
        }
    }
}

async fn run_render(args: RenderArgs) -> Result<()> {
    // Load the configuration, creating a default file on first run
    let mut config = if FileManager::file_exists(&args.config_path) {
        Config::from_file(&args.config_path)?
    } else {
        let config = Config::default();
        config.save_to_file(&args.config_path)?;
        info!("Created default configuration at {}", args.config_path);
        config
    };

    // Apply command line overrides
    if let Some(provider) = args.provider {
        config.speech.provider = provider.into();
    }
    if let Some(strategy) = args.strategy {
        config.timing_strategy = strategy.into();
    }
    if let Some(level) = args.log_level {
        config.log_level = level.into();
    }
    if args.vertical {
        config.render.vertical_format = true;
    }

    log::set_max_level(config.log_level.to_level_filter());

    config.validate()?;

    if FileManager::file_exists(&args.output) && !args.force_overwrite {
        warn!("Skipping render, output already exists (use -f to force overwrite)");
        return Ok(());
    }

    let pipeline = Pipeline::with_config(config)?;
    let outcome = pipeline
        .run(RenderRequest {
            video_path: args.video,
            transcript_path: args.transcript,
            voice: args.voice,
            output_path: args.output,
        })
        .await?;

    info!(
        "Done: {:?} ({} captions scheduled, {} dropped)",
        outcome.output_path,
        outcome.units_total - outcome.units_dropped,
        outcome.units_dropped
    );
    Ok(())
}
