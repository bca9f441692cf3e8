// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, Context};
use log::{warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use clap::{Args, Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use subcheck::app_config::{self, Config, TranslationProvider};
use subcheck::app_controller::{Controller, VerifyOptions};

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    OpenAI,
    Anthropic,
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
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

/// Options shared by every command that talks to a provider
#[derive(Args, Debug, Clone)]
struct ProviderArgs {
    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use
    #[arg(short, long)]
    model: Option<String>,

    /// Source language ('auto', ISO code or English name)
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language (ISO code, English name, or e.g. 'romanized japanese')
    #[arg(short, long)]
    target_language: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate an SRT file or every SRT file in a directory
    Translate {
        /// Input subtitle file or directory
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Output file (single-file mode only; defaults to <name>.<lang>.srt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Force overwrite of existing output files
        #[arg(short, long)]
        force_overwrite: bool,

        #[command(flatten)]
        provider: ProviderArgs,
    },

    /// Check a translated SRT file against its source
    Verify {
        /// Original subtitle file
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Translated subtitle file
        #[arg(value_name = "TARGET")]
        target: PathBuf,

        /// Write the (reviewed) translation to this file, or '-' for stdout
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Review and correct the result interactively
        #[arg(short, long)]
        interactive: bool,

        /// Force overwrite of an existing export file
        #[arg(short, long)]
        force_overwrite: bool,

        #[command(flatten)]
        provider: ProviderArgs,
    },

    /// Generate shell completions for subcheck
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// subcheck - subtitle translation and verification with language models
#[derive(Parser, Debug)]
#[command(name = "subcheck")]
#[command(version)]
#[command(about = "Translate SRT subtitles and verify existing translations")]
#[command(long_about = "subcheck translates SRT subtitles with a language model and checks \
existing translations line by line against their source.

EXAMPLES:
    subcheck translate movie.srt                     # Translate using default config
    subcheck translate -t fr -f movie.srt            # French, overwrite existing output
    subcheck translate -p openai -m gpt-4o /subs/    # Every SRT file in a directory
    subcheck verify movie.srt movie.fr.srt           # Print a verification report
    subcheck verify -i -e fixed.srt a.srt b.srt      # Review, then export corrections
    subcheck completions bash > subcheck.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for a log level
    fn decoration(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌", "1;31"),
            Level::Warn => ("🚧", "1;33"),
            Level::Info => ("", "1;32"),
            Level::Debug => ("🔍", "1;36"),
            Level::Trace => ("📋", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let now = chrono::Local::now().format("%H:%M:%S.%3f");
        let (emoji, color) = Self::decoration(record.level());
        let _ = writeln!(
            std::io::stderr(),
            "\x1B[{}m{} {} {}\x1B[0m",
            color, now, emoji, record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subcheck", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate { input_path, output, force_overwrite, provider } => {
            let config = load_config(&cli.config_path, &provider, cli.log_level.as_ref())?;
            let controller = Controller::with_config(config)?;
            controller.run(input_path, output, force_overwrite).await
        }
        Commands::Verify { source, target, export, json, interactive, force_overwrite, provider } => {
            let config = load_config(&cli.config_path, &provider, cli.log_level.as_ref())?;
            let controller = Controller::with_config(config)?;
            let options = VerifyOptions {
                export_path: export,
                json,
                interactive,
                force_overwrite,
            };
            controller.run_verify(&source, &target, options).await
        }
    }
}

/// Load the config file (creating a default one if missing), apply CLI overrides and validate
fn load_config(config_path: &str, overrides: &ProviderArgs, log_level: Option<&CliLogLevel>) -> Result<Config> {
    let mut config = if Path::new(config_path).exists() {
        Config::from_file(config_path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        config.save(config_path)
            .with_context(|| format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    if let Some(provider) = &overrides.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &overrides.model {
        config.translation.set_model(model.clone());
    }
    if let Some(source_lang) = &overrides.source_language {
        config.source_language = source_lang.clone();
    }
    if let Some(target_lang) = &overrides.target_language {
        config.target_language = target_lang.clone();
    }
    if let Some(level) = log_level {
        config.log_level = level.clone().into();
    }

    config.validate()
        .context("Configuration validation failed")?;

    // Command line level wins over the config file
    if log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    Ok(config)
}
