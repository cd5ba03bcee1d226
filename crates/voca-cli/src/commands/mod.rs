use clap::{Parser, Subcommand};
use std::path::PathBuf;

use voca_config::{ConfigLoader, VocaConfig};
use voca_core::VocaError;

mod forge;
mod serve;
mod skill;

/// Voca: turn vocabulary words into RPG skills and practise translating them
#[derive(Parser)]
#[command(name = "voca", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to voca.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Listen address, overriding [server] listen
        #[arg(short = 'L', long)]
        listen: Option<String>,
    },
    /// Generate the skill for a word, or return the stored one
    Generate {
        /// English vocabulary word
        word: String,
        /// Korean meaning of the word
        meaning: String,
        /// Write the decoded image to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a Korean sentence to translate using a word
    Question {
        word: String,
        /// beginner, intermediate or advanced
        #[arg(long)]
        level: Option<String>,
    },
    /// Score a translation
    Evaluate {
        /// The Korean source sentence
        #[arg(long)]
        sentence: String,
        /// The learner's English translation
        #[arg(long)]
        answer: String,
        /// The reference translation
        #[arg(long)]
        ideal: String,
        /// The word being practised
        #[arg(long)]
        word: String,
        #[arg(long)]
        level: Option<String>,
    },
    /// Inspect the local skill store
    Skill {
        #[command(subcommand)]
        action: SkillAction,
    },
    /// Show current configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SkillAction {
    /// Show the stored skill for a word
    Show {
        word: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the most recently created skills
    List {
        /// Number of skills to show (default 20)
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
}

impl Cli {
    pub async fn run(self) -> voca_core::Result<()> {
        // Load config first so we can use it for log format
        let config_loader = ConfigLoader::load(self.config.as_deref())?;
        let config = config_loader.get();

        // Resolve log level: --verbose > --quiet > --log-level > config
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            self.log_level.as_deref().unwrap_or(&config.logging.level)
        };
        init_tracing(log_level, &config.logging.format);

        match self.command {
            Commands::Serve { listen } => serve::cmd_serve(config, listen).await,
            Commands::Generate {
                word,
                meaning,
                out,
                json,
            } => forge::cmd_generate(config, &word, &meaning, out, json).await,
            Commands::Question { word, level } => forge::cmd_question(config, word, level).await,
            Commands::Evaluate {
                sentence,
                answer,
                ideal,
                word,
                level,
            } => {
                let req = voca_forge::EvaluateRequest {
                    korean_sentence: sentence,
                    user_answer: answer,
                    ideal_translation: ideal,
                    target_word: word,
                    user_level: level,
                };
                forge::cmd_evaluate(config, req).await
            }
            Commands::Skill { action } => match action {
                SkillAction::Show { word, json } => skill::cmd_show(&config, &word, json),
                SkillAction::List { limit } => skill::cmd_list(&config, limit),
            },
            Commands::Config { json } => Self::cmd_config(config, json),
        }
    }

    fn cmd_config(config: VocaConfig, json: bool) -> voca_core::Result<()> {
        let config = redact(config);
        if json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(&config).map_err(|e| VocaError::Config(e.to_string()))?
            );
        }
        Ok(())
    }
}

fn init_tracing(level: &str, format: &str) {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level))
    };
    match format {
        "json" => tracing_subscriber::fmt()
            .with_env_filter(filter())
            .json()
            .with_target(true)
            .init(),
        "compact" => tracing_subscriber::fmt()
            .with_env_filter(filter())
            .compact()
            .with_target(false)
            .init(),
        _ => tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_target(false)
            .init(),
    }
}

/// Mask the API key before printing.
fn redact(mut config: VocaConfig) -> VocaConfig {
    if let Some(key) = config.openai.api_key.as_mut() {
        let visible: String = key.chars().take(3).collect();
        *key = format!("{visible}****");
    }
    config
}
