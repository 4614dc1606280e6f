//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod model_list;
pub mod say;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::api::HttpTransport;
use crate::cli::model_list::{list_models, set_model};
use crate::cli::say::run_say;
use crate::core::app::App;
use crate::core::chat::ChatOrchestrator;
use crate::core::config::data::BASE_URL_ENV;
use crate::core::config::Config;
use crate::core::model_selection::ModelSelectionStore;
use crate::core::preferences::FilePreferences;
use crate::ui::chat_loop::run_chat;
use crate::ui::theme::Theme;
use crate::utils::logging::{init_tracing, LogTarget};

#[derive(Parser)]
#[command(name = "chatdesk")]
#[command(about = "A terminal chat client for a single chat endpoint")]
#[command(
    long_about = "chatdesk is a full-screen terminal chat client. Questions go to one backend \
endpoint ({base}/api/chat), optionally with a small source file attached, and answers are \
rendered as markdown with numbered, copyable code blocks.\n\n\
Environment Variables:\n\
  CHATDESK_API_URL  Backend base URL (overridden by --base-url)\n\
  RUST_LOG          Log filter for --log output\n\n\
Controls:\n\
  Enter             Send the message\n\
  Alt+Enter         Insert a newline\n\
  Up/Down/PgUp/PgDn Scroll through the conversation\n\
  Esc, Ctrl+C       Quit the application\n\n\
Commands:\n\
  /attach <path>    Attach a file (5KB max)\n\
  /detach           Remove the attached file\n\
  /model [id]       Switch model, or list models\n\
  /copy [n]         Copy code block n (default: the latest)\n\
  /help             Show commands and keys"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backend base URL, e.g. http://localhost:8000
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Model to use for this session only
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Write diagnostics to the specified file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Ask one question and print the answer
    Say {
        /// File to attach to the question
        #[arg(short = 'f', long, value_name = "PATH")]
        file: Option<PathBuf>,
        /// The question
        #[arg(trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// List available models
    Models,
    /// Save the model used by future sessions
    SetModel {
        /// Model id, as listed by `chatdesk models`
        id: String,
    },
    /// Set configuration values, or print them when no value is given
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Option<Vec<String>>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

impl Commands {
    fn is_interactive(&self) -> bool {
        matches!(self, Commands::Chat)
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let command = args.command.unwrap_or(Commands::Chat);
    init_tracing(LogTarget::choose(args.log, command.is_interactive()))?;

    match command {
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            let value = value.map(|parts| parts.join(" "));
            match (key, value) {
                (Some(key), Some(value)) if !value.is_empty() => {
                    match config.set_value(&key, &value) {
                        Ok(message) => {
                            config.save()?;
                            println!("✅ {message}");
                        }
                        Err(err) => {
                            eprintln!("❌ {err}");
                            std::process::exit(1);
                        }
                    }
                }
                _ => config.print_all(),
            }
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            match config.unset_value(&key) {
                Ok(message) => {
                    config.save()?;
                    println!("✅ {message}");
                }
                Err(err) => {
                    eprintln!("❌ {err}");
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Commands::Models => {
            let config = Config::load()?;
            let models = session_models(&config, args.model.as_deref())?;
            list_models(&models);
            Ok(())
        }
        Commands::SetModel { id } => {
            let config = Config::load()?;
            let mut models = session_models(&config, None)?;
            match set_model(&mut models, &id) {
                Ok(message) => println!("✅ {message}"),
                Err(err) => {
                    eprintln!("❌ {err}");
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Commands::Say { file, prompt } => {
            let config = Config::load()?;
            let chat =
                build_orchestrator(&config, args.base_url.as_deref(), args.model.as_deref())?;
            run_say(chat, prompt, file.as_deref()).await
        }
        Commands::Chat => {
            let config = Config::load()?;
            let chat =
                build_orchestrator(&config, args.base_url.as_deref(), args.model.as_deref())?;
            let theme = Theme::from_name(config.theme_name());
            run_chat(App::new(chat, theme, config.syntax_enabled())).await
        }
    }
}

/// The model store for this run: the persisted selection, or `model_override`
/// for this session only.
fn session_models(
    config: &Config,
    model_override: Option<&str>,
) -> Result<ModelSelectionStore, Box<dyn Error>> {
    let preferences = FilePreferences::open(Config::get_preferences_path());
    let mut models =
        ModelSelectionStore::new(config.model_catalog(), preferences, &config.default_model());
    if let Some(id) = model_override {
        if !models.override_for_session(id) {
            return Err(
                format!("Unknown model: {id} (run `chatdesk models` to see the list)").into(),
            );
        }
    }
    Ok(models)
}

fn build_orchestrator(
    config: &Config,
    base_url_flag: Option<&str>,
    model_override: Option<&str>,
) -> Result<ChatOrchestrator, Box<dyn Error>> {
    let base_url = config.resolve_base_url(base_url_flag, std::env::var(BASE_URL_ENV).ok());
    let client = reqwest::Client::builder().build()?;
    let transport = HttpTransport::new(client, &base_url);
    let models = session_models(config, model_override)?;
    Ok(ChatOrchestrator::new(Arc::new(transport), models))
}
