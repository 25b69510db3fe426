//! Astra Search terminal front-end

pub mod commands;
pub mod interactive;
pub mod render;
pub mod session;

use anyhow::{anyhow, Context, Result};
use astra_search::{
    AstraConfig, DateRange, FileStore, FilterUpdate, GeminiProvider, KeyValueStore, MemoryStore,
    SearchEngine, SortBy, SourceType,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use commands::PromptCommand;
use session::SearchSession;

#[derive(Parser, Debug)]
#[command(name = "astra")]
#[command(version, about = "Web-grounded search answers in the terminal", long_about = None)]
pub struct Cli {
    /// Configuration file path (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Keep history and settings in memory only
    #[arg(long)]
    pub memory: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search once and print the answer
    Search {
        /// Query text
        #[arg(required = true)]
        query: Vec<String>,

        #[arg(long, default_value = "all")]
        date_range: DateRange,

        #[arg(long, default_value = "relevance")]
        sort_by: SortBy,

        #[arg(long = "source", default_value = "all")]
        source_type: SourceType,
    },

    /// Search for the query named by a `#q=...` fragment
    Open { fragment: String },

    /// Show past searches
    History {
        /// Forget all past searches
        #[arg(long)]
        clear: bool,
    },

    /// Show or change the system prompt
    Prompt {
        #[command(subcommand)]
        action: Option<PromptAction>,
    },

    /// Interactive search prompt (default)
    Interactive,
}

#[derive(Subcommand, Debug)]
pub enum PromptAction {
    Show,
    Set { text: String },
    /// Restore the built-in default
    Reset,
}

impl From<Option<PromptAction>> for PromptCommand {
    fn from(action: Option<PromptAction>) -> Self {
        match action {
            None | Some(PromptAction::Show) => PromptCommand::Show,
            Some(PromptAction::Set { text }) => PromptCommand::Set(text),
            Some(PromptAction::Reset) => PromptCommand::Reset,
        }
    }
}

fn setup_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<AstraConfig> {
    match path {
        Some(path) => AstraConfig::from_file(path)
            .map_err(|e| anyhow!(e))
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(AstraConfig::default()),
    }
}

fn open_store(config: &AstraConfig, in_memory: bool) -> Arc<dyn KeyValueStore> {
    if in_memory {
        Arc::new(MemoryStore::new())
    } else {
        let store = FileStore::new(config.store_path());
        tracing::debug!(path = %store.path().display(), "Using file store");
        Arc::new(store)
    }
}

fn start_session(config: &AstraConfig, store: Arc<dyn KeyValueStore>) -> Result<SearchSession> {
    let provider = GeminiProvider::new(&config.completion)?;
    let engine = Arc::new(SearchEngine::new(Arc::new(provider)));
    let info = engine.provider().info();
    tracing::debug!(provider = %info.name, model = %info.model, "Completion provider ready");
    Ok(SearchSession::new(engine, store))
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.debug);

    let config = load_config(cli.config.as_ref())?;
    let store = open_store(&config, cli.memory);
    let mut out = std::io::stdout();

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Search {
            query,
            date_range,
            sort_by,
            source_type,
        } => {
            let mut session = start_session(&config, store)?;
            let filters = FilterUpdate {
                date_range: Some(date_range),
                sort_by: Some(sort_by),
                source_type: Some(source_type),
            };
            commands::search(&mut session, &query.join(" "), filters, &mut out).await
        }
        Commands::Open { fragment } => {
            let mut session = start_session(&config, store)?;
            commands::open(&mut session, &fragment, &mut out).await
        }
        Commands::History { clear } => commands::history(store, clear, &mut out),
        Commands::Prompt { action } => commands::prompt(store, action.into(), &mut out),
        Commands::Interactive => {
            let mut session = start_session(&config, store)?;
            interactive::run_interactive(&mut session).await
        }
    }
}
