use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::{debug, info};

use super::output::{format_history_page, format_images_human, format_images_json, format_stats};
use crate::api::{ApiClient, ImageApi, SourceFilter};
use crate::history::{FileStore, HistoryStore, KeyValueStore, MemoryStore, SharedHistory};
use crate::search::{
    SearchConfig, SearchController, SearchStatus, SortDirection, average_confidence,
    sort_by_confidence,
};
use crate::tui::run_interactive;
use crate::utils::environment::resolve_api_base_url;
use crate::utils::{API_URL_ENV, DATA_DIR_ENV, format_path_with_tilde, get_data_dir, logging};

#[derive(Parser)]
#[command(name = "space-explorer")]
#[command(version)]
#[command(about = "Browse and search a gallery of space images", long_about = None)]
pub struct Cli {
    /// Backend base URL
    #[arg(long, env = API_URL_ENV, global = true)]
    pub api_url: Option<String>,

    /// Directory holding the search history and the TUI log
    #[arg(long, env = DATA_DIR_ENV, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Keep history in memory only for this run
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the initial gallery from /sources
    Sources(SourcesArgs),
    /// Search images and record the query in history
    Search {
        /// Search text (at least 4 characters)
        query: String,
        /// Order by confidence: asc or desc
        #[arg(long)]
        sort: Option<SortDirection>,
        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect or edit the search history
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },
    /// Show statistics about the search history
    Stats,
    /// Check that the backend is reachable
    Ping,
    /// Open the interactive gallery
    Browse,
}

#[derive(Args)]
pub struct SourcesArgs {
    /// Earliest creation date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Latest creation date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// Comma-separated keywords
    #[arg(long, value_delimiter = ',')]
    pub keywords: Vec<String>,
    /// Order by confidence: asc or desc
    #[arg(long)]
    pub sort: Option<SortDirection>,
    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// Show one page of past searches
    List {
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Remove one entry by id
    Remove { id: String },
    /// Remove all entries
    Clear,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let Some(command) = &cli.command else {
        println!("Use --help for usage information");
        return Ok(());
    };

    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => get_data_dir()?,
    };

    // The TUI owns the terminal, so its logs go to a file
    if matches!(command, Commands::Browse) {
        logging::init_file(cli.verbose, &data_dir)?;
    } else {
        logging::init_stderr(cli.verbose);
    }
    debug!(data_dir = %data_dir.display(), "Resolved data directory");

    match command {
        Commands::Sources(args) => show_sources(&api_client(&cli)?, args).await,
        Commands::Search { query, sort, json } => {
            let history = open_history(&cli, &data_dir);
            run_search(api_client(&cli)?, history, query, *sort, *json).await
        }
        Commands::History { action } => {
            let history = open_history(&cli, &data_dir);
            edit_history(&history, action)
        }
        Commands::Stats => {
            let history = open_history(&cli, &data_dir);
            show_stats(&history, &cli, &data_dir)
        }
        Commands::Ping => ping(&api_client(&cli)?).await,
        Commands::Browse => {
            let history = open_history(&cli, &data_dir);
            run_interactive(api_client(&cli)?, history)
        }
    }
}

fn api_client(cli: &Cli) -> Result<ApiClient> {
    let base_url = resolve_api_base_url(cli.api_url.clone());
    ApiClient::new(&base_url).with_context(|| format!("Invalid API URL: {}", base_url))
}

fn open_history(cli: &Cli, data_dir: &std::path::Path) -> SharedHistory {
    let storage: Box<dyn KeyValueStore> = if cli.ephemeral {
        Box::new(MemoryStore::new())
    } else {
        Box::new(FileStore::new(data_dir))
    };
    HistoryStore::load(storage).into_shared()
}

fn lock(history: &SharedHistory) -> std::sync::MutexGuard<'_, HistoryStore> {
    history.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

async fn show_sources(api: &ApiClient, args: &SourcesArgs) -> Result<()> {
    let filter = SourceFilter {
        from_date: args.from,
        to_date: args.to,
        keywords: args.keywords.iter().map(|k| k.trim().to_string()).filter(|k| !k.is_empty()).collect(),
    };

    let items = if filter.is_empty() {
        api.list_sources().await
    } else {
        api.list_sources_filtered(&filter).await
    }
    .map_err(|e| anyhow::anyhow!(e.user_message()))
    .context("Failed to load sources")?;
    info!(count = items.len(), "Loaded sources");

    let items = match args.sort {
        Some(direction) => sort_by_confidence(&items, direction),
        None => items,
    };
    let average = average_confidence(&items);

    if args.json {
        println!("{}", format_images_json(None, &items, average));
    } else {
        println!("{}", format_images_human("Sources", &items, average));
    }
    Ok(())
}

async fn run_search(
    api: ApiClient,
    history: SharedHistory,
    query: &str,
    sort: Option<SortDirection>,
    json: bool,
) -> Result<()> {
    let config = SearchConfig::default();
    if query.trim().chars().count() < config.min_query_len {
        bail!("Query must be at least {} characters", config.min_query_len);
    }

    let mut controller = SearchController::new(api, Some(history), config);
    let mut session_rx = controller.subscribe();
    controller.submit(query);

    let session = session_rx
        .wait_for(|s| matches!(s.status, SearchStatus::Succeeded | SearchStatus::Failed))
        .await
        .context("Search was interrupted")?
        .clone();

    if session.status == SearchStatus::Failed {
        bail!(session.error.unwrap_or_else(|| "Search failed".to_string()));
    }

    let items = sort_by_confidence(&session.results, sort.unwrap_or_default());
    let average = average_confidence(&items);
    let query = query.trim();

    if json {
        println!("{}", format_images_json(Some(query), &items, average));
    } else {
        println!("{}", format_images_human(&format!("Results for \"{}\"", query), &items, average));
    }
    Ok(())
}

fn edit_history(history: &SharedHistory, action: &HistoryCommand) -> Result<()> {
    let mut history = lock(history);
    match action {
        HistoryCommand::List { page } => {
            let total_pages = history.total_pages();
            if *page == 0 || (*page > total_pages && total_pages > 0) {
                bail!("Page {} is out of range (1-{})", page, total_pages.max(1));
            }
            println!("{}", format_history_page(history.page(*page), *page, total_pages));
        }
        HistoryCommand::Remove { id } => {
            let existed = history.entries().iter().any(|e| e.id == *id);
            history.remove(id);
            if existed {
                println!("Removed history entry {}", id);
            } else {
                println!("No history entry with id {}", id);
            }
        }
        HistoryCommand::Clear => {
            let count = history.len();
            history.clear();
            println!("Cleared {} history entries", count);
        }
    }
    Ok(())
}

fn show_stats(history: &SharedHistory, cli: &Cli, data_dir: &std::path::Path) -> Result<()> {
    let stats = lock(history).stats();
    let location = if cli.ephemeral {
        "memory (--ephemeral)".to_string()
    } else {
        format_path_with_tilde(&FileStore::new(data_dir).path_for(crate::history::SEARCH_HISTORY_KEY))
    };
    println!("{}", format_stats(&stats, &location));
    Ok(())
}

async fn ping(api: &ApiClient) -> Result<()> {
    let health = api
        .ping()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))
        .with_context(|| format!("Backend at {} is unreachable", api.base_url()))?;

    let status = if health.status.is_empty() { "ok" } else { health.status.as_str() };
    println!("Backend at {}: {}", api.base_url(), status);
    Ok(())
}
