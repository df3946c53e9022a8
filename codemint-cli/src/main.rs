//! CodeMint - install and sync curated rules and skills for AI coding tools
//!
//! Command output goes to stdout; diagnostics go to stderr through tracing.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use codemint_core::catalog::{HttpCatalogClient, ItemType};
use codemint_core::config::{Settings, SettingsOverrides, BASE_URL_ENV, TOKEN_ENV};
use codemint_core::sync::SyncEngine;
use codemint_core::tools::ToolId;

mod catalog_cli;
mod tool_cli;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "codemint",
    about = "Install and sync curated rules and skills for AI coding tools",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Emit logs as JSON (stderr)
    #[clap(long, global = true)]
    json_logs: bool,

    /// Project root
    #[clap(long, default_value = ".", global = true)]
    project: PathBuf,

    /// Catalog service URL
    #[clap(long, env = BASE_URL_ENV, global = true)]
    base_url: Option<String>,

    /// Bearer token for private and org items
    #[clap(long, env = TOKEN_ENV, hide_env_values = true, global = true)]
    token: Option<String>,
}

#[derive(Parser, Debug)]
enum Command {
    /// Install a rule or skill (e.g. @rule/nextjs-api-safety)
    Install {
        /// Catalog reference, @rule/<slug> or @skill/<slug>
        reference: String,

        /// Tool to install for (detected from the project if omitted)
        #[clap(long)]
        tool: Option<ToolId>,
    },

    /// Update installed items to their latest catalog versions
    Sync {
        /// Output the report as JSON
        #[clap(long)]
        json: bool,
    },

    /// List installed items
    List {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Remove an installed item by catalog id, ref or slug
    Remove {
        /// Catalog id, @type/slug, or slug
        key: String,
    },

    /// Search the catalog
    Search {
        /// Search query
        query: Option<String>,

        /// Filter by item type
        #[clap(long = "type")]
        item_type: Option<ItemType>,

        /// Filter by tag (repeatable)
        #[clap(long = "tag")]
        tags: Vec<String>,

        /// Results page
        #[clap(long)]
        page: Option<u32>,

        /// Maximum results
        #[clap(long, default_value = "25")]
        limit: u32,

        /// Output results as JSON
        #[clap(long)]
        json: bool,
    },

    /// Recommend rules and skills for the project's stack
    Suggest {
        /// Choose one of the suggestions to install
        #[clap(long)]
        pick: bool,

        /// Output suggestions as JSON
        #[clap(long)]
        json: bool,
    },

    /// Show which AI coding tool the project uses
    Detect,

    /// Create the directories for a tool
    Init {
        /// Tool to set up
        #[clap(long)]
        tool: ToolId,
    },
}

fn initialize_tracing(log_level: &LogLevel, json: bool) {
    let filter = EnvFilter::new(log_level.to_filter_directive());

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Everything a command needs to talk to the catalog for one project
pub(crate) struct Project {
    pub root: PathBuf,
    pub settings: Settings,
}

impl Project {
    fn load(cli: &Cli) -> Result<Self> {
        let root = cli.project.clone();
        let settings = Settings::resolve(
            &root,
            SettingsOverrides {
                base_url: cli.base_url.clone(),
                token: cli.token.clone(),
            },
        )
        .context("Failed to load configuration")?;
        Ok(Self { root, settings })
    }

    pub fn engine(&self) -> Result<SyncEngine<HttpCatalogClient>> {
        let client = HttpCatalogClient::from_settings(&self.settings)
            .context("Failed to create catalog client")?;
        Ok(SyncEngine::new(client, self.settings.base_url.clone()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(&cli.log_level, cli.json_logs);

    let project = Project::load(&cli)?;
    match cli.command {
        Command::Install { reference, tool } => catalog_cli::execute_install(&project, &reference, tool).await,
        Command::Sync { json } => catalog_cli::execute_sync(&project, json).await,
        Command::List { json } => catalog_cli::execute_list(&project, json),
        Command::Remove { key } => catalog_cli::execute_remove(&project, &key),
        Command::Search {
            query,
            item_type,
            tags,
            page,
            limit,
            json,
        } => catalog_cli::execute_search(&project, query, item_type, tags, page, limit, json).await,
        Command::Suggest { pick, json } => catalog_cli::execute_suggest(&project, pick, json).await,
        Command::Detect => tool_cli::execute_detect(&project),
        Command::Init { tool } => tool_cli::execute_init(&project, tool),
    }
}
