//! Linkshelf CLI
//!
//! Command-line interface for Linkshelf - a personal bookmark shelf.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use linkshelf_core::{Config, FileStorage, LinkRepository};

mod commands;
mod output;
mod prompt;
mod tui;

use commands::theme::ThemeChoice;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "Linkshelf - Save, search and revisit your links")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// Save a new link
    #[command(alias = "save")]
    Add {
        /// Display title
        title: String,
        /// Address, scheme optional (example.com)
        url: String,
        /// Optional description
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Show the most recently saved links
    Recent {
        /// How many links to show (default: recent_count from config)
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// List all links
    #[command(alias = "ls")]
    List,
    /// Search links by title
    Search {
        /// Text to look for in titles (case-insensitive)
        term: Option<String>,
    },
    /// Delete a link
    #[command(alias = "rm")]
    Delete {
        /// Link ID
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Open a link in the default browser
    Open {
        /// Link ID
        id: i64,
    },
    /// Show or change the color theme
    Theme {
        #[arg(value_enum)]
        choice: Option<ThemeChoice>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, recent_count, quota_bytes, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // The terminal page logs to a file instead of stderr
    let is_tui = matches!(&cli.command, Some(Commands::Tui) | None);
    if !is_tui {
        init_cli_logging();
    }

    // Commands that don't need the store
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;

    // Handle TUI (default when no command given)
    let Some(command) = cli.command.filter(|_| !is_tui) else {
        return tui::run(&config);
    };

    let mut storage = config.open_storage();

    match command {
        Commands::Theme { choice } => commands::theme::run(&mut storage, choice, &output),
        command => {
            let mut repo = LinkRepository::open(storage);
            handle_link_command(command, &mut repo, &config, &output)
        }
    }
}

fn handle_link_command(
    command: Commands,
    repo: &mut LinkRepository<FileStorage>,
    config: &Config,
    output: &Output,
) -> Result<()> {
    match command {
        Commands::Add {
            title,
            url,
            description,
        } => commands::link::add(repo, &title, &url, &description, output),
        Commands::Recent { count } => {
            commands::link::recent(repo, count.unwrap_or(config.recent_count), output)
        }
        Commands::List => commands::link::list(repo, output),
        Commands::Search { term } => commands::link::search(repo, term.as_deref(), output),
        Commands::Delete { id, yes } => commands::link::delete(repo, id, yes, output),
        Commands::Open { id } => commands::link::open(repo, id, output),
        Commands::Tui => unreachable!(),            // Handled above
        Commands::Theme { .. } => unreachable!(),   // Handled above
        Commands::Config { .. } => unreachable!(),  // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize stderr logging for one-shot commands
///
/// The level comes from SHELF_LOG (default: warn).
fn init_cli_logging() {
    let log_level = std::env::var("SHELF_LOG").unwrap_or_else(|_| "warn".to_string());
    let env_filter = EnvFilter::new(format!(
        "linkshelf_core={},shelf={}",
        log_level, log_level
    ));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
