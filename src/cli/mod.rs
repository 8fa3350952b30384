use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{ConfigLoader, CONFIG_ENV, DATA_ENV};
use crate::content::LetterLoader;

pub mod commands;

use self::commands::{FacetsArgs, ListArgs, ShowArgs, UnlockArgs};

#[derive(Parser, Debug)]
#[command(
    name = "letterdesk",
    version,
    about = "A passphrase-gated desk of love letters for the terminal"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the config file location (takes precedence over LETTERDESK_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the data directory (takes precedence over LETTERDESK_DATA)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Read letters from this directory instead of the configured one
    #[arg(long, global = true)]
    pub letters: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the interactive letter desk (default)
    Tui,
    /// Print letters, newest first, optionally filtered
    List(ListArgs),
    /// Print one letter
    Show(ShowArgs),
    /// Print the themes and occasions in use
    Facets(FacetsArgs),
    /// Check a passphrase without opening the desk
    Unlock(UnlockArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        env::set_var(CONFIG_ENV, path);
    }
    if let Some(path) = &cli.data_dir {
        env::set_var(DATA_ENV, path);
    }

    init_tracing(&cli.log_level)
        .with_context(|| format!("initialising logging at level {}", cli.log_level))?;
    let loader = ConfigLoader::discover()?;
    let mut config = loader.load_or_init()?;
    if let Some(dir) = cli.letters {
        config.content.letters_dir = dir;
    }
    tracing::debug!(
        config = %loader.paths().config_file.display(),
        letters = %config.content.letters_dir.display(),
        "configuration loaded"
    );

    let letters = LetterLoader::new(config.content.letters_dir.clone(), config.content.format);
    let config = Arc::new(config);
    let command = cli.command.unwrap_or(Commands::Tui);
    match command {
        Commands::Tui => commands::run_tui(config, &letters),
        Commands::List(args) => {
            print!("{}", commands::run_list(&letters.load_or_default(), &args)?);
            Ok(())
        }
        Commands::Show(args) => {
            print!("{}", commands::run_show(&letters.load_or_default(), &args)?);
            Ok(())
        }
        Commands::Facets(args) => {
            print!("{}", commands::run_facets(&letters.load_or_default(), &args)?);
            Ok(())
        }
        Commands::Unlock(args) => commands::unlock(&config, &args),
    }
}

fn init_tracing(level: &str) -> Result<()> {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_try_init(|| {
        let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|err| anyhow::anyhow!("{err}"))
    })
    .map(|_| ())
}
