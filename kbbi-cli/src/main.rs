//! Command-line front end for KBBI Daring lookups.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kbbi::cache::CacheStore;
use kbbi::client::Kbbi;
use kbbi::config::KbbiConfig;
use kbbi::errors::KbbiError;
use kbbi::fetch::CookieSession;
use kbbi::model::SearchResult;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CACHE_DIR_NAME: &str = "cache";

#[derive(Parser, Debug)]
#[command(name = "kbbi", version, about = "Cari entri KBBI Daring dari baris perintah")]
struct Cli {
    /// Term to look up
    term: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Indent JSON output
    #[arg(long, requires = "json")]
    indent: bool,

    /// Leave out usage examples
    #[arg(long)]
    no_examples: bool,

    /// Leave out derived words, compounds, proverbs and idioms
    #[arg(long)]
    no_related: bool,

    /// Ignore any saved session cookie
    #[arg(long)]
    anonymous: bool,

    /// Session cookie file (default: ~/.kbbi/kuki.json)
    #[arg(long, value_name = "PATH")]
    cookie_file: Option<PathBuf>,

    /// Always fetch from the network
    #[arg(long, global = true)]
    no_cache: bool,

    /// Cache directory (default: `cache` beside the cookie file)
    #[arg(long, value_name = "PATH", global = true)]
    cache_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the page cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Check that KBBI Daring is reachable
    Check,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum CacheAction {
    /// Delete expired entries
    Sweep,
    /// Delete every entry
    Purge,
    /// Show entry count and size
    Stats,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, json: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .init();
    } else {
        tracing_subscriber::registry().with(filter).with(layer).init();
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli)?;

    match &cli.command {
        Some(Command::Cache { action }) => run_cache(*action, &config),
        Some(Command::Check) => {
            Kbbi::from_config(&config)?
                .check_connection()
                .await
                .context("KBBI Daring tidak dapat dijangkau")?;
            println!("KBBI Daring dapat dijangkau.");
            Ok(ExitCode::SUCCESS)
        }
        None => {
            let Some(term) = cli.term.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
                eprintln!("Error: Tidak ada kata yang diberikan");
                eprintln!("Gunakan --help untuk melihat panduan penggunaan");
                return Ok(ExitCode::from(2));
            };
            search(&cli, &config, term).await
        }
    }
}

fn load_config(cli: &Cli) -> Result<KbbiConfig> {
    let mut config = match &cli.config {
        Some(path) => KbbiConfig::from_file(path)?,
        None => KbbiConfig::default(),
    };
    // The cache lives beside the session cookie unless placed explicitly.
    if let Some(dir) = &cli.cache_dir {
        config.cache.dir.clone_from(dir);
    } else if let Some(parent) = cli.cookie_file.as_deref().and_then(Path::parent) {
        config.cache.dir = parent.join(CACHE_DIR_NAME);
    }
    if cli.no_cache {
        config.cache.enabled = false;
    }
    Ok(config)
}

/// Restores the saved session, falling back to anonymous lookups.
fn load_session(cli: &Cli, host: &str) -> Option<CookieSession> {
    let path = cli
        .cookie_file
        .clone()
        .or_else(CookieSession::default_cookie_path)?;
    if !path.exists() {
        debug!(path = %path.display(), "No session cookie file");
        return None;
    }
    match CookieSession::load(&path, host) {
        Ok(session) => Some(session),
        Err(err) => {
            warn!(error = %err, "Continuing without a session");
            None
        }
    }
}

async fn search(cli: &Cli, config: &KbbiConfig, term: &str) -> Result<ExitCode> {
    let mut client = Kbbi::from_config(config)?;
    if !cli.anonymous {
        if let Some(session) = load_session(cli, &config.fetch.host) {
            client = client.with_session(Arc::new(session));
        }
    }

    match client.search(term).await {
        Ok(result) => {
            print_result(cli, result)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(KbbiError::EntryNotFound(result)) => {
            if !cli.json {
                println!("{term} tidak ditemukan dalam KBBI.");
            }
            if !result.suggestions.is_empty() && (client.is_authenticated() || cli.json) {
                print_result(cli, *result)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => Err(err.into()),
    }
}

fn print_result(cli: &Cli, mut result: SearchResult) -> Result<()> {
    if cli.no_examples {
        result.strip_examples();
    }
    if cli.no_related {
        result.strip_related();
    }

    if cli.json {
        println!("{}", result.to_json(cli.indent)?);
    } else {
        println!("{result}");
    }
    Ok(())
}

fn run_cache(action: CacheAction, config: &KbbiConfig) -> Result<ExitCode> {
    let store = CacheStore::new(config.cache.clone());
    match action {
        CacheAction::Sweep => {
            let removed = store.sweep_expired()?;
            println!("{removed} entri kedaluwarsa dihapus dari {}", store.dir().display());
        }
        CacheAction::Purge => {
            let removed = store.purge_all()?;
            println!("{removed} entri dihapus dari {}", store.dir().display());
        }
        CacheAction::Stats => {
            let stats = store.stats()?;
            println!(
                "{} entri, {} bita di {}",
                stats.files,
                stats.bytes,
                store.dir().display()
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_term_and_flags() {
        let cli = Cli::parse_from(["kbbi", "rumah", "--json", "--indent", "--no-examples"]);
        assert_eq!(cli.term.as_deref(), Some("rumah"));
        assert!(cli.json && cli.indent && cli.no_examples);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_indent_requires_json() {
        assert!(Cli::try_parse_from(["kbbi", "rumah", "--indent"]).is_err());
    }

    #[test]
    fn test_cache_subcommand_with_global_flag() {
        let cli = Cli::parse_from(["kbbi", "cache", "stats", "--cache-dir", "/tmp/kbbi"]);
        assert!(matches!(
            cli.command,
            Some(Command::Cache {
                action: CacheAction::Stats
            })
        ));
        assert_eq!(cli.cache_dir, Some(PathBuf::from("/tmp/kbbi")));
    }

    #[test]
    fn test_load_config_overrides() {
        let cli = Cli::parse_from(["kbbi", "rumah", "--no-cache", "--cache-dir", "/tmp/kbbi"]);
        let config = load_config(&cli).unwrap();
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.dir, PathBuf::from("/tmp/kbbi"));
    }

    #[test]
    fn test_cache_dir_follows_cookie_file() {
        let cli = Cli::parse_from(["kbbi", "rumah", "--cookie-file", "/srv/kbbi/kuki.json"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.cache.dir, PathBuf::from("/srv/kbbi/cache"));

        let cli = Cli::parse_from([
            "kbbi",
            "rumah",
            "--cookie-file",
            "/srv/kbbi/kuki.json",
            "--cache-dir",
            "/tmp/kbbi",
        ]);
        assert_eq!(load_config(&cli).unwrap().cache.dir, PathBuf::from("/tmp/kbbi"));
    }
}
