use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use larek::api::http::HttpApi;
use larek::banner::{BannerInfo, print_banner, print_exit_summary};
use larek::commands::{CommandRegistry, CommandResult};
use larek::config::Endpoints;
use larek::consts::default_db_path;
use larek::spinner::spin_while;
use larek::storage::sqlite::SqliteStorage;
use larek::storefront::Storefront;

#[derive(Parser)]
#[command(name = "larek", version, about = "A terminal storefront for web-larek.")]
struct Cli {
    /// Backend origin; API and content URLs are derived from it
    #[arg(long, env = "API_ORIGIN")]
    api_origin: Option<String>,

    /// Override the REST API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Override the content (image) base URL
    #[arg(long)]
    cdn_url: Option<String>,

    /// SQLite database path for the basket (use :memory: for ephemeral)
    #[arg(short, long)]
    db: Option<PathBuf>,

    /// Skip the startup banner
    #[arg(long, default_value_t = false)]
    no_banner: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("larek=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let endpoints = Endpoints::resolve(
        cli.api_origin.as_deref(),
        cli.api_url.as_deref(),
        cli.cdn_url.as_deref(),
    )?;

    let db_path = match cli.db {
        Some(path) => path,
        None => default_db_path().context("cannot determine home directory; pass --db")?,
    };
    let storage = open_storage(&db_path)?;
    let storage_label = if db_path.as_os_str() == ":memory:" {
        "ephemeral".to_string()
    } else {
        db_path.display().to_string()
    };

    let store = Storefront::new(Arc::new(HttpApi::new(endpoints.clone())), Box::new(storage));

    if !cli.no_banner {
        print_banner(&BannerInfo {
            endpoints: &endpoints,
            storage: &storage_label,
            restored: store.state().basket().len(),
        });
    }

    let commands = CommandRegistry::new();
    store.start();
    drain(&store, "loading catalog").await;

    // Async stdin so Ctrl+C is caught at the prompt too
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("\nlarek> ");
        io::stdout().flush()?;

        // Read next line, interruptible by Ctrl+C
        let line = tokio::select! {
            result = lines.next_line() => {
                match result {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        // Ctrl+D (EOF)
                        println!();
                        break;
                    }
                    Err(e) => {
                        eprintln!("input error: {}", e);
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match commands.dispatch(input, &store).await {
            CommandResult::Quit => break,
            CommandResult::NotACommand => {
                println!("type /help for available commands");
                continue;
            }
            CommandResult::Handled => {}
        }

        // Ctrl+C during a request abandons it, not the REPL
        tokio::select! {
            _ = drain(&store, "talking to the backend") => {}
            _ = tokio::signal::ctrl_c() => {
                println!("\n\ninterrupted");
            }
        }
    }

    print_exit_summary(&store.state().basket_snapshot());
    Ok(())
}

/// Run queued effects, then print whatever changed on screen.
async fn drain(store: &Storefront, message: &str) {
    spin_while(message, store.run_effects()).await;
    if let Some(screen) = store.take_output() {
        println!("{screen}");
    }
}

fn open_storage(path: &std::path::Path) -> anyhow::Result<SqliteStorage> {
    if path.as_os_str() == ":memory:" {
        return SqliteStorage::in_memory();
    }
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create {}", dir.display()))?;
    }
    let path = path
        .to_str()
        .with_context(|| format!("database path is not UTF-8: {}", path.display()))?;
    SqliteStorage::open(path)
}
