pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod macros;
pub mod query;
pub mod server;
pub mod storage;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::ServerConfig;
use executor::Executor;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// In-memory warehouse tables with a macro-aware command line
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", env = "DATASHELL_LOG_LEVEL", global = true)]
    log_level: String,

    /// Shorthand for `--log-level debug`
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Read commands from standard input (default)
    Repl,
    /// Serve line-delimited JSON requests over TCP
    Serve {
        #[arg(short = 'H', long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("failed to load config file '{}'", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(Mode::Serve { host, port }) = &args.command {
        if let Some(host) = host {
            config.host = host.clone();
        }
        if let Some(port) = port {
            config.port = *port;
        }
    }

    if args.print_config {
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    let exec = Arc::new(Executor::new(config.primary_key_mode));
    match args.command {
        Some(Mode::Serve { .. }) => serve(&config, exec).await,
        Some(Mode::Repl) | None => repl(&exec),
    }
}

fn init_logging(args: &Args) {
    let level = if args.verbose { "debug" } else { args.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("datashell={level}")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn serve(config: &ServerConfig, exec: Arc<Executor>) -> Result<()> {
    let server = server::Server::bind(config, exec).await?;
    server
        .serve(async {
            if tokio::signal::ctrl_c().await.is_err() {
                info!("ctrl-c handler unavailable");
                std::future::pending::<()>().await;
            }
        })
        .await
}

fn repl(exec: &Executor) -> Result<()> {
    println!("datashell (type '.exit' or '.quit' to stop)");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("datashell> ");
        io::stdout().flush()?;
        let Some(input) = lines.next() else {
            break;
        };
        let input = input.context("failed to read line")?;
        let trimmed = input.trim();
        // exit commands
        if trimmed == ".exit" || trimmed == ".quit" {
            break;
        } else if trimmed.is_empty() {
            continue;
        }
        match exec.run(&input) {
            Ok(result) => println!("{result}"),
            Err(e) => eprintln!("error: {e}"),
        }
    }
    Ok(())
}
