//! crlfscan - CRLF injection scanner CLI

use clap::Parser;
use colored::Colorize;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

use crlfscan::config::{self, CliOverrides};
use crlfscan::models::ScanConfig;
use crlfscan::report::{show_error, ResultWriter};
use crlfscan::scanner::Dispatcher;

/// crlfscan - scan URLs for CRLF injection
#[derive(Parser)]
#[command(name = "crlfscan", version, about, long_about = None)]
struct Cli {
    /// Target URL to scan
    #[arg(short, long)]
    url: Option<String>,

    /// File with one target URL per line
    #[arg(short, long)]
    list: Option<PathBuf>,

    /// HTTP method
    #[arg(short = 'X', long)]
    method: Option<String>,

    /// Request body
    #[arg(short, long)]
    data: Option<String>,

    /// Custom header (format: "Name:Value"), repeatable
    #[arg(short = 'H', long)]
    header: Vec<String>,

    /// HTTP/HTTPS proxy URL
    #[arg(short = 'x', long)]
    proxy: Option<String>,

    /// Number of concurrent probers
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Connect timeout and request deadline in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Do not follow redirects on the standard client
    #[arg(long)]
    no_redirects: bool,

    /// Header name the payload injects
    #[arg(long)]
    marker_header: Option<String>,

    /// Header value the payload injects
    #[arg(long)]
    marker_value: Option<String>,

    /// Append vulnerable URLs to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print only vulnerable URLs
    #[arg(short, long)]
    silent: bool,

    /// Print every probed URL and request errors
    #[arg(short, long)]
    verbose: bool,
}

fn print_banner() {
    let banner = r#"
      ___ ___ _    ___
     / __| _ \ |  | __|___ __ __ _ _ _
    | (__|   / |__| _|(_-</ _/ _` | ' \
     \___|_|_\____|_| /__/\__\__,_|_||_|
    "#;
    eprintln!("{}", banner.cyan());
    eprintln!("    v{}\n", env!("CARGO_PKG_VERSION"));
}

/// Collects targets from `--url` and `--list`, falling back to piped stdin
async fn read_targets(cli: &Cli) -> std::io::Result<String> {
    let mut target = String::new();

    if let Some(ref url) = cli.url {
        target.push_str(url);
        target.push('\n');
    }

    if let Some(ref path) = cli.list {
        target.push_str(&tokio::fs::read_to_string(path).await?);
        target.push('\n');
    }

    if cli.url.is_none() && cli.list.is_none() && !std::io::stdin().is_terminal() {
        let mut piped = String::new();
        tokio::io::stdin().read_to_string(&mut piped).await?;
        target.push_str(&piped);
    }

    Ok(target)
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "crlfscan=debug"
    } else {
        "crlfscan=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut scan_config = if let Some(ref path) = cli.config {
        config::load_config(path)?
    } else {
        let default_path = Path::new("config/default.toml");
        if default_path.exists() {
            config::load_config(default_path)?
        } else {
            ScanConfig::default()
        }
    };

    config::merge_cli_args(
        &mut scan_config,
        CliOverrides {
            method: cli.method.clone(),
            data: cli.data.clone(),
            headers: cli.header.clone(),
            proxy: cli.proxy.clone(),
            concurrency: cli.concurrency,
            timeout_secs: cli.timeout,
            no_redirects: cli.no_redirects,
            marker_header: cli.marker_header.clone(),
            marker_value: cli.marker_value.clone(),
            silent: cli.silent,
            verbose: cli.verbose,
        },
    );
    config::validate(&scan_config)?;

    if !scan_config.silent {
        print_banner();
    }

    let target = read_targets(&cli).await?;
    if target.trim().is_empty() {
        show_error("no targets given; use --url, --list or pipe URLs on stdin");
        std::process::exit(1);
    }

    let results = match cli.output {
        Some(ref path) => Some(Arc::new(ResultWriter::append_to(path).await?)),
        None => None,
    };

    let dispatcher = Dispatcher::from_config(&scan_config, results)?;
    dispatcher.run(&target).await;

    Ok(())
}
