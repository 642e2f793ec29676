//! wacheck CLI: command-line client for the wacheck API.
//!
//! Set WACHECK_API_URL (or API_URL) to point at the server.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use wacheck_api_client::{ApiClient, CheckMode};
use wacheck_cli::{
    format_carrier_line, format_check_line, format_stats, format_status, init_tracing,
    read_results, write_output,
};
use wacheck_core::file_tools::PrefixMode;
use wacheck_core::{ResultFilter, ResultStats};

const WATCH_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "wacheck", about = "Check phone numbers for WhatsApp registration")]
struct Cli {
    /// Print raw JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the session status
    Status,
    /// Poll the session status every 5 seconds until Ctrl+C
    Watch,
    /// Print the pending QR code payload, if any
    Qr,
    /// Close the session and create a new one
    Restart,
    /// Close the session without reconnecting
    Disconnect,
    /// Check a single number
    Check {
        /// Number in international format, e.g. +962791234567
        number: String,
    },
    /// Check every number of a .txt or .csv list
    Bulk {
        /// List file
        file: PathBuf,
        /// Save the results as JSON (usable with `export`)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Only print results matching: all, valid, invalid, business, personal, errors
        #[arg(long, default_value = "all")]
        filter: String,
    },
    /// Look up country and carrier for one or more numbers
    Carrier {
        #[arg(required = true)]
        numbers: Vec<String>,
    },
    /// Split a list into chunk files (zip archive)
    Split {
        file: PathBuf,
        /// Lines per chunk
        #[arg(long, default_value = "100")]
        chunk_size: usize,
        /// Directory for the archive
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Add or remove a prefix on every line of a list
    Prefix {
        file: PathBuf,
        /// Prefix, e.g. +
        #[arg(long)]
        prefix: String,
        /// add or remove
        #[arg(long, default_value = "add")]
        mode: String,
        /// Write here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Export saved results to CSV
    Export {
        /// JSON results written by `bulk --output`
        results: PathBuf,
        /// all, valid, invalid, business, personal, errors
        #[arg(long, default_value = "all")]
        filter: String,
        /// Directory for the CSV file
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn parse_filter(raw: &str) -> anyhow::Result<ResultFilter> {
    raw.parse::<ResultFilter>().map_err(|e| anyhow::anyhow!(e))
}

async fn watch(client: &ApiClient, json: bool) -> anyhow::Result<()> {
    let mut interval = tokio::time::interval(WATCH_INTERVAL);
    let mut last = None;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopped watching");
                return Ok(());
            }
        }

        match client.status().await {
            Ok(status) if json => print_json(&status)?,
            Ok(status) => {
                if last != Some(status.status) {
                    println!("{}", format_status(&status));
                    last = Some(status.status);
                }
            }
            Err(e) => eprintln!("Status request failed: {:#}", e),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let client = ApiClient::from_env()
        .context("Failed to create API client. Set WACHECK_API_URL (or API_URL)")?;

    match cli.command {
        Commands::Status => {
            let status = client.status().await?;
            if cli.json {
                print_json(&status)?;
            } else {
                println!("{}", format_status(&status));
            }
        }
        Commands::Watch => watch(&client, cli.json).await?,
        Commands::Qr => {
            let qr = client.qr().await?;
            match &qr.qr_code {
                Some(code) if !cli.json => println!("{}", code),
                _ => print_json(&qr)?,
            }
        }
        Commands::Restart => print_json(&client.restart().await?)?,
        Commands::Disconnect => print_json(&client.disconnect().await?)?,
        Commands::Check { number } => {
            let result = client.check_number(&number).await?;
            if cli.json {
                print_json(&result)?;
            } else {
                println!("{}", format_check_line(&result));
            }
        }
        Commands::Bulk {
            file,
            output,
            filter,
        } => {
            let filter = parse_filter(&filter)?;
            let list = client.parse_list(&file).await?;
            eprintln!("Checking {} numbers from {}", list.count, list.file_name);

            let outcome = client.check_numbers(&list.numbers).await?;
            if outcome.mode == CheckMode::PerNumber {
                eprintln!("Bulk endpoint unavailable, numbers were checked one by one");
            }

            if let Some(path) = &output {
                let body = serde_json::to_vec_pretty(&outcome.results)
                    .context("Serialize results")?;
                std::fs::write(path, body)
                    .with_context(|| format!("Failed to write results: {}", path.display()))?;
                eprintln!("Results saved to {}", path.display());
            }

            let shown: Vec<_> = outcome
                .results
                .iter()
                .filter(|r| filter.matches(r))
                .collect();
            if cli.json {
                print_json(&shown)?;
            } else {
                for result in shown {
                    println!("{}", format_check_line(result));
                }
                println!();
                println!("{}", format_stats(&ResultStats::from_results(&outcome.results)));
            }
        }
        Commands::Carrier { numbers } => {
            let results = match numbers.as_slice() {
                [single] => vec![client.carrier(single).await?],
                _ => client.carrier_bulk(&numbers).await?,
            };
            if cli.json {
                print_json(&results)?;
            } else {
                for result in &results {
                    println!("{}", format_carrier_line(result));
                }
            }
        }
        Commands::Split {
            file,
            chunk_size,
            out_dir,
        } => {
            let download = client.split_file(&file, chunk_size).await?;
            let path = write_output(&out_dir, &download.file_name, &download.bytes)?;
            println!("{}", path.display());
        }
        Commands::Prefix {
            file,
            prefix,
            mode,
            output,
        } => {
            let mode = mode
                .parse::<PrefixMode>()
                .map_err(|e| anyhow::anyhow!(e.to_string()))?;
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read file: {}", file.display()))?;

            let prefixed = client.prefix(&content, &prefix, mode).await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, format!("{}\n", prefixed.content))
                        .with_context(|| format!("Failed to write file: {}", path.display()))?;
                    eprintln!("{} lines written to {}", prefixed.line_count, path.display());
                }
                None => println!("{}", prefixed.content),
            }
        }
        Commands::Export {
            results,
            filter,
            out_dir,
        } => {
            let filter = parse_filter(&filter)?;
            let results = read_results(&results)?;
            let download = client.export(&results, filter).await?;
            let path = write_output(&out_dir, &download.file_name, &download.bytes)?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
