//! CLI entry point for the remote-size tool.

use anyhow::Result;
use clap::Parser;
use remote_size::{HttpProbe, SizeQuery, SizeResolver, SizeValue};
use serde::Serialize;
use tracing::debug;

mod app_config;
mod cli;

use app_config::{load_default_file_config, resolve_settings};
use cli::Args;

/// Shape of `--json` output.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    url: &'a str,
    unit: String,
    size: &'a SizeValue,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Logs go to stderr; stdout carries only the result.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let loaded = load_default_file_config()?;
    if let (Some(path), Some(_)) = (&loaded.path, &loaded.config) {
        debug!(path = %path.display(), "loaded config file");
    }
    let settings = resolve_settings(&args, loaded.config.as_ref());
    debug!(?settings, "resolved settings");

    let query = SizeQuery::new(
        &args.url,
        &settings.unit,
        settings.timeout_ms,
        settings.max_attempts,
    )?;
    let resolver = SizeResolver::new(HttpProbe::with_connect_timeout(
        settings.connect_timeout_secs,
    ));
    let size = resolver.resolve(&query).await?;

    if args.json {
        let report = JsonReport {
            url: query.url(),
            unit: settings.unit.to_ascii_lowercase(),
            size: &size,
        };
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("{size}");
    }

    Ok(())
}
