//! CLI argument definitions using clap derive macros.

use clap::Parser;

/// Resolve the size of a remote HTTP(S) resource without downloading it.
///
/// Sends HEAD first and reads Content-Length; when the server does not
/// declare one, streams the body and counts bytes without storing them.
#[derive(Parser, Debug)]
#[command(name = "remote-size")]
#[command(author, version, about)]
pub struct Args {
    /// URL of the resource (http:// or https://)
    pub url: String,

    /// Unit for the result: bytes, b, kb, kib, mb, mib, gb, gib, tb, tib or human [default: bytes]
    #[arg(short, long)]
    pub unit: Option<String>,

    /// Overall deadline in milliseconds, 0 for none [default: 20000]
    #[arg(short, long, allow_negative_numbers = true)]
    pub timeout_ms: Option<i64>,

    /// Maximum attempts including the first [default: 4]
    #[arg(short = 'a', long, allow_negative_numbers = true)]
    pub max_attempts: Option<i64>,

    /// Print a JSON object instead of the bare value
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress everything except errors
    #[arg(short, long)]
    pub quiet: bool,
}
