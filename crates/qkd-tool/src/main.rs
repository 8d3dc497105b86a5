//! QKD pipeline operator tool.
//!
//! # Usage
//!
//! ```bash
//! # Validate a scheme and show what it costs
//! qkd-tool scheme evhash-96:000102030405060708090a0b
//!
//! # Key bytes per round for an association
//! qkd-tool budget --auth-in evhash-96 --auth-out evhash-96 --enc-in xor --enc-out xor
//!
//! # Same, from a configuration file, failing loudly on bad schemes
//! qkd-tool budget --definition link.json --strict
//!
//! # Integrity checksum of a key file
//! qkd-tool checksum --algorithm sha1 keys.bin
//! ```

mod commands;
mod error;

use std::{io, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::BudgetArgs;

/// QKD post-processing operator tool
#[derive(Parser, Debug)]
#[command(name = "qkd-tool")]
#[command(about = "Inspect crypto schemes, key budgets and checksums")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a scheme, build its context and print the canonical form
    Scheme {
        /// Scheme text, e.g. `evhash-64:0011223344556677`
        text: String,
    },

    /// Key bytes one round of an association consumes
    Budget {
        /// JSON association definition; flags override its fields
        #[arg(long)]
        definition: Option<PathBuf>,

        /// Incoming authentication scheme
        #[arg(long)]
        auth_in: Option<String>,

        /// Outgoing authentication scheme
        #[arg(long)]
        auth_out: Option<String>,

        /// Incoming encryption scheme
        #[arg(long)]
        enc_in: Option<String>,

        /// Outgoing encryption scheme
        #[arg(long)]
        enc_out: Option<String>,

        /// Fail on an unusable definition instead of reporting 0
        #[arg(long)]
        strict: bool,
    },

    /// Checksum a file (`-` for stdin)
    Checksum {
        /// Checksum algorithm (crc32, md5, sha1)
        #[arg(short, long, default_value = "crc32")]
        algorithm: String,

        /// File to checksum
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let mut out = io::stdout().lock();
    let result = match args.command {
        Command::Scheme { text } => commands::scheme(&text, &mut out),
        Command::Budget { definition, auth_in, auth_out, enc_in, enc_out, strict } => {
            let budget = BudgetArgs { definition, auth_in, auth_out, enc_in, enc_out, strict };
            commands::budget(&budget, &mut out)
        },
        Command::Checksum { algorithm, file } => commands::checksum(&algorithm, &file, &mut out),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            ExitCode::FAILURE
        },
    }
}
