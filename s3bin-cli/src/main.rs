//! # s3bin
//!
//! Downloads or uploads binary files from/to an S3 bucket.
//!
//! With `--put`, uploads the file and creates a file with the same name plus
//! the `.sha1` extension holding the SHA-1 of the uploaded binary.
//!
//! With `--get`, takes a `.sha1` file created by `--put` and downloads the
//! corresponding file iff the local file does not exist or its contents do
//! not match the hash. `--get-dir` does the same for every `.sha1` file
//! under a directory.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgGroup, Parser};
use s3bin_cloud::{S3Store, StoreConfig};
use s3bin_core::SyncEngine;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Download or upload binary files from/to an S3 bucket.
#[derive(Parser, Debug)]
#[command(
    name = "s3bin",
    version,
    about,
    long_about = LONG_ABOUT,
    group(ArgGroup::new("action").required(true).args(["get", "get_dir", "put"]))
)]
struct Cli {
    /// Name of the S3 bucket where binaries are stored.
    #[arg(long = "s3-bucket", value_name = "NAME", env = "S3BIN_S3_BUCKET")]
    s3_bucket: String,

    /// AWS region of the S3 bucket.
    #[arg(long = "aws-region", value_name = "REGION", env = "AWS_REGION")]
    aws_region: String,

    /// Use a custom S3 endpoint (e.g. a local MinIO).
    #[arg(long = "endpoint-url", value_name = "URL")]
    endpoint_url: Option<String>,

    /// Download the file described by a .sha1 pointer file.
    #[arg(long, value_name = "FILE.sha1")]
    get: Option<PathBuf>,

    /// Download every file described by a .sha1 pointer under a directory.
    #[arg(long = "get-dir", value_name = "DIRECTORY")]
    get_dir: Option<PathBuf>,

    /// Upload a file and create the corresponding .sha1 file.
    #[arg(long, value_name = "FILE")]
    put: Option<PathBuf>,

    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

const LONG_ABOUT: &str = "\
Download or upload binary files from/to an S3 bucket.

With --put, s3bin uploads the file to the S3 bucket and creates a file with
the same name plus the .sha1 extension. This file contains the SHA-1 hash of
the uploaded binary.

With --get, s3bin takes the .sha1 file created by --put and downloads the
corresponding file from S3 iff the local file does not exist or its contents
do not match the recorded hash. --get-dir does this for every .sha1 file
under a directory.";

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = StoreConfig::new(&cli.s3_bucket, &cli.aws_region);
    if let Some(endpoint) = &cli.endpoint_url {
        config = config.with_endpoint(endpoint);
    }

    let store = S3Store::connect(&config)?;
    let engine = SyncEngine::new(store);

    if let Some(pointer) = &cli.get {
        engine.get(pointer)?;
    } else if let Some(dir) = &cli.get_dir {
        let summary = engine.get_dir(dir)?;
        info!(
            "{} pointer files: {} downloaded, {} updated, {} up-to-date",
            summary.total(),
            summary.downloaded,
            summary.updated,
            summary.up_to_date
        );
    } else if let Some(path) = &cli.put {
        engine.put(path)?;
    }

    Ok(())
}
