// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap and set up logging
// 2. Load the channel list (file) or build it from the command line (urls)
// 3. Start a run on the engine and print its events while it works
// 4. Print the results, optionally export them to disk
// 5. Exit with proper code (0 = all channels valid, 1 = some invalid, 2 = error)
//
// Ctrl-C during a run stops new checks from starting; the ones already
// running finish and are included in the results.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use stream_guardian::cli::{CheckOptions, Cli, Commands};
use stream_guardian::console::{self, ConsoleReporter};
use stream_guardian::error::{LoadError, StartError};
use stream_guardian::{export, playlist, Endpoint, Engine};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check { file, options } => handle_file_check(&file, options).await,
        Commands::Url { urls, options } => {
            let endpoints = urls
                .into_iter()
                .enumerate()
                .map(|(index, url)| Endpoint::new(format!("channel_{}", index + 1), url))
                .collect();
            check_endpoints(endpoints, options).await
        }
    }
}

// Respect RUST_LOG if set, otherwise warn-only unless --verbose. Logs go to
// stderr so they never mix with --json output.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "stream_guardian=debug"
    } else {
        "stream_guardian=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Handles the 'check' subcommand
async fn handle_file_check(file: &Path, options: CheckOptions) -> Result<i32> {
    println!("🔍 Loading channel list: {}", file.display());

    let (endpoints, format) = match playlist::load_endpoints(file) {
        Ok(loaded) => loaded,
        Err(LoadError::Empty(_)) => {
            println!("⚠️  No channels found in {}", file.display());
            return Ok(0);
        }
        Err(e) => return Err(e).context("could not load channel list"),
    };

    println!("📄 Detected {}, {} channel(s)", format, endpoints.len());
    check_endpoints(endpoints, options).await
}

// Runs the engine over `endpoints`, prints and exports the results
async fn check_endpoints(endpoints: Vec<Endpoint>, options: CheckOptions) -> Result<i32> {
    let config = options.to_config();

    println!(
        "\n🌐 Checking {} channel(s) | timeout {}s | concurrency {} | method {} | retry {}\n",
        endpoints.len(),
        config.timeout.as_secs(),
        config.concurrency,
        config.method,
        if config.retry_enabled { "on" } else { "off" }
    );

    let engine = Engine::with_http().context("could not create HTTP client")?;
    let mut handle = match engine.start(endpoints, &config) {
        Ok(handle) => handle,
        Err(StartError::NoEndpoints) => {
            println!("⚠️  No channels to check");
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };

    // First Ctrl-C cancels the run gracefully
    let canceller = handle.canceller();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel();
        }
    });

    let reporter = ConsoleReporter::new(config.detailed_logging);
    if reporter.follow(&mut handle).await.is_none() {
        warn!("run ended without a completion event");
    }
    let report = handle.wait().await.context("run task failed")?;
    ctrl_c.abort();

    console::print_results(&report, options.json)?;

    if let Some(dir) = &options.export_dir {
        // An export failure leaves the results intact; report it and move on
        match export::export_all(&report, dir) {
            Ok(paths) => {
                println!("\n💾 Results exported to {}", dir.display());
                for path in paths.all() {
                    println!("   {}", path.display());
                }
            }
            Err(e) => eprintln!("\n⚠️  Export failed: {}", e),
        }
    }

    if report.summary.invalid_count > 0 {
        Ok(1) // Exit code 1 = broken channels found
    } else {
        Ok(0) // Exit code 0 = all good
    }
}
