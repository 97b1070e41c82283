use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use mdserve::{ConfigError, ServerConfig, ShutdownLatch};
use std::process::ExitCode;

/// Concurrent MD5 digest server with a bounded LRU cache.
#[derive(Parser, Debug)]
#[command(name = "mdserve", version, about, long_about = None)]
struct Cli {
    /// Port to listen on.
    #[arg(short = 'p')]
    port: i64,

    /// Cache size.
    #[arg(short = 'C')]
    cache_size: i64,

    /// Number of threads used as thread pool (8 by default).
    #[arg(short = 't', default_value_t = 0)]
    threads: i64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("SERVER_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return handle_parse_error(err),
    };

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let latch = match ShutdownLatch::install() {
        Ok(latch) => latch,
        Err(err) => {
            eprintln!("Error: failed to install signal handler: {err}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        port = config.port,
        cache_capacity = config.cache_capacity,
        thread_count = config.thread_count,
        "starting server"
    );

    match mdserve::run(config, &latch) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Translates a `clap` parse failure into this server's exit conventions:
/// `-h`/`--help` (and `--version`) print to stdout and exit 0; an unknown
/// flag prints the help banner and exits 1; anything else (a missing or
/// malformed `-p`/`-C`/`-t`) prints just the error to stderr and exits 1.
fn handle_parse_error(err: clap::Error) -> ExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{err}");
            ExitCode::SUCCESS
        }
        ErrorKind::UnknownArgument | ErrorKind::InvalidSubcommand => {
            let _ = Cli::command().print_help();
            println!();
            ExitCode::FAILURE
        }
        _ => {
            eprint!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Negative CLI values collapse to 0 before validation, matching the
/// original `atoi`-then-`<= 0` rejection path for `-p`/`-C`, and the
/// `<= 0`-means-"use the default" fallback for `-t`.
fn build_config(cli: &Cli) -> Result<ServerConfig, ConfigError> {
    let port = cli.port.max(0).min(u16::MAX as i64) as u16;
    let cache_size = cli.cache_size.max(0) as usize;
    let threads = cli.threads.max(0) as usize;
    ServerConfig::new(port, cache_size, threads)
}
