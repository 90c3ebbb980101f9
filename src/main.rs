//! clshim - caching front end for the MSVC compiler
//!
//! CLI entry point that dispatches to subcommands. When installed under the
//! compiler's own name every argument is treated as a compiler argument.

use clap::Parser;
use clshim::cli::commands::{self, CommandContext};
use clshim::cli::{Cli, Commands};
use clshim::config::ConfigManager;
use clshim::error::ClashResult;
use console::style;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        // The compiler's exit code may not fit in a u8.
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ClashResult<i32> {
    let cli = if invoked_as_compiler() {
        Cli::compiler_mode(std::env::args_os().skip(1))
    } else {
        Cli::parse()
    };

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, config.general.log_format == "json");

    if let Commands::Config(args) = cli.command {
        commands::config(args, &config_manager, &config).await?;
        return Ok(0);
    }

    let ctx = CommandContext::detect(config)?;

    match cli.command {
        Commands::Compile(args) => commands::compile(args, &ctx).await,
        Commands::Explain(args) => commands::explain(args, &ctx).await.map(|()| 0),
        Commands::Stats(args) => commands::stats(args, &ctx).await.map(|()| 0),
        Commands::Locate => commands::locate(&ctx).await.map(|()| 0),
        Commands::Config(_) => unreachable!("Config handled above"),
    }
}

/// Logs go to stderr so the compiler's stdout stays untouched.
///
/// 0 = `CLSHIM_LOG` or warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, json: bool) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env("CLSHIM_LOG").unwrap_or_else(|_| EnvFilter::new("clshim=warn")),
        1 => EnvFilter::new("clshim=info"),
        _ => EnvFilter::new("clshim=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn invoked_as_compiler() -> bool {
    std::env::args_os()
        .next()
        .as_deref()
        .and_then(|argv0| Path::new(argv0).file_stem())
        .is_some_and(|stem| stem.eq_ignore_ascii_case("cl"))
}
