//! Stats command - show or reset cache statistics

use super::CommandContext;
use crate::cli::args::{OutputFormat, StatsArgs};
use crate::error::ClashResult;
use crate::stats::{Counter, DurableStats, StatsLedger, StatsSnapshot};
use console::style;
use serde::Serialize;
use std::path::Path;

/// Execute the stats command
pub async fn execute(args: StatsArgs, ctx: &CommandContext) -> ClashResult<()> {
    let root = ctx.cache_root();
    let mut stats = DurableStats::new(&root);
    stats.set_omit_locks(ctx.config.cache.omit_locks);

    if args.reset {
        stats.reset()?;
        if args.format == OutputFormat::Text {
            println!("{} {}", style("Statistics reset for").green(), root.display());
            return Ok(());
        }
    }

    let snapshot = stats.with_lock(|s| s.snapshot())?;
    match args.format {
        OutputFormat::Json => print_json(&root, &snapshot)?,
        OutputFormat::Text => print_text(&root, &snapshot),
    }
    Ok(())
}

fn print_json(root: &Path, snapshot: &StatsSnapshot) -> ClashResult<()> {
    #[derive(Serialize)]
    struct StatsJson<'a> {
        cache_root: &'a Path,
        #[serde(flatten)]
        counters: &'a StatsSnapshot,
    }

    let json = serde_json::to_string_pretty(&StatsJson {
        cache_root: root,
        counters: snapshot,
    })?;
    println!("{}", json);
    Ok(())
}

fn print_text(root: &Path, snapshot: &StatsSnapshot) {
    println!("{}", style("clshim statistics").bold().cyan());
    println!("{:<22} {}", "cache root", root.display());
    println!("{}", "-".repeat(40));

    for counter in Counter::ALL {
        let value = snapshot.get(counter);
        let shown = if value == 0 {
            style(value.to_string()).dim()
        } else {
            style(value.to_string()).bold()
        };
        println!("{:<22} {}", counter.to_string(), shown);
    }

    let calls = snapshot.hits + snapshot.misses;
    if calls > 0 {
        let rate = snapshot.hits as f64 * 100.0 / calls as f64;
        println!();
        println!("{:<22} {:.1}%", "hit rate", rate);
    }
}
