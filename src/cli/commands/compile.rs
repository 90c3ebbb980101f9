//! Compile command - run the real compiler and record the outcome

use super::CommandContext;
use crate::args::Interpretation;
use crate::cli::args::CompileArgs;
use crate::compiler::{potential_include_files, used_include_dirs, IncludeSet, RealCompiler};
use crate::error::ClashResult;
use crate::stats::{Counter, StatsLedger, TransientStats};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Execute the compile command, returning the compiler's exit code
pub async fn execute(args: CompileArgs, ctx: &CommandContext) -> ClashResult<i32> {
    let exe = ctx.locate_compiler()?;
    let compiler = RealCompiler::new(&exe, ctx.env.clone(), &ctx.working_dir)?;
    let interpretation = ctx.interpreter(exe).interpret(&args.args);

    let mut stats = TransientStats::new(ctx.cache_root());
    stats.set_omit_locks(ctx.config.cache.omit_locks);

    let result = run(&compiler, &args.args, &interpretation, ctx, &mut stats).await;

    if let Err(e) = stats.commit() {
        warn!("failed to record statistics: {}", e);
    }
    result
}

async fn run(
    compiler: &RealCompiler,
    args: &[String],
    interpretation: &Interpretation,
    ctx: &CommandContext,
    stats: &mut TransientStats,
) -> ClashResult<i32> {
    if let Some(reason) = interpretation.unsupported_reason() {
        info!("not cacheable: {}", reason);
        stats.add(Counter::Unsupported, 1);
        return compiler.passthrough(args).await;
    }

    info!("cacheable invocation");
    stats.add(Counter::Misses, 1);

    let started = Instant::now();
    let mut includes = IncludeSet::new();
    let code = compiler
        .invoke(args, print_stderr, print_stdout, Some(&mut includes))
        .await?;
    let elapsed = started.elapsed();
    debug!(
        "compiler finished in {:?} with {} includes",
        elapsed,
        includes.len()
    );

    if code == 0 {
        let request = &interpretation.request;
        let dirs = used_include_dirs(request, &ctx.env);
        let shadows = potential_include_files(request, &dirs, &includes);
        debug!(
            "{} files could change include resolution if created",
            shadows.len()
        );
        for file in &shadows {
            debug!("  {}", file.display());
        }
    }

    Ok(code)
}

fn print_stdout(line: &str) {
    println!("{}", line);
}

fn print_stderr(line: &str) {
    eprintln!("{}", line);
}
