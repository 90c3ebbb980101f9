//! Explain command - show how a command line is interpreted

use super::CommandContext;
use crate::args::{Interpretation, Verdict};
use crate::cli::args::{ExplainArgs, OutputFormat};
use crate::error::ClashResult;
use console::style;
use std::path::PathBuf;
use tracing::debug;

/// Execute the explain command
pub async fn execute(args: ExplainArgs, ctx: &CommandContext) -> ClashResult<()> {
    // A missing compiler still gets an interpretation.
    let exe = ctx.locate_compiler().unwrap_or_else(|e| {
        debug!("explaining without a real compiler: {}", e);
        PathBuf::from("cl.exe")
    });
    let interpretation = ctx.interpreter(exe).interpret(&args.args);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&interpretation)?),
        OutputFormat::Text => print_text(&interpretation),
    }
    Ok(())
}

fn print_text(interpretation: &Interpretation) {
    let request = &interpretation.request;

    match &interpretation.verdict {
        Verdict::Supported => println!("{}", style("cacheable").green().bold()),
        Verdict::Unsupported(reason) => println!(
            "{} {}",
            style("not cacheable:").yellow().bold(),
            reason
        ),
    }
    println!();

    println!("{:<16} {}", "Compiler", request.compiler_exe().display());
    println!("{:<16} {}", "Working dir", request.working_dir().display());
    if let Some(file) = request.response_file() {
        println!("{:<16} {}", "Response file", file.display());
    }
    println!("{:<16} {}", "Sources", join_or_dash(request.source_files()));
    println!("{:<16} {}", "Object", display_or_dash(request.object_target()));
    if request.generates_pdb() {
        println!("{:<16} {}", "PDB", display_or_dash(request.pdb_file()));
    }
    let dirs: Vec<String> = request
        .cli_include_dirs()
        .iter()
        .map(|d| d.display().to_string())
        .collect();
    println!("{:<16} {}", "Include dirs", join_or_dash(&dirs));
    println!(
        "{:<16} {}",
        "Arguments",
        style(request.command_line().join(" ")).dim()
    );
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

fn display_or_dash(path: Option<&std::path::Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string())
}
