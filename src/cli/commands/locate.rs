//! Locate command - print the real compiler

use super::CommandContext;
use crate::error::ClashResult;

/// Execute the locate command
pub async fn execute(ctx: &CommandContext) -> ClashResult<()> {
    let exe = ctx.locate_compiler()?;
    println!("{}", exe.display());
    Ok(())
}
