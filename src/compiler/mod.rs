//! Real compiler location, invocation and include capture

pub mod includes;
pub mod invoke;
pub mod locate;

pub use includes::{
    parse_include_note, potential_include_files, scan_line_directives, used_include_dirs,
    IncludeSet, INCLUDE_NOTE_PREFIX,
};
pub use invoke::{preprocess_args, RealCompiler, PREPROCESS_FLAG, SHOW_INCLUDES_FLAG};
pub use locate::{locate_compiler, COMPILER_OVERRIDE_VAR};
