//! Compiler argument interpretation
//!
//! Turns the command line handed to the compiler into a
//! [`CompilationRequest`] and decides whether the invocation can be cached.
//!
//! | Stage | Module |
//! |-------|--------|
//! | Split / join command lines | [`tokenize`] |
//! | `@file` expansion | [`response`] |
//! | Token classification | [`interpret`] |
//! | Rewriting for the real compiler | [`normalize`] |

pub mod interpret;
pub mod normalize;
pub mod request;
pub mod response;
pub mod tokenize;

pub use interpret::{default_pdb_name, InterpretContext, Interpreter};
pub use normalize::normalize_for_shell;
pub use request::{CompilationRequest, Interpretation, UnsupportedReason, Verdict};
pub use response::RESPONSE_FILE_CEILING;
pub use tokenize::{join_arguments, split_command_line};
