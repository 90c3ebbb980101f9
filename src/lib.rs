//! clshim - caching front end for the MSVC compiler
//!
//! Sits in front of `cl.exe`, works out from the command line whether an
//! invocation can be cached, runs the real compiler with dependency capture,
//! and keeps cache statistics shared between concurrent builds.

pub mod args;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod error;
pub mod platform;
pub mod stats;

pub use error::{ClashError, ClashResult};
