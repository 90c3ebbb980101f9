//! The structured form of one compiler invocation

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Why an invocation cannot be served from the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "detail")]
pub enum UnsupportedReason {
    /// Linking was requested (`/link`, `/LD`)
    Linking,
    /// Precompiled headers are in use (`/Yu`, `/Yc`)
    PrecompiledHeaders,
    /// A forced include (`/FI`) hides an input from the cache key
    ForcedInclude,
    /// Preprocess-only modes (`/E`, `/EP`, `/P`)
    PreprocessOnly,
    /// Output flag from a foreign compiler family (`-o`)
    ForeignOutput,
    /// An explicit `/Tc` or `/Tp` source does not exist
    MissingSource(String),
    /// A flag expected a value but the command line ended
    MissingValue(String),
    /// Response file reached the size ceiling
    ResponseFileTooLarge,
    /// Response file was not the only argument
    ResponseFileNotSole,
    /// Response files nested deeper than allowed
    ResponseFileNesting,
    /// No source files on the command line
    NoSource,
    /// More than one source file on the command line
    MultipleSources(usize),
    /// No object file could be determined
    NoObjectTarget,
    /// Debug info requested but the default PDB name is unknown
    UnknownPdbName,
    /// Something went wrong while reading the command line
    ParseFailure(String),
}

impl fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linking => write!(f, "linking"),
            Self::PrecompiledHeaders => write!(f, "precompiled headers"),
            Self::ForcedInclude => write!(f, "forced include"),
            Self::PreprocessOnly => write!(f, "preprocess only"),
            Self::ForeignOutput => write!(f, "foreign output flag"),
            Self::MissingSource(s) => write!(f, "source file not found: {}", s),
            Self::MissingValue(flag) => write!(f, "missing value for {}", flag),
            Self::ResponseFileTooLarge => write!(f, "response file too large"),
            Self::ResponseFileNotSole => write!(f, "response file is not the only argument"),
            Self::ResponseFileNesting => write!(f, "response files nested too deeply"),
            Self::NoSource => write!(f, "no source file"),
            Self::MultipleSources(n) => write!(f, "{} source files", n),
            Self::NoObjectTarget => write!(f, "no object target"),
            Self::UnknownPdbName => write!(f, "could not work out compiler version for default pdb"),
            Self::ParseFailure(e) => write!(f, "parse failure: {}", e),
        }
    }
}

/// Cacheability verdict for an invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "verdict")]
pub enum Verdict {
    Supported,
    Unsupported(UnsupportedReason),
}

/// A compiler invocation broken down into the parts the cache cares about.
///
/// Built by [`super::Interpreter`]; read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct CompilationRequest {
    pub(crate) command_line: Vec<String>,
    pub(crate) source_files: Vec<String>,
    pub(crate) object_target: Option<PathBuf>,
    pub(crate) pdb_file: Option<PathBuf>,
    pub(crate) cli_include_dirs: Vec<PathBuf>,
    pub(crate) is_linking: bool,
    pub(crate) uses_precompiled_headers: bool,
    pub(crate) generates_pdb: bool,
    pub(crate) response_file: Option<PathBuf>,
    pub(crate) compiler_exe: PathBuf,
    pub(crate) working_dir: PathBuf,
}

impl CompilationRequest {
    pub(crate) fn new(command_line: Vec<String>, compiler_exe: PathBuf, working_dir: PathBuf) -> Self {
        Self {
            command_line,
            source_files: Vec::new(),
            object_target: None,
            pdb_file: None,
            cli_include_dirs: Vec::new(),
            is_linking: false,
            uses_precompiled_headers: false,
            generates_pdb: false,
            response_file: None,
            compiler_exe,
            working_dir,
        }
    }

    /// Tokens after response-file expansion
    pub fn command_line(&self) -> &[String] {
        &self.command_line
    }

    /// Source files, as written on the command line
    pub fn source_files(&self) -> &[String] {
        &self.source_files
    }

    /// The one source file, when there is exactly one
    pub fn single_source_file(&self) -> Option<&str> {
        match self.source_files.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    pub fn object_target(&self) -> Option<&Path> {
        self.object_target.as_deref()
    }

    pub fn pdb_file(&self) -> Option<&Path> {
        self.pdb_file.as_deref()
    }

    /// Include directories given with `/I`, resolved and known to exist
    pub fn cli_include_dirs(&self) -> &[PathBuf] {
        &self.cli_include_dirs
    }

    pub fn is_linking(&self) -> bool {
        self.is_linking
    }

    pub fn uses_precompiled_headers(&self) -> bool {
        self.uses_precompiled_headers
    }

    pub fn generates_pdb(&self) -> bool {
        self.generates_pdb
    }

    pub fn response_file(&self) -> Option<&Path> {
        self.response_file.as_deref()
    }

    pub fn compiler_exe(&self) -> &Path {
        &self.compiler_exe
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Absolute path of a source file as the compiler will see it
    pub fn source_path(&self, source: &str) -> PathBuf {
        self.working_dir.join(source)
    }

    /// Check every cacheability precondition against the current fields.
    pub fn cacheability(&self) -> Result<(), UnsupportedReason> {
        if self.is_linking {
            return Err(UnsupportedReason::Linking);
        }
        if self.uses_precompiled_headers {
            return Err(UnsupportedReason::PrecompiledHeaders);
        }
        let source = match self.source_files.len() {
            0 => return Err(UnsupportedReason::NoSource),
            1 => &self.source_files[0],
            n => return Err(UnsupportedReason::MultipleSources(n)),
        };
        if source.trim().is_empty() {
            return Err(UnsupportedReason::NoSource);
        }
        match &self.object_target {
            Some(target) if !target.as_os_str().is_empty() => {}
            _ => return Err(UnsupportedReason::NoObjectTarget),
        }
        if !self.source_path(source).is_file() {
            return Err(UnsupportedReason::MissingSource(source.clone()));
        }
        Ok(())
    }

    pub fn is_cacheable(&self) -> bool {
        self.cacheability().is_ok()
    }
}

/// A request together with its verdict
#[derive(Debug, Clone, Serialize)]
pub struct Interpretation {
    pub request: CompilationRequest,
    #[serde(flatten)]
    pub verdict: Verdict,
}

impl Interpretation {
    pub fn is_supported(&self) -> bool {
        self.verdict == Verdict::Supported
    }

    /// Reason the invocation is not cacheable, if any
    pub fn unsupported_reason(&self) -> Option<&UnsupportedReason> {
        match &self.verdict {
            Verdict::Supported => None,
            Verdict::Unsupported(reason) => Some(reason),
        }
    }
}
