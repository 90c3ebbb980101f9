//! Command-line interpretation
//!
//! Walks the raw argument list with a cursor and dispatches every token to
//! the first matching rule in [`RULES`]. Rules either record something on the
//! request, restart the scan (response files) or stop it with a reason the
//! invocation cannot be cached.

use super::request::{CompilationRequest, Interpretation, UnsupportedReason, Verdict};
use super::response::{self, Expansion};
use crate::error::ClashResult;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Response files may reference other response files up to this depth.
const MAX_RESPONSE_NESTING: usize = 8;

/// Compiler versions tried, newest first, when a default PDB name is needed.
const PDB_VERSIONS: std::ops::RangeInclusive<u32> = 9..=14;

/// Environment the command line is interpreted in
#[derive(Debug, Clone)]
pub struct InterpretContext {
    /// Directory relative paths are resolved against
    pub working_dir: PathBuf,
    /// Absolute path of the real compiler
    pub compiler_exe: PathBuf,
}

/// Turns raw compiler arguments into a [`CompilationRequest`] and a verdict.
pub struct Interpreter {
    ctx: InterpretContext,
}

impl Interpreter {
    pub fn new(ctx: InterpretContext) -> Self {
        Self { ctx }
    }

    /// Interpret a command line. Never fails: anything unexpected downgrades
    /// the verdict to unsupported.
    pub fn interpret<S: AsRef<str>>(&self, raw: &[S]) -> Interpretation {
        let tokens: Vec<String> = raw.iter().map(|s| s.as_ref().to_string()).collect();
        let mut scan = Scan::new(self.ctx.clone(), tokens);

        let verdict = match scan.run() {
            Ok(None) => match scan.request.cacheability() {
                Ok(()) => Verdict::Supported,
                Err(reason) => Verdict::Unsupported(reason),
            },
            Ok(Some(reason)) => Verdict::Unsupported(reason),
            Err(e) => {
                warn!("failed to interpret command line: {}", e);
                Verdict::Unsupported(UnsupportedReason::ParseFailure(e.to_string()))
            }
        };

        match &verdict {
            Verdict::Supported => info!("cacheable invocation"),
            Verdict::Unsupported(reason) => info!("unsupported invocation: {}", reason),
        }

        Interpretation {
            request: scan.request,
            verdict,
        }
    }
}

/// A token with its two normalized forms
#[derive(Debug)]
struct Token {
    /// `/` plus at most two characters, used for dispatch
    code: String,
    /// The whole token with quotes trimmed and the leading `-` turned into `/`
    full: String,
}

impl Token {
    fn classify(raw: &str) -> Self {
        Self {
            code: option_code(raw),
            full: full_option(raw),
        }
    }

    fn is_flag(&self) -> bool {
        self.full.starts_with('/')
    }
}

fn option_code(arg: &str) -> String {
    match arg.strip_prefix(['-', '/']) {
        Some(rest) => std::iter::once('/').chain(rest.chars().take(2)).collect(),
        None => arg.to_string(),
    }
}

fn full_option(arg: &str) -> String {
    let arg = arg.trim_matches(['"', '\'']);
    match arg.strip_prefix(['-', '/']) {
        Some(rest) => format!("/{}", rest),
        None => arg.to_string(),
    }
}

/// Explicit position over the token list
struct Cursor {
    tokens: Vec<String>,
    pos: usize,
}

impl Cursor {
    fn new(tokens: Vec<String>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn advance(&mut self) -> Option<String> {
        let token = self.tokens.get(self.pos).cloned()?;
        self.pos += 1;
        Some(token)
    }

    /// Take the token after the current one as a flag value.
    fn consume_next(&mut self) -> Option<String> {
        self.advance()
    }

    fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether `/c` or `-c` appears anywhere on the line.
    fn compile_only(&self) -> bool {
        self.tokens.iter().any(|t| t == "/c" || t == "-c")
    }
}

/// What the scan does after a rule ran
enum Step {
    Next,
    Restart(Vec<String>),
    Stop(UnsupportedReason),
}

impl Step {
    fn missing(token: &Token) -> Self {
        Step::Stop(UnsupportedReason::MissingValue(token.code.clone()))
    }
}

struct Rule {
    name: &'static str,
    matches: fn(&Token) -> bool,
    apply: fn(&mut Scan, &Token) -> ClashResult<Step>,
}

/// Evaluated top to bottom; the first match handles the token.
const RULES: &[Rule] = &[
    Rule {
        name: "foreign-output",
        matches: |t| t.code == "/o",
        apply: |_, _| Ok(Step::Stop(UnsupportedReason::ForeignOutput)),
    },
    Rule {
        name: "define",
        matches: |t| t.code == "/D",
        apply: Scan::define,
    },
    Rule {
        name: "object-output",
        matches: |t| t.code == "/Fo",
        apply: Scan::object_output,
    },
    Rule {
        name: "pdb-output",
        matches: |t| t.code == "/Fd",
        apply: Scan::pdb_output,
    },
    Rule {
        name: "explicit-source",
        matches: |t| t.code == "/Tc" || t.code == "/Tp",
        apply: Scan::explicit_source,
    },
    Rule {
        name: "debug-pdb",
        matches: |t| t.code == "/Zi",
        apply: |scan, _| {
            scan.request.generates_pdb = true;
            Ok(Step::Next)
        },
    },
    Rule {
        name: "debug-embedded",
        matches: |t| t.code == "/Z7",
        apply: |scan, _| {
            scan.request.generates_pdb = false;
            Ok(Step::Next)
        },
    },
    Rule {
        name: "precompiled-header",
        matches: |t| t.code == "/Yu" || t.code == "/Yc",
        apply: |scan, _| {
            scan.request.uses_precompiled_headers = true;
            Ok(Step::Stop(UnsupportedReason::PrecompiledHeaders))
        },
    },
    Rule {
        name: "forced-include",
        matches: |t| t.code == "/FI",
        apply: |_, _| Ok(Step::Stop(UnsupportedReason::ForcedInclude)),
    },
    Rule {
        name: "preprocess-only",
        matches: |t| matches!(t.full.as_str(), "/E" | "/EP" | "/P"),
        apply: |_, _| Ok(Step::Stop(UnsupportedReason::PreprocessOnly)),
    },
    Rule {
        name: "link",
        // `/LD` only selects the DLL runtime when `/c` skips the link step.
        matches: |t| t.full == "/link" || t.code == "/LD",
        apply: |scan, token| {
            if token.code == "/LD" && scan.cursor.compile_only() {
                debug!("'{}' ignored for a compile-only call", token.full);
                return Ok(Step::Next);
            }
            scan.request.is_linking = true;
            Ok(Step::Stop(UnsupportedReason::Linking))
        },
    },
    Rule {
        name: "response-file",
        matches: |t| t.full.starts_with('@'),
        apply: Scan::response_file,
    },
    Rule {
        name: "include-dir",
        matches: |t| t.full.starts_with("/I"),
        apply: Scan::include_dir,
    },
    Rule {
        name: "implicit-source",
        matches: |t| !t.is_flag(),
        apply: Scan::implicit_source,
    },
];

/// Where an output flag points
enum OutputPath {
    File(PathBuf),
    Directory(PathBuf),
}

/// Mutable state of one interpretation
struct Scan {
    ctx: InterpretContext,
    cursor: Cursor,
    request: CompilationRequest,
    object_dir: Option<PathBuf>,
    pdb_dir: Option<PathBuf>,
    nesting: usize,
}

impl Scan {
    fn new(ctx: InterpretContext, tokens: Vec<String>) -> Self {
        Self {
            request: CompilationRequest::new(
                tokens.clone(),
                ctx.compiler_exe.clone(),
                ctx.working_dir.clone(),
            ),
            ctx,
            cursor: Cursor::new(tokens),
            object_dir: None,
            pdb_dir: None,
            nesting: 0,
        }
    }

    /// Returns the reason the scan stopped early, if it did.
    fn run(&mut self) -> ClashResult<Option<UnsupportedReason>> {
        while let Some(raw) = self.cursor.advance() {
            debug!("process arg '{}'", raw);
            let token = Token::classify(&raw);

            let Some(rule) = RULES.iter().find(|rule| (rule.matches)(&token)) else {
                continue;
            };

            match (rule.apply)(self, &token)? {
                Step::Next => {}
                Step::Restart(tokens) => {
                    self.request.command_line = tokens.clone();
                    self.cursor = Cursor::new(tokens);
                }
                Step::Stop(reason) => {
                    debug!("rule {} stopped the scan at '{}'", rule.name, raw);
                    return Ok(Some(reason));
                }
            }
        }

        Ok(self.finish())
    }

    /// Fill in outputs the command line left implicit.
    fn finish(&mut self) -> Option<UnsupportedReason> {
        let source = self.request.single_source_file()?.to_string();

        if self.request.object_target.is_none() {
            let dir = self.object_dir.as_deref().unwrap_or(&self.ctx.working_dir);
            self.request.object_target = Some(dir.join(format!("{}.obj", file_stem(&source))));
        }

        if self.request.generates_pdb && self.request.pdb_file.is_none() {
            match default_pdb_name(&self.ctx.compiler_exe) {
                Some(name) => {
                    let dir = self.pdb_dir.as_deref().unwrap_or(&self.ctx.working_dir);
                    self.request.pdb_file = Some(dir.join(name));
                }
                None => {
                    debug!("could not work out compiler version for auto generated pdb");
                    return Some(UnsupportedReason::UnknownPdbName);
                }
            }
        }

        None
    }

    /// Value attached to a flag, or the next token when the flag stands alone.
    fn flag_value(&mut self, token: &Token, flag_len: usize) -> Option<String> {
        if token.full.len() > flag_len {
            return Some(token.full[flag_len..].to_string());
        }
        self.cursor
            .consume_next()
            .map(|next| next.trim_matches(['"', '\'']).to_string())
    }

    fn resolve_output(&self, value: &str, extension: &str) -> OutputPath {
        let path = self.ctx.working_dir.join(value);
        if value.ends_with(['/', '\\']) {
            return OutputPath::Directory(path);
        }
        if file_name(value).contains('.') {
            OutputPath::File(path)
        } else {
            let mut with_ext = path.into_os_string();
            with_ext.push(extension);
            OutputPath::File(PathBuf::from(with_ext))
        }
    }

    fn define(&mut self, token: &Token) -> ClashResult<Step> {
        if token.full == "/D" && self.cursor.consume_next().is_none() {
            return Ok(Step::missing(token));
        }
        Ok(Step::Next)
    }

    fn object_output(&mut self, token: &Token) -> ClashResult<Step> {
        let Some(value) = self.flag_value(token, 3) else {
            return Ok(Step::missing(token));
        };
        match self.resolve_output(&value, ".obj") {
            OutputPath::File(path) => self.request.object_target = Some(path),
            OutputPath::Directory(dir) => self.object_dir = Some(dir),
        }
        Ok(Step::Next)
    }

    fn pdb_output(&mut self, token: &Token) -> ClashResult<Step> {
        let Some(value) = self.flag_value(token, 3) else {
            return Ok(Step::missing(token));
        };
        match self.resolve_output(&value, ".pdb") {
            OutputPath::File(path) => self.request.pdb_file = Some(path),
            OutputPath::Directory(dir) => self.pdb_dir = Some(dir),
        }
        Ok(Step::Next)
    }

    fn explicit_source(&mut self, token: &Token) -> ClashResult<Step> {
        let Some(source) = self.flag_value(token, 3) else {
            return Ok(Step::missing(token));
        };
        if self.ctx.working_dir.join(&source).is_file() {
            self.request.source_files.push(source);
            Ok(Step::Next)
        } else {
            Ok(Step::Stop(UnsupportedReason::MissingSource(source)))
        }
    }

    fn response_file(&mut self, token: &Token) -> ClashResult<Step> {
        if self.nesting >= MAX_RESPONSE_NESTING {
            return Ok(Step::Stop(UnsupportedReason::ResponseFileNesting));
        }

        let sole = self.cursor.len() == 1;
        match response::expand(&token.full[1..], &self.ctx.working_dir, sole)? {
            Expansion::Expanded { path, tokens } => {
                self.request.response_file.get_or_insert(path);
                self.nesting += 1;
                Ok(Step::Restart(tokens))
            }
            Expansion::TooLarge { path, .. } => {
                self.request.response_file.get_or_insert(path);
                Ok(Step::Stop(UnsupportedReason::ResponseFileTooLarge))
            }
            Expansion::NotSole { path } => {
                self.request.response_file.get_or_insert(path);
                Ok(Step::Stop(UnsupportedReason::ResponseFileNotSole))
            }
        }
    }

    fn include_dir(&mut self, token: &Token) -> ClashResult<Step> {
        let Some(value) = self.flag_value(token, 2) else {
            return Ok(Step::missing(token));
        };

        let working_dir = &self.ctx.working_dir;
        let dir = match value.as_str() {
            "." => working_dir.clone(),
            ".." => working_dir
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| working_dir.clone()),
            other => working_dir.join(other),
        };

        if dir.is_dir() {
            debug!("cli include '{}' => {}", token.full, dir.display());
            self.request.cli_include_dirs.push(dir);
        } else {
            debug!("ignoring missing include dir {}", dir.display());
        }
        Ok(Step::Next)
    }

    fn implicit_source(&mut self, token: &Token) -> ClashResult<Step> {
        if !token.full.is_empty() && self.ctx.working_dir.join(&token.full).is_file() {
            self.request.source_files.push(token.full.clone());
        }
        Ok(Step::Next)
    }
}

/// Last path component, accepting both separators.
fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// File name without its final extension.
fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Default PDB name derived from the Visual Studio version in the compiler path.
pub fn default_pdb_name(compiler_exe: &Path) -> Option<String> {
    let exe = compiler_exe.to_string_lossy();
    PDB_VERSIONS
        .rev()
        .find(|v| exe.contains(&format!("Microsoft Visual Studio {}.0", v)))
        .map(|v| format!("vc{}0.pdb", v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const VS14_CL: &str = r"C:\Program Files (x86)\Microsoft Visual Studio 14.0\VC\bin\cl.exe";

    fn setup(files: &[&str]) -> (TempDir, Interpreter) {
        let dir = TempDir::new().unwrap();
        for f in files {
            fs::write(dir.path().join(f), "int main(void) { return 0; }\n").unwrap();
        }
        let interpreter = Interpreter::new(InterpretContext {
            working_dir: dir.path().to_path_buf(),
            compiler_exe: PathBuf::from(VS14_CL),
        });
        (dir, interpreter)
    }

    #[test]
    fn option_code_normalization() {
        assert_eq!(option_code("-Fofoo.obj"), "/Fo");
        assert_eq!(option_code("/c"), "/c");
        assert_eq!(option_code("a.c"), "a.c");
        assert_eq!(full_option("\"-IC:\\inc\""), "/IC:\\inc");
        assert_eq!(full_option("'@args.rsp'"), "@args.rsp");
    }

    #[test]
    fn separate_object_target() {
        let (dir, interpreter) = setup(&["a.c"]);
        let result = interpreter.interpret(&["/c", "/Fo", "out.obj", "a.c"]);

        assert!(result.is_supported());
        assert_eq!(result.request.source_files(), ["a.c"]);
        assert_eq!(
            result.request.object_target(),
            Some(dir.path().join("out.obj").as_path())
        );
    }

    #[test]
    fn attached_object_target_gets_extension() {
        let (dir, interpreter) = setup(&["a.c"]);
        let result = interpreter.interpret(&["/c", "-Fobuild", "a.c"]);

        assert!(result.is_supported());
        assert_eq!(
            result.request.object_target(),
            Some(dir.path().join("build.obj").as_path())
        );
    }

    #[test]
    fn object_target_synthesized_from_source() {
        let (dir, interpreter) = setup(&["main.cpp"]);
        let result = interpreter.interpret(&["/c", "/nologo", "main.cpp"]);

        assert!(result.is_supported());
        assert_eq!(
            result.request.object_target(),
            Some(dir.path().join("main.obj").as_path())
        );
    }

    #[test]
    fn object_directory_uses_source_stem() {
        let (dir, interpreter) = setup(&["main.cpp"]);
        fs::create_dir(dir.path().join("obj")).unwrap();
        let result = interpreter.interpret(&["/c", "/Foobj\\", "main.cpp"]);

        assert!(result.is_supported());
        let target = result.request.object_target().unwrap();
        assert!(target.to_string_lossy().ends_with("main.obj"));
        assert!(target.starts_with(dir.path()));
    }

    #[test]
    fn explicit_missing_source_fails_fast() {
        let (_dir, interpreter) = setup(&["a.c"]);
        let result = interpreter.interpret(&["/c", "/Tcmissing.c", "a.c"]);

        assert_eq!(
            result.unsupported_reason(),
            Some(&UnsupportedReason::MissingSource("missing.c".to_string()))
        );
    }

    #[test]
    fn explicit_source_accepted() {
        let (_dir, interpreter) = setup(&["a.cxx"]);
        let result = interpreter.interpret(&["/c", "/Tpa.cxx"]);
        assert!(result.is_supported());
        assert_eq!(result.request.source_files(), ["a.cxx"]);
    }

    #[test]
    fn immediately_unsupported_flags() {
        let cases = [
            ("/Yustdafx.h", UnsupportedReason::PrecompiledHeaders),
            ("/Ycstdafx.h", UnsupportedReason::PrecompiledHeaders),
            ("/FIforced.h", UnsupportedReason::ForcedInclude),
            ("/E", UnsupportedReason::PreprocessOnly),
            ("-EP", UnsupportedReason::PreprocessOnly),
            ("/P", UnsupportedReason::PreprocessOnly),
            ("/link", UnsupportedReason::Linking),
            ("-o", UnsupportedReason::ForeignOutput),
        ];
        for (flag, reason) in cases {
            let (_dir, interpreter) = setup(&["a.c"]);
            let result = interpreter.interpret(&["/c", "a.c", flag]);
            assert_eq!(result.unsupported_reason(), Some(&reason), "flag {}", flag);
        }
    }

    #[test]
    fn dll_flag_links_only_without_compile_only() {
        let (_dir, interpreter) = setup(&["a.c"]);

        let dll = interpreter.interpret(&["/LD", "a.c"]);
        assert_eq!(dll.unsupported_reason(), Some(&UnsupportedReason::Linking));
        assert!(dll.request.is_linking());

        for line in [["/c", "/LD", "a.c"], ["/LDd", "a.c", "-c"]] {
            let compiled = interpreter.interpret(&line);
            assert!(compiled.is_supported(), "{:?}", line);
            assert!(!compiled.request.is_linking());
        }
    }

    #[test]
    fn exception_handling_flag_is_not_preprocess() {
        let (_dir, interpreter) = setup(&["a.cpp"]);
        let result = interpreter.interpret(&["/c", "/EHsc", "a.cpp"]);
        assert!(result.is_supported());
    }

    #[test]
    fn linking_and_pch_set_flags() {
        let (_dir, interpreter) = setup(&["a.c"]);
        let linked = interpreter.interpret(&["a.c", "/link", "/OUT:a.exe"]);
        assert!(linked.request.is_linking());

        let pch = interpreter.interpret(&["/c", "/Yupch.h", "a.c"]);
        assert!(pch.request.uses_precompiled_headers());
    }

    #[test]
    fn multiple_sources_unsupported() {
        let (_dir, interpreter) = setup(&["a.c", "b.c"]);
        let result = interpreter.interpret(&["/c", "a.c", "b.c"]);
        assert_eq!(
            result.unsupported_reason(),
            Some(&UnsupportedReason::MultipleSources(2))
        );
        assert!(result.request.object_target().is_none());
    }

    #[test]
    fn no_source_unsupported() {
        let (_dir, interpreter) = setup(&[]);
        let result = interpreter.interpret(&["/c", "missing.c"]);
        assert_eq!(result.unsupported_reason(), Some(&UnsupportedReason::NoSource));
    }

    #[test]
    fn split_define_skips_value() {
        let (_dir, interpreter) = setup(&["a.c", "FOO"]);
        // "FOO" exists on disk but is consumed as the macro value, not a source
        let result = interpreter.interpret(&["/c", "/D", "FOO", "a.c"]);
        assert!(result.is_supported());
        assert_eq!(result.request.source_files(), ["a.c"]);
    }

    #[test]
    fn trailing_flag_without_value_is_unsupported() {
        let (_dir, interpreter) = setup(&["a.c"]);
        let result = interpreter.interpret(&["/c", "a.c", "/I"]);
        assert_eq!(
            result.unsupported_reason(),
            Some(&UnsupportedReason::MissingValue("/I".to_string()))
        );
    }

    #[test]
    fn include_dirs_resolved() {
        let (dir, interpreter) = setup(&["a.c"]);
        fs::create_dir(dir.path().join("inc")).unwrap();

        let result = interpreter.interpret(&["/c", "/Iinc", "/I", ".", "/I..", "/Imissing", "a.c"]);

        assert!(result.is_supported());
        assert_eq!(
            result.request.cli_include_dirs(),
            [
                dir.path().join("inc"),
                dir.path().to_path_buf(),
                dir.path().parent().unwrap().to_path_buf(),
            ]
        );
    }

    #[test]
    fn pdb_explicit_gets_extension() {
        let (dir, interpreter) = setup(&["a.c"]);
        let result = interpreter.interpret(&["/c", "/Zi", "/Fdsymbols", "a.c"]);
        assert!(result.is_supported());
        assert!(result.request.generates_pdb());
        assert_eq!(
            result.request.pdb_file(),
            Some(dir.path().join("symbols.pdb").as_path())
        );
    }

    #[test]
    fn pdb_default_name_from_compiler_version() {
        let (dir, interpreter) = setup(&["a.c"]);
        let result = interpreter.interpret(&["/c", "/Zi", "a.c"]);
        assert!(result.is_supported());
        assert_eq!(
            result.request.pdb_file(),
            Some(dir.path().join("vc140.pdb").as_path())
        );
    }

    #[test]
    fn pdb_default_name_unknown_compiler() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.c"), "").unwrap();
        let interpreter = Interpreter::new(InterpretContext {
            working_dir: dir.path().to_path_buf(),
            compiler_exe: PathBuf::from(r"C:\tools\msvc\2022\bin\cl.exe"),
        });

        let result = interpreter.interpret(&["/c", "/Zi", "a.c"]);
        assert_eq!(
            result.unsupported_reason(),
            Some(&UnsupportedReason::UnknownPdbName)
        );

        let embedded = interpreter.interpret(&["/c", "/Zi", "/Z7", "a.c"]);
        assert!(embedded.is_supported());
        assert!(!embedded.request.generates_pdb());
    }

    #[test]
    fn default_pdb_name_versions() {
        assert_eq!(
            default_pdb_name(Path::new(r"C:\Microsoft Visual Studio 9.0\VC\bin\cl.exe")),
            Some("vc90.pdb".to_string())
        );
        assert_eq!(
            default_pdb_name(Path::new(r"C:\Microsoft Visual Studio 12.0\VC\bin\cl.exe")),
            Some("vc120.pdb".to_string())
        );
        assert_eq!(
            default_pdb_name(Path::new(r"C:\Microsoft Visual Studio 8.0\VC\bin\cl.exe")),
            None
        );
    }

    #[test]
    fn response_file_expands_and_restarts() {
        let (dir, interpreter) = setup(&["a.c"]);
        fs::write(dir.path().join("cl.rsp"), "/c /Fo\"out dir.obj\" a.c").unwrap();

        let result = interpreter.interpret(&["@cl.rsp"]);

        assert!(result.is_supported());
        assert_eq!(result.request.command_line(), ["/c", "/Foout dir.obj", "a.c"]);
        assert_eq!(
            result.request.response_file(),
            Some(dir.path().join("cl.rsp").as_path())
        );
        assert_eq!(
            result.request.object_target(),
            Some(dir.path().join("out dir.obj").as_path())
        );
    }

    #[test]
    fn response_file_with_byte_order_mark() {
        let (dir, interpreter) = setup(&["a.c"]);
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend("a.c /c".encode_utf16().flat_map(u16::to_le_bytes));
        fs::write(dir.path().join("utf16.rsp"), bytes).unwrap();
        fs::write(dir.path().join("utf8.rsp"), "\u{feff}a.c /c").unwrap();

        for name in ["@utf16.rsp", "@utf8.rsp"] {
            let result = interpreter.interpret(&[name]);
            assert!(result.is_supported(), "{}: {:?}", name, result.verdict);
            assert_eq!(result.request.source_files(), ["a.c"]);
        }
    }

    #[test]
    fn nested_response_file() {
        let (dir, interpreter) = setup(&["a.c"]);
        fs::write(dir.path().join("outer.rsp"), "@inner.rsp").unwrap();
        fs::write(dir.path().join("inner.rsp"), "/c a.c").unwrap();

        let result = interpreter.interpret(&["@outer.rsp"]);
        assert!(result.is_supported());
        assert_eq!(result.request.command_line(), ["/c", "a.c"]);
    }

    #[test]
    fn self_referencing_response_file_stops() {
        let (dir, interpreter) = setup(&[]);
        fs::write(dir.path().join("loop.rsp"), "@loop.rsp").unwrap();

        let result = interpreter.interpret(&["@loop.rsp"]);
        assert_eq!(
            result.unsupported_reason(),
            Some(&UnsupportedReason::ResponseFileNesting)
        );
    }

    #[test]
    fn response_file_with_siblings_refused() {
        let (dir, interpreter) = setup(&["a.c"]);
        fs::write(dir.path().join("cl.rsp"), "a.c").unwrap();

        let result = interpreter.interpret(&["/c", "@cl.rsp"]);
        assert_eq!(
            result.unsupported_reason(),
            Some(&UnsupportedReason::ResponseFileNotSole)
        );
    }

    #[test]
    fn unreadable_response_file_is_parse_failure() {
        let (_dir, interpreter) = setup(&[]);
        let result = interpreter.interpret(&["@nowhere.rsp"]);
        assert!(matches!(
            result.unsupported_reason(),
            Some(UnsupportedReason::ParseFailure(_))
        ));
    }

    #[test]
    fn file_helpers() {
        assert_eq!(file_stem(r"src\main.cpp"), "main");
        assert_eq!(file_stem("lib/a.b.c"), "a.b");
        assert_eq!(file_stem(".hidden"), ".hidden");
        assert_eq!(file_name("dir/sub"), "sub");
    }
}
