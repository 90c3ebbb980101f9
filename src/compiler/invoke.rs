//! Running the real compiler
//!
//! The compiler runs as a child process with stdout and stderr piped, or
//! inherited for a plain pass-through. Piped streams are read concurrently so
//! a chatty stderr cannot stall stdout (or the other way round). With include
//! capture on, `/showIncludes` is added and its dependency notes are pulled
//! out of stdout before the caller sees it.

use super::includes::{parse_include_note, IncludeSet};
use crate::args::{join_arguments, normalize_for_shell};
use crate::error::{ClashError, ClashResult};
use crate::platform::EnvMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::debug;

/// Asks the compiler to print a dependency note per included file
pub const SHOW_INCLUDES_FLAG: &str = "/showIncludes";

/// Preprocess to stdout without `#line` directives
pub const PREPROCESS_FLAG: &str = "/EP";

const PATH_SEPARATOR: char = if cfg!(windows) { ';' } else { ':' };

/// A validated real compiler plus the environment it runs in
#[derive(Debug, Clone)]
pub struct RealCompiler {
    exe: PathBuf,
    env: EnvMap,
    working_dir: PathBuf,
}

impl RealCompiler {
    /// Fails with [`ClashError::CompilerNotFound`] if `exe` is not a file.
    pub fn new(
        exe: impl Into<PathBuf>,
        env: EnvMap,
        working_dir: impl Into<PathBuf>,
    ) -> ClashResult<Self> {
        let exe = exe.into();
        if !exe.is_file() {
            return Err(ClashError::CompilerNotFound(exe));
        }
        debug!("real compiler is: {}", exe.display());
        Ok(Self {
            exe,
            env,
            working_dir: working_dir.into(),
        })
    }

    pub fn exe(&self) -> &Path {
        &self.exe
    }

    /// The single command-line string handed to the compiler.
    pub fn command_line<S: AsRef<str>>(&self, args: &[S], show_includes: bool) -> String {
        let mut line = join_arguments(&normalize_for_shell(args));
        if show_includes {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(SHOW_INCLUDES_FLAG);
        }
        line
    }

    /// Environment for the child: ours, with the compiler's directory first on `PATH`.
    fn child_env(&self) -> EnvMap {
        let mut env = self.env.clone();
        let Some(dir) = self.exe.parent() else {
            return env;
        };

        let key = env
            .keys()
            .find(|k| k.eq_ignore_ascii_case("PATH"))
            .cloned()
            .unwrap_or_else(|| "PATH".to_string());
        let value = match env.get(&key) {
            Some(existing) if !existing.is_empty() => {
                format!("{}{}{}", dir.display(), PATH_SEPARATOR, existing)
            }
            _ => dir.display().to_string(),
        };
        env.insert(key, value);
        env
    }

    /// Run the compiler and wait for it to exit.
    ///
    /// Every stderr line goes to `on_stderr`. Stdout lines go to `on_stdout`,
    /// except dependency notes when `includes` is given: those are added to
    /// the set instead. Returns the compiler's exit code untouched, or `-1`
    /// if the platform reports none (killed by a signal).
    pub async fn invoke<S, E, O>(
        &self,
        args: &[S],
        on_stderr: E,
        on_stdout: O,
        includes: Option<&mut IncludeSet>,
    ) -> ClashResult<i32>
    where
        S: AsRef<str>,
        E: FnMut(&str),
        O: FnMut(&str),
    {
        if !self.exe.is_file() {
            return Err(ClashError::CompilerNotFound(self.exe.clone()));
        }

        let line = self.command_line(args, includes.is_some());
        debug!("invoking real compiler: {} {}", self.exe.display(), line);

        let mut child = self
            .command(&line)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ClashError::command_failed(self.exe.display().to_string(), e))?;

        let stdout = child.stdout.take().ok_or_else(|| {
            ClashError::io("capturing compiler stdout", std::io::ErrorKind::BrokenPipe.into())
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            ClashError::io("capturing compiler stderr", std::io::ErrorKind::BrokenPipe.into())
        })?;

        pump_output(stdout, stderr, on_stdout, on_stderr, includes, &self.working_dir).await;

        let status = child
            .wait()
            .await
            .map_err(|e| ClashError::io("waiting for compiler", e))?;
        debug!("compiler exited: {}", status);

        Ok(status.code().unwrap_or(-1))
    }

    /// Run the compiler on our own stdout and stderr and wait for it to exit.
    ///
    /// Output reaches the caller byte for byte, in whatever code page the
    /// compiler printed it. The exit code is reported as by [`Self::invoke`].
    pub async fn passthrough<S: AsRef<str>>(&self, args: &[S]) -> ClashResult<i32> {
        if !self.exe.is_file() {
            return Err(ClashError::CompilerNotFound(self.exe.clone()));
        }

        let line = self.command_line(args, false);
        debug!("passing through to real compiler: {} {}", self.exe.display(), line);

        let status = self
            .command(&line)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| ClashError::command_failed(self.exe.display().to_string(), e))?;
        debug!("compiler exited: {}", status);

        Ok(status.code().unwrap_or(-1))
    }

    /// A child command for `line` in our working directory and environment.
    fn command(&self, line: &str) -> Command {
        let mut command = Command::new(&self.exe);
        #[cfg(windows)]
        command.raw_arg(line);
        #[cfg(not(windows))]
        command.args(crate::args::split_command_line(line));

        command
            .current_dir(&self.working_dir)
            .env_clear()
            .envs(self.child_env());
        command
    }

    /// Run the preprocessor only, streaming the expanded source to `on_stdout`.
    pub async fn preprocess<S, O>(&self, args: &[S], on_stdout: O) -> ClashResult<i32>
    where
        S: AsRef<str>,
        O: FnMut(&str),
    {
        self.invoke(&preprocess_args(args), |_| {}, on_stdout, None)
            .await
    }
}

/// `/EP` followed by the arguments without any compile-only flag.
pub fn preprocess_args<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    std::iter::once(PREPROCESS_FLAG.to_string())
        .chain(
            args.iter()
                .map(|a| a.as_ref())
                .filter(|a| *a != "/c" && *a != "-c")
                .map(str::to_string),
        )
        .collect()
}

/// Drain both streams concurrently until each reaches end of file.
pub(crate) async fn pump_output<R, W, O, E>(
    stdout: R,
    stderr: W,
    mut on_stdout: O,
    on_stderr: E,
    mut includes: Option<&mut IncludeSet>,
    base: &Path,
) where
    R: AsyncRead + Unpin,
    W: AsyncRead + Unpin,
    O: FnMut(&str),
    E: FnMut(&str),
{
    let stdout_done = read_lines(stdout, |line| {
        if let Some(set) = includes.as_deref_mut() {
            if let Some(file) = parse_include_note(line) {
                set.insert_from(base, file);
                return;
            }
        }
        on_stdout(line);
    });
    let stderr_done = read_lines(stderr, on_stderr);

    tokio::join!(stdout_done, stderr_done);
}

/// Feed each line to `on_line` without its line terminator.
///
/// Output that is not valid UTF-8 (compilers often print in the console code
/// page) is converted lossily rather than ending the stream.
async fn read_lines<R, F>(reader: R, mut on_line: F)
where
    R: AsyncRead + Unpin,
    F: FnMut(&str),
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                on_line(line.trim_end_matches(['\r', '\n']));
            }
            Err(e) => {
                debug!("stopped reading compiler output: {}", e);
                break;
            }
        }
    }
}
