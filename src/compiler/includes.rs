//! Included-file discovery
//!
//! Includes are learned either from the compiler's `/showIncludes` notes or
//! from `#line` directives in preprocessed output. The resulting set feeds
//! cache-key computation, together with the list of files whose creation
//! would change how an include resolves.

use crate::args::CompilationRequest;
use crate::platform::{lookup, EnvMap};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// Prefix of the dependency notes printed under `/showIncludes`
pub const INCLUDE_NOTE_PREFIX: &str = "Note: including file:";

static LINE_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"#line\s+\d+\s+"([^"]+)""#).expect("line directive pattern is valid")
});

/// De-duplicated set of absolute include paths
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IncludeSet {
    files: BTreeSet<PathBuf>,
}

impl IncludeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path, resolving it against `base` unless it is already absolute.
    pub fn insert_from(&mut self, base: &Path, file: &str) -> bool {
        let path = if is_absolute_like(file) {
            PathBuf::from(file)
        } else {
            base.join(file)
        };
        self.files.insert(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.iter()
    }
}

impl<'a> IntoIterator for &'a IncludeSet {
    type Item = &'a PathBuf;
    type IntoIter = std::collections::btree_set::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// True for host-absolute paths and for Windows drive or UNC paths on any host.
fn is_absolute_like(file: &str) -> bool {
    let bytes = file.as_bytes();
    Path::new(file).is_absolute()
        || file.starts_with("\\\\")
        || (bytes.len() >= 3
            && bytes[0].is_ascii_alphabetic()
            && bytes[1] == b':'
            && matches!(bytes[2], b'\\' | b'/'))
}

/// Extract the file named by a dependency note, if `line` is one.
pub fn parse_include_note(line: &str) -> Option<&str> {
    line.strip_prefix(INCLUDE_NOTE_PREFIX)
        .map(str::trim_start)
        .filter(|file| !file.is_empty())
}

/// Collect the files named by `#line N "file"` directives in preprocessed text.
pub fn scan_line_directives(text: &str, base: &Path) -> IncludeSet {
    let mut set = IncludeSet::new();
    for caps in LINE_DIRECTIVE.captures_iter(text) {
        let file = caps[1].replace("\\\\", "\\");
        set.insert_from(base, &file);
    }
    set
}

/// Directories the compiler searches, in order: `/I` dirs, `INCLUDE`
/// entries, then the directory of the source file.
pub fn used_include_dirs(request: &CompilationRequest, env: &EnvMap) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = request.cli_include_dirs().to_vec();

    if let Some(include) = lookup(env, "INCLUDE") {
        debug!("INCLUDE={}", include);
        dirs.extend(
            include
                .split(';')
                .filter(|entry| !entry.trim().is_empty())
                .map(PathBuf::from),
        );
    }

    let source_dir = request
        .single_source_file()
        .map(|source| request.source_path(source))
        .and_then(|path| path.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| request.working_dir().to_path_buf());
    debug!("notice source folder: {}", source_dir.display());
    dirs.push(source_dir);

    dirs
}

/// Files that do not exist now but would be picked up instead of a current
/// include if they were created.
///
/// Each include found under a search directory is reduced to its name
/// relative to that directory; that name is then tried against every search
/// directory in order, and every missing candidate ahead of the first
/// existing one is reported.
pub fn potential_include_files(
    request: &CompilationRequest,
    include_dirs: &[PathBuf],
    includes: &IncludeSet,
) -> Vec<PathBuf> {
    let source = request
        .single_source_file()
        .map(|source| request.source_path(source));

    let mut names = BTreeSet::new();
    for dir in include_dirs {
        let prefix = dir.to_string_lossy();
        for file in includes {
            if source.as_deref() == Some(file.as_path()) {
                continue;
            }
            let file_str = file.to_string_lossy();
            let under_dir = file_str
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(&prefix));
            if under_dir {
                let name = file_str[prefix.len()..].trim_start_matches(['\\', '/']);
                if !name.is_empty() {
                    names.insert(name.to_string());
                }
            }
        }
    }

    let mut possibles = Vec::new();
    for name in &names {
        for dir in include_dirs {
            let candidate = dir.join(name);
            if candidate.exists() {
                break;
            }
            possibles.push(candidate);
        }
    }
    possibles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{InterpretContext, Interpreter};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parses_dependency_notes() {
        assert_eq!(
            parse_include_note("Note: including file:   C:\\a.h"),
            Some("C:\\a.h")
        );
        assert_eq!(
            parse_include_note("Note: including file: C:\\inc\\b.h"),
            Some("C:\\inc\\b.h")
        );
        assert_eq!(parse_include_note("hello"), None);
        assert_eq!(parse_include_note("Note: including file:   "), None);
    }

    #[test]
    fn windows_paths_count_as_absolute() {
        let mut set = IncludeSet::new();
        set.insert_from(Path::new("/work"), "C:\\a.h");
        set.insert_from(Path::new("/work"), "\\\\server\\share\\b.h");
        set.insert_from(Path::new("/work"), "rel.h");
        set.insert_from(Path::new("/work"), "C:\\a.h");

        assert_eq!(set.len(), 3);
        assert!(set.contains(Path::new("C:\\a.h")));
        assert!(set.contains(&Path::new("/work").join("rel.h")));
    }

    #[test]
    fn scans_line_directives() {
        let text = "#line 1 \"c:\\\\src\\\\a.c\"\nint x;\n#line 1 \"c:\\\\inc\\\\a.h\"\n#line 7 \"c:\\\\src\\\\a.c\"\n";
        let set = scan_line_directives(text, Path::new("/work"));

        let files: Vec<_> = set.iter().cloned().collect();
        assert_eq!(
            files,
            vec![PathBuf::from("c:\\inc\\a.h"), PathBuf::from("c:\\src\\a.c")]
        );
    }

    fn interpreted(dir: &TempDir, args: &[&str]) -> CompilationRequest {
        Interpreter::new(InterpretContext {
            working_dir: dir.path().to_path_buf(),
            compiler_exe: PathBuf::from("cl.exe"),
        })
        .interpret(args)
        .request
    }

    #[test]
    fn include_dirs_in_search_order() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("inc")).unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src").join("a.c"), "").unwrap();

        let request = interpreted(&dir, &["/c", "/Iinc", "src/a.c"]);
        let env: EnvMap = [("INCLUDE".to_string(), "C:\\sdk\\inc;;C:\\vc\\inc".to_string())]
            .into_iter()
            .collect();

        let dirs = used_include_dirs(&request, &env);
        assert_eq!(
            dirs,
            vec![
                dir.path().join("inc"),
                PathBuf::from("C:\\sdk\\inc"),
                PathBuf::from("C:\\vc\\inc"),
                dir.path().join("src"),
            ]
        );
    }

    #[test]
    fn potential_includes_list_shadowing_candidates() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        let third = dir.path().join("third");
        for d in [&first, &second, &third] {
            fs::create_dir_all(d).unwrap();
        }
        fs::write(second.join("util.h"), "").unwrap();
        fs::write(dir.path().join("a.c"), "").unwrap();

        let request = interpreted(&dir, &["/c", "a.c"]);
        let mut includes = IncludeSet::new();
        includes.insert_from(dir.path(), &second.join("util.h").to_string_lossy());
        includes.insert_from(dir.path(), &dir.path().join("a.c").to_string_lossy());

        let dirs = vec![first.clone(), second.clone(), third.clone()];
        let possibles = potential_include_files(&request, &dirs, &includes);

        assert_eq!(possibles, vec![first.join("util.h")]);
    }
}
