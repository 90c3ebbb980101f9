//! Integration tests for clshim

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// A clshim command isolated from the user's config and cache.
    fn clshim(dir: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("clshim");
        cmd.current_dir(dir)
            .env("CLSHIM_CONFIG", dir.join("config.toml"))
            .env("CLSHIM_DIR", dir.join("cache"))
            .env("CLSHIM_CL", dir.join("no-such-cl.exe"))
            .env_remove("CLSHIM_LOG");
        cmd
    }

    #[test]
    fn help_displays() {
        let dir = TempDir::new().unwrap();
        clshim(dir.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("MSVC compiler"));
    }

    #[test]
    fn version_displays() {
        let dir = TempDir::new().unwrap();
        clshim(dir.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("clshim"));
    }

    #[test]
    fn explain_supported_scenario() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.c"), "int main(void) { return 0; }\n").unwrap();

        clshim(dir.path())
            .args(["explain", "--format", "json", "--", "/c", "/Fo", "out.obj", "a.c"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""verdict": "supported""#))
            .stdout(predicate::str::contains("out.obj"))
            .stdout(predicate::str::contains(r#""a.c""#));
    }

    #[test]
    fn explain_linking_is_unsupported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.c"), "").unwrap();

        clshim(dir.path())
            .args(["explain", "--", "a.c", "/link", "/out:a.exe"])
            .assert()
            .success()
            .stdout(predicate::str::contains("not cacheable"))
            .stdout(predicate::str::contains("linking"));
    }

    #[test]
    fn stats_empty_cache() {
        let dir = TempDir::new().unwrap();
        clshim(dir.path())
            .args(["stats", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""hits": 0"#))
            .stdout(predicate::str::contains(r#""time_saved_ms": 0"#));
    }

    #[test]
    fn stats_reads_and_resets_counters() {
        let dir = TempDir::new().unwrap();
        let stats_dir = dir.path().join("cache").join("stats");
        fs::create_dir_all(&stats_dir).unwrap();
        fs::write(stats_dir.join("hits.txt"), "5").unwrap();
        fs::write(stats_dir.join("misses.txt"), "oops").unwrap();

        clshim(dir.path())
            .args(["stats", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""hits": 5"#))
            .stdout(predicate::str::contains(r#""misses": 0"#));

        clshim(dir.path())
            .args(["stats", "--reset"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Statistics reset"));

        assert_eq!(fs::read_to_string(stats_dir.join("hits.txt")).unwrap(), "0");
    }

    #[test]
    fn locate_reports_missing_compiler() {
        let dir = TempDir::new().unwrap();
        clshim(dir.path())
            .env("PATH", dir.path())
            .arg("locate")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Could not locate the real compiler"))
            .stderr(predicate::str::contains("CLSHIM_CL"));
    }

    #[test]
    fn config_path_honors_override() {
        let dir = TempDir::new().unwrap();
        clshim(dir.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_set_then_show() {
        let dir = TempDir::new().unwrap();
        clshim(dir.path())
            .args(["config", "set", "cache.omit_locks", "true"])
            .assert()
            .success();

        clshim(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("omit_locks = true"));
    }

    #[test]
    fn config_set_unknown_key_fails() {
        let dir = TempDir::new().unwrap();
        clshim(dir.path())
            .args(["config", "set", "cache.size", "12"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown config key"));
    }

    #[cfg(unix)]
    mod compile {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Stand-in compiler: one dependency note, one line each way, exit 2.
        fn fake_compiler(dir: &Path) -> std::path::PathBuf {
            let path = dir.join("fake-cl");
            fs::write(
                &path,
                "#!/bin/sh\n\
                 echo \"Note: including file:   $PWD/inc/a.h\"\n\
                 echo \"compiled with $# args\"\n\
                 echo \"warning C4996\" >&2\n\
                 exit 2\n",
            )
            .unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn compile_forwards_output_and_exit_code() {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("a.c"), "").unwrap();
            let cl = fake_compiler(dir.path());

            clshim(dir.path())
                .env("CLSHIM_CL", &cl)
                .args(["compile", "--", "/c", "/Fo", "out.obj", "a.c"])
                .assert()
                .code(2)
                .stdout(predicate::str::contains("compiled with 5 args"))
                .stdout(predicate::str::contains("Note: including file").not())
                .stderr(predicate::str::contains("warning C4996"));

            let misses = dir.path().join("cache").join("stats").join("misses.txt");
            assert_eq!(fs::read_to_string(misses).unwrap(), "1");
        }

        #[test]
        fn unsupported_compile_passes_notes_through() {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("a.c"), "").unwrap();
            let cl = fake_compiler(dir.path());

            clshim(dir.path())
                .env("CLSHIM_CL", &cl)
                .args(["compile", "--", "a.c", "/link"])
                .assert()
                .code(2)
                .stdout(predicate::str::contains("Note: including file"))
                .stdout(predicate::str::contains("compiled with 2 args"));

            let stats = dir.path().join("cache").join("stats");
            assert_eq!(
                fs::read_to_string(stats.join("unsupported.txt")).unwrap(),
                "1"
            );
            assert!(!stats.join("misses.txt").exists());
        }

        #[test]
        fn unsupported_compile_keeps_output_bytes() {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("a.c"), "").unwrap();
            let cl = dir.path().join("oem-cl");
            fs::write(
                &cl,
                "#!/bin/sh\n\
                 printf 'caf\\351\\r\\n'\n\
                 printf 'introuvable \\202\\n' >&2\n\
                 exit 1\n",
            )
            .unwrap();
            fs::set_permissions(&cl, fs::Permissions::from_mode(0o755)).unwrap();

            let output = clshim(dir.path())
                .env("CLSHIM_CL", &cl)
                .args(["compile", "--", "a.c", "/link"])
                .output()
                .unwrap();

            assert_eq!(output.status.code(), Some(1));
            assert_eq!(output.stdout, b"caf\xe9\r\n");
            assert!(output
                .stderr
                .windows(13)
                .any(|w| w == b"introuvable \x82"));
        }
    }
}
