//! Delegation of unknown subcommands to `PREFIX-NAME` executables, and the
//! environment snapshot they receive.
//!
//! These tests change `PATH` and `SUBCMD_ENV`, so they run serially.

use serde::{Deserialize, Serialize};
use serial_test::serial;
use subcmd::{parse_env, run, Cmd, Commands, Context, Map, Prefixer, RunError, ENV_VAR};

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Tool {
    verbose: bool,
    profile: String,
}

impl Cmd for Tool {
    fn subcmds(&self) -> Map {
        Commands::new()
            .command(
                "builtin",
                "a compiled-in subcommand",
                |_: subcmd::Context, _: Vec<String>| {},
                vec![],
            )
            .build()
    }

    fn prefixer(&self) -> Option<&dyn Prefixer> {
        Some(self)
    }
}

impl Prefixer for Tool {
    fn prefix(&self) -> &str {
        "subcmdtest-"
    }

    fn snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn tool() -> Tool {
    Tool {
        verbose: true,
        profile: "staging".into(),
    }
}

#[test]
#[serial]
fn parse_env_unset_or_empty_is_none() {
    std::env::remove_var(ENV_VAR);
    assert_eq!(parse_env::<Tool>().unwrap(), None);

    std::env::set_var(ENV_VAR, "");
    assert_eq!(parse_env::<Tool>().unwrap(), None);
    std::env::remove_var(ENV_VAR);
}

#[test]
#[serial]
fn parse_env_decodes_snapshot() {
    std::env::set_var(ENV_VAR, tool().snapshot().unwrap());
    assert_eq!(parse_env::<Tool>().unwrap(), Some(tool()));

    std::env::set_var(ENV_VAR, "{not json");
    assert!(parse_env::<Tool>().is_err());
    std::env::remove_var(ENV_VAR);
}

#[test]
#[serial]
fn unknown_without_executable_is_a_usage_error() {
    let err = run(&Context::new(), &tool(), &["nosuchthing-xyz"]).unwrap_err();
    assert!(matches!(err, RunError::Usage(_)), "{err}");
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::ffi::OsString;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    /// Restores `PATH` when dropped.
    struct PathGuard(Option<OsString>);

    impl PathGuard {
        fn prepend(dir: &Path) -> Self {
            let old = std::env::var_os("PATH");
            let mut dirs = vec![dir.to_path_buf()];
            if let Some(old) = &old {
                dirs.extend(std::env::split_paths(old));
            }
            std::env::set_var("PATH", std::env::join_paths(dirs).unwrap());
            Self(old)
        }
    }

    impl Drop for PathGuard {
        fn drop(&mut self) {
            match &self.0 {
                Some(old) => std::env::set_var("PATH", old),
                None => std::env::remove_var("PATH"),
            }
        }
    }

    fn script(dir: &Path, name: &str, body: &str) {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    #[serial]
    fn delegates_with_args_and_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        script(
            dir.path(),
            "subcmdtest-report",
            &format!(
                "printf '%s\\n' \"${ENV_VAR}\" \"$@\" > '{}'",
                out.display()
            ),
        );
        let _path = PathGuard::prepend(dir.path());

        run(&Context::new(), &tool(), &["report", "-x", "two words"]).unwrap();

        let written = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 3, "{written}");
        let snapshot: Tool = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(snapshot, tool());
        assert_eq!(&lines[1..], ["-x", "two words"]);
    }

    #[test]
    #[serial]
    fn failing_executable_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        script(dir.path(), "subcmdtest-broken", "exit 3");
        let _path = PathGuard::prepend(dir.path());

        let err = run(&Context::new(), &tool(), &["broken"]).unwrap_err();
        match &err {
            RunError::DelegateStatus { program, status } => {
                assert_eq!(program, "subcmdtest-broken");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    #[serial]
    fn registered_names_and_help_are_never_delegated() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("ran");
        for name in ["subcmdtest-builtin", "subcmdtest-help"] {
            script(dir.path(), name, &format!("touch '{}'", marker.display()));
        }
        let _path = PathGuard::prepend(dir.path());

        run(&Context::new(), &tool(), &["builtin"]).unwrap();
        let err = run(&Context::new(), &tool(), &["help"]).unwrap_err();
        assert!(err.usage().is_some());
        assert!(!marker.exists());
    }
}
