//! Subcommands implemented by separate executables.
//!
//! A [`Cmd`](crate::Cmd) whose [`prefixer`](crate::Cmd::prefixer) returns a
//! [`Prefixer`] can be extended without recompiling: when [`crate::run`] meets
//! an unknown subcommand `NAME`, it looks for an executable called
//! `PREFIX` + `NAME` on `PATH` and, if there is one, runs it with the
//! remaining arguments. The child inherits stdin, stdout and stderr and
//! receives a JSON snapshot of the parent command in [`ENV_VAR`], which it can
//! decode with [`parse_env`].

use std::env;
use std::process::Command;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::RunError;

/// Environment variable carrying the parent command's JSON snapshot.
pub const ENV_VAR: &str = "SUBCMD_ENV";

pub trait Prefixer {
    /// Prepended to an unknown subcommand name to form the executable name.
    fn prefix(&self) -> &str;

    /// JSON passed to the child in [`ENV_VAR`]. Usually
    /// `serde_json::to_string(self)`.
    fn snapshot(&self) -> Result<String, serde_json::Error>;
}

/// Runs `PREFIX + name` from `PATH` with `args`.
///
/// Returns `Ok(false)` when no such executable exists, so the caller can
/// report the subcommand as unknown.
pub(crate) fn delegate<S: AsRef<str>>(
    prefixer: &dyn Prefixer,
    name: &str,
    args: &[S],
) -> Result<bool, RunError> {
    let program = format!("{}{}", prefixer.prefix(), name);
    let path = match which::which(&program) {
        Ok(path) => path,
        Err(which::Error::CannotFindBinaryPath) => return Ok(false),
        Err(source) => {
            warn!(program = %program, error = %source, "executable lookup failed");
            return Err(RunError::Lookup { program, source });
        }
    };

    let snapshot = prefixer
        .snapshot()
        .map_err(|source| RunError::Snapshot {
            program: program.clone(),
            source,
        })?;

    debug!(program = %program, path = %path.display(), "delegating to executable");
    let status = Command::new(&path)
        .args(args.iter().map(AsRef::<str>::as_ref))
        .env(ENV_VAR, snapshot)
        .status()
        .map_err(|source| RunError::Delegate {
            program: program.clone(),
            source,
        })?;

    if !status.success() {
        return Err(RunError::DelegateStatus { program, status });
    }
    Ok(true)
}

/// Decodes the snapshot a parent process left in [`ENV_VAR`].
///
/// Returns `Ok(None)` when the variable is unset or empty, i.e. when the
/// executable was not started by [`crate::run`].
pub fn parse_env<T: DeserializeOwned>() -> Result<Option<T>, serde_json::Error> {
    match env::var(ENV_VAR) {
        Ok(val) if !val.is_empty() => serde_json::from_str(&val).map(Some),
        _ => Ok(None),
    }
}
