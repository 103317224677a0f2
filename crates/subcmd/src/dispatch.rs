//! Subcommand registries and the `run` entry point.
//!
//! A [`Cmd`] produces a [`Map`] from subcommand names to [`Subcmd`]
//! descriptors. [`run`] looks the first token up in that map, checks the
//! registry, binds the remaining tokens and calls the handler:
//!
//! ```rust
//! use subcmd::{run, Commands, Context, Kind, Param};
//!
//! let commands = Commands::new()
//!     .command(
//!         "greet",
//!         "say hello",
//!         |_ctx: Context, loud: bool, name: String, _rest: Vec<String>| {
//!             let greeting = format!("hello, {name}");
//!             println!("{}", if loud { greeting.to_uppercase() } else { greeting });
//!         },
//!         vec![
//!             Param::flag("loud", Kind::Bool).doc("shout"),
//!             Param::positional("name", Kind::String),
//!         ],
//!     )
//!     .build();
//!
//! run(&Context::new(), &commands, &["greet", "-loud", "world"])?;
//! # Ok::<(), subcmd::RunError>(())
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::bind::bind;
use crate::check::check_map;
use crate::context::Context;
use crate::error::{BindError, CheckError, RunError, SubcmdCheckError};
use crate::handler::{Handler, IntoHandler, Signature};
use crate::invoke::invoke;
use crate::param::Param;
use crate::prefix::{delegate, Prefixer};
use crate::usage::UsageError;

/// A subcommand: its handler, parameters and one-line description.
#[derive(Clone, Default)]
pub struct Subcmd {
    handler: Option<Arc<dyn Handler>>,
    params: Vec<Param>,
    desc: String,
}

impl Subcmd {
    pub fn new(desc: impl Into<String>) -> Self {
        Self {
            handler: None,
            params: Vec::new(),
            desc: desc.into(),
        }
    }

    pub fn handler<H, Args, R>(mut self, handler: H) -> Self
    where
        H: IntoHandler<Args, R>,
    {
        self.handler = Some(handler.into_handler());
        self
    }

    pub fn params(mut self, params: impl IntoIterator<Item = Param>) -> Self {
        self.params = params.into_iter().collect();
        self
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn get_handler(&self) -> Option<&dyn Handler> {
        self.handler.as_deref()
    }

    pub fn get_params(&self) -> &[Param] {
        &self.params
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }

    pub fn signature(&self) -> Option<Signature> {
        self.handler.as_ref().map(|h| h.signature())
    }
}

impl fmt::Debug for Subcmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subcmd")
            .field("handler", &self.signature())
            .field("params", &self.params)
            .field("desc", &self.desc)
            .finish()
    }
}

/// Subcommands by name. Iteration is in name order.
pub type Map = BTreeMap<String, Subcmd>;

/// Something with subcommands.
pub trait Cmd {
    fn subcmds(&self) -> Map;

    /// When present, unknown subcommand names are looked up on `PATH` as
    /// `PREFIX` followed by the name (see [`Prefixer`]).
    fn prefixer(&self) -> Option<&dyn Prefixer> {
        None
    }
}

impl Cmd for Map {
    fn subcmds(&self) -> Map {
        self.clone()
    }
}

/// Builder for a [`Map`].
#[derive(Debug, Clone, Default)]
pub struct Commands {
    map: Map,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler with its description and parameters.
    pub fn command<H, Args, R>(
        mut self,
        name: impl Into<String>,
        desc: impl Into<String>,
        handler: H,
        params: Vec<Param>,
    ) -> Self
    where
        H: IntoHandler<Args, R>,
    {
        let subcmd = Subcmd::new(desc).handler(handler).params(params);
        self.map.insert(name.into(), subcmd);
        self
    }

    pub fn subcmd(mut self, name: impl Into<String>, subcmd: Subcmd) -> Self {
        self.map.insert(name.into(), subcmd);
        self
    }

    pub fn build(self) -> Map {
        self.map
    }
}

/// Runs the subcommand named by `args[0]` with the remaining tokens.
///
/// - No tokens: [`UsageError::MissingSubcmd`].
/// - `help [NAME]`, unless a subcommand is registered under that name:
///   [`UsageError::HelpRequested`].
/// - An unknown name: delegated to an executable on `PATH` when `cmd` has a
///   [`Prefixer`], otherwise [`UsageError::UnknownSubcmd`].
///
/// Unless [`Context::suppress_check`] is set, the whole registry is checked
/// before anything is bound.
pub fn run<S: AsRef<str>>(ctx: &Context, cmd: &dyn Cmd, args: &[S]) -> Result<(), RunError> {
    let subcmds = cmd.subcmds();

    let Some((first, rest)) = args.split_first() else {
        return Err(UsageError::missing(&subcmds).into());
    };
    let name = first.as_ref();

    let Some(subcmd) = subcmds.get(name) else {
        if name == "help" {
            let topic = rest.first().map(|t| t.as_ref());
            return Err(UsageError::help(ctx, &subcmds, topic).into());
        }
        if let Some(prefixer) = cmd.prefixer() {
            if delegate(prefixer, name, rest)? {
                return Ok(());
            }
        }
        return Err(UsageError::unknown(&subcmds, name).into());
    };
    debug!(subcmd = name, path = ?ctx.path(), "resolved subcommand");

    if !ctx.suppress_check() {
        check_map(&subcmds)?;
    }
    let handler = subcmd.get_handler().ok_or_else(|| SubcmdCheckError {
        name: name.to_string(),
        source: CheckError::NotCallable,
    })?;

    let bound = match bind(subcmd.get_params(), rest) {
        Ok(bound) => bound,
        Err(BindError::Help) => {
            return Err(UsageError::help(ctx, &subcmds, Some(name)).into());
        }
        Err(source) => {
            return Err(RunError::Bind {
                name: name.to_string(),
                source,
            })
        }
    };

    invoke(name, handler, ctx, bound)?;
    Ok(())
}
