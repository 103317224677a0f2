//! Type-directed subcommand dispatch.
//!
//! `subcmd` binds command-line tokens to the typed parameters of plain Rust
//! functions. Each subcommand declares its parameters as data (a name, a
//! [`Kind`], a default and a doc string) and supplies a handler whose
//! signature mirrors that list:
//!
//! ```rust
//! use std::time::Duration;
//! use subcmd::{run, Commands, Context, Kind, Param};
//!
//! fn serve(_ctx: Context, wait: Duration, port: u32, _rest: Vec<String>) -> anyhow::Result<()> {
//!     println!("serving on {port} after {wait:?}");
//!     Ok(())
//! }
//!
//! let commands = Commands::new()
//!     .command(
//!         "serve",
//!         "start the server",
//!         serve,
//!         vec![
//!             Param::flag("wait", Kind::Duration).doc("startup `delay`"),
//!             Param::optional("port", Kind::Uint32).default(8080u32),
//!         ],
//!     )
//!     .build();
//!
//! run(&Context::new(), &commands, &["serve", "-wait", "1s", "9000"])?;
//! # Ok::<(), subcmd::RunError>(())
//! ```
//!
//! # Pipeline
//!
//! 1. **Check** ([`check`]): the handler's [`Signature`] must be
//!    `(Context, <one type per parameter>, Vec<String> | Rest)` returning `()`
//!    or `Result<(), E>`, and every default must coerce into its kind.
//!    [`run`] checks the whole registry first unless the context suppresses it.
//! 2. **Bind** ([`bind()`]): a leading run of `-flag` parameters is parsed
//!    with clap, positionals are consumed in order (`name?` is optional), and
//!    leftover tokens become the tail.
//! 3. **Invoke** ([`invoke()`]): the handler is called once; its error is
//!    returned as `running NAME: ...`.
//!
//! Unknown subcommands, `help` and `-h` produce a [`UsageError`] whose
//! `detail()` is suitable for printing. A [`Cmd`] with a [`Prefixer`] can hand
//! unknown subcommands to `PREFIX-NAME` executables on `PATH`.
//!
//! # Kinds
//!
//! | Kind       | Handler type           | Example token   |
//! |------------|------------------------|-----------------|
//! | `Bool`     | `bool`                 | `true`, `f`     |
//! | `Int32`    | `i32`                  | `-7`, `0x1f`    |
//! | `Int64`    | `i64`                  | `1_000_000`     |
//! | `Uint32`   | `u32`                  | `8080`          |
//! | `Uint64`   | `u64`                  | `0b1010`        |
//! | `String`   | `String`               | anything        |
//! | `Float64`  | `f64`                  | `2.5e3`         |
//! | `Duration` | `std::time::Duration`  | `1m30s`         |
//! | `Custom`   | `Box<dyn CustomValue>` | user-defined    |

mod bind;
mod check;
mod coerce;
mod config;
mod context;
mod dispatch;
pub mod duration;
mod error;
mod handler;
mod invoke;
mod kind;
mod param;
mod prefix;
mod usage;
mod value;

pub use bind::{bind, flag_command, split_params, Bound, FlagEntry, FlagSet};
pub use check::{check, check_map, check_params, check_signature};
pub use coerce::{
    as_bool, as_custom, as_duration, as_float64, as_int32, as_int64, as_string, as_uint32,
    as_uint64, as_value,
};
pub use config::{params_from_json, params_from_yaml};
pub use context::{CancellationToken, Context, Extensions};
pub use dispatch::{run, Cmd, Commands, Map, Subcmd};
pub use error::{
    BindError, BoxError, CheckError, CoercionError, ConfigError, InvokeError, ParamDefaultError,
    RunError, SubcmdCheckError, UnknownKindError, ValueError,
};
pub use handler::{
    ArgType, BoundArg, CallError, Collector, FnHandler, Handler, HandlerArg,
    HandlerReturn, IntoHandler, Rest, ReturnShape, Signature,
};
pub use invoke::invoke;
pub use kind::Kind;
pub use param::{Param, FLAG_PREFIX, OPTIONAL_SUFFIX};
pub use prefix::{parse_env, Prefixer, ENV_VAR};
pub use usage::{flag_table, synopsis, unquote_usage, HelpRequest, Listing, UsageError};
pub use value::{CloneCustomValue, CustomValue, DefaultValue, Value};
