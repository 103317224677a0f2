//! Binding command-line tokens to typed parameter values.
//!
//! A parameter list splits into a leading run of flags and the positionals
//! after it. Flags are parsed by a `clap::Command` built from the list (see
//! [`flag_command`]); tokens are first normalized so that `-name`, `--name`
//! and `-name=value` all address flag `name`, and so that flag parsing stops
//! at the first positional token. Positionals are then taken in order, and
//! whatever remains becomes the tail.

use std::collections::HashSet;

use clap::{Arg, ArgAction, Command};
use tracing::{debug, trace};

use crate::error::{BindError, CheckError};
use crate::kind::Kind;
use crate::param::Param;
use crate::value::Value;

// A NUL byte cannot appear in a flag name that survives validation.
const TAIL_ID: &str = "\0tail";

/// A flag as bound for one call.
#[derive(Debug, Clone)]
pub struct FlagEntry {
    /// Name without the flag prefix.
    pub name: String,
    pub kind: Kind,
    pub value: Value,
    pub doc: String,
    /// Whether the flag appeared on the command line.
    pub set: bool,
}

/// The flags bound for one subcommand call, in declared order.
#[derive(Debug, Clone, Default)]
pub struct FlagSet {
    entries: Vec<FlagEntry>,
}

impl FlagSet {
    pub fn lookup(&self, name: &str) -> Option<&FlagEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.lookup(name).map(|e| &e.value)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|e| e.set)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlagEntry> {
        self.entries.iter()
    }

    /// Flags that were given explicitly.
    pub fn visit_set(&self) -> impl Iterator<Item = &FlagEntry> {
        self.entries.iter().filter(|e| e.set)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The result of binding: one value per parameter, then the leftover tokens.
#[derive(Debug, Clone)]
pub struct Bound {
    pub values: Vec<Value>,
    pub tail: Vec<String>,
    /// `None` when the parameter list declares no flags.
    pub flags: Option<FlagSet>,
}

/// Splits a parameter list into its leading flags and the rest.
pub fn split_params(params: &[Param]) -> (&[Param], &[Param]) {
    let n = params.iter().take_while(|p| p.is_flag()).count();
    params.split_at(n)
}

/// Rejects names that cannot be addressed on the command line.
pub(crate) fn validate_names(params: &[Param]) -> Result<(), CheckError> {
    let mut seen = HashSet::new();
    for param in params {
        let name = param.display_name();
        let addressable = !name.is_empty()
            && !name.contains(|c: char| c == '=' || c == '\0' || c.is_whitespace())
            && (param.is_flag() || !name.ends_with(crate::param::OPTIONAL_SUFFIX));
        if !addressable {
            return Err(CheckError::InvalidName(param.name.clone()));
        }
        if !seen.insert(name) {
            return Err(CheckError::DuplicateName(param.name.clone()));
        }
    }
    Ok(())
}

/// Builds the flag schema for a list of flag parameters.
///
/// Positional parameters in `flags` are ignored; the returned command also
/// accepts any number of trailing values after `--`.
pub fn flag_command(flags: &[Param]) -> Command {
    let mut cmd = Command::new("subcmd")
        .no_binary_name(true)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new(TAIL_ID)
                .num_args(0..)
                .action(ArgAction::Append),
        );

    for param in flags {
        let Some(name) = param.flag_name() else {
            continue;
        };
        let mut arg = Arg::new(name.to_string())
            .long(name.to_string())
            .action(ArgAction::Append)
            .help(param.doc.clone());
        arg = if param.kind == Kind::Bool {
            arg.num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
        } else {
            arg.num_args(1)
                .allow_hyphen_values(true)
                .value_name(param.kind.placeholder())
        };
        cmd = cmd.arg(arg);
    }
    cmd
}

/// Rewrites tokens into the form [`flag_command`] parses.
///
/// Every flag token gets a `--` prefix, a flag's detached value is kept next
/// to it, and a `--` is placed before the first positional token. Undeclared
/// flags are rejected here so the error can name the token as typed.
fn normalize(tokens: &[String], flags: &[Param]) -> Result<Vec<String>, BindError> {
    let mut out = Vec::with_capacity(tokens.len() + 1);
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--" {
            i += 1;
            break;
        }
        if token == "-" || !token.starts_with('-') {
            break;
        }

        let body = token.strip_prefix("--").unwrap_or(&token[1..]);
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };
        if name.is_empty() || name.starts_with('-') {
            return Err(BindError::FlagSyntax {
                token: token.clone(),
            });
        }

        let Some(param) = flags.iter().find(|p| p.flag_name() == Some(name)) else {
            if name == "h" || name == "help" {
                return Err(BindError::Help);
            }
            // Name the flag as it was typed, not as rewritten below.
            let dashes = &token[..token.len() - body.len()];
            return Err(BindError::UnknownFlag {
                flag: format!("{dashes}{name}"),
            });
        };

        out.push(format!("--{body}"));
        i += 1;

        if inline.is_none() && param.kind != Kind::Bool {
            let value = tokens.get(i).ok_or_else(|| BindError::MissingFlagValue {
                flag: name.to_string(),
            })?;
            out.push(value.clone());
            i += 1;
        }
    }

    out.push("--".to_string());
    out.extend(tokens[i..].iter().cloned());
    Ok(out)
}

/// Binds `tokens` (everything after the subcommand name) to `params`.
pub fn bind<S: AsRef<str>>(params: &[Param], tokens: &[S]) -> Result<Bound, BindError> {
    validate_names(params).map_err(BindError::Schema)?;
    let (flags, positionals) = split_params(params);
    if let Some(stray) = positionals.iter().find(|p| p.is_flag()) {
        return Err(BindError::Schema(CheckError::ParamOrder {
            param: stray.name.clone(),
            reason: "flags must come before positional parameters",
        }));
    }

    let tokens: Vec<String> = tokens.iter().map(|t| t.as_ref().to_string()).collect();
    let normalized = normalize(&tokens, flags)?;
    let matches = flag_command(flags)
        .try_get_matches_from(normalized)
        .map_err(BindError::flags)?;

    let mut values = Vec::with_capacity(params.len());
    let mut entries = Vec::with_capacity(flags.len());
    for param in flags {
        let name = param.display_name();
        let raw: Vec<&String> = matches
            .get_many::<String>(name)
            .map(|v| v.collect())
            .unwrap_or_default();

        let mut value = param.coerced_default()?;
        for token in &raw {
            value.set(token).map_err(|source| BindError::FlagValue {
                flag: name.to_string(),
                source,
            })?;
        }
        entries.push(FlagEntry {
            name: name.to_string(),
            kind: param.kind,
            value: value.clone(),
            doc: param.doc.clone(),
            set: !raw.is_empty(),
        });
        values.push(value);
    }

    let mut rest = matches
        .get_many::<String>(TAIL_ID)
        .map(|v| v.cloned().collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter();

    for param in positionals {
        let mut value = param.coerced_default()?;
        match rest.next() {
            Some(token) => value.set(&token).map_err(|source| BindError::Parse {
                param: param.display_name().to_string(),
                source,
            })?,
            None if param.is_optional() => {}
            None => {
                return Err(BindError::TooFewArgs {
                    param: param.display_name().to_string(),
                })
            }
        }
        trace!(param = %param.name, value = %value, "bound positional");
        values.push(value);
    }

    let tail: Vec<String> = rest.collect();
    debug!(
        flags = flags.len(),
        positionals = positionals.len(),
        tail = tail.len(),
        "bound arguments"
    );

    Ok(Bound {
        values,
        tail,
        flags: (!flags.is_empty()).then_some(FlagSet { entries }),
    })
}
