//! Static validation of handlers against their parameter lists.
//!
//! Checking never runs a handler and never looks at command-line tokens, so
//! a registry can be checked once at start-up (or in a test) and every
//! mismatch between a handler's signature and its declared parameters is
//! caught before a user ever types a command.

use crate::bind::{split_params, validate_names};
use crate::dispatch::{Map, Subcmd};
use crate::error::{CheckError, SubcmdCheckError};
use crate::handler::{ArgType, ReturnShape, Signature};
use crate::param::Param;

/// Checks that `subcmd` has a handler that fits its parameters.
///
/// Violations are reported in this order: missing handler, missing leading
/// [`crate::Context`], missing trailing collector, arity, per-parameter type,
/// return type, then the parameter list itself (see [`check_params`]).
pub fn check(subcmd: &Subcmd) -> Result<(), CheckError> {
    let handler = subcmd.get_handler().ok_or(CheckError::NotCallable)?;
    check_signature(&handler.signature(), subcmd.get_params())?;
    check_params(subcmd.get_params())
}

pub fn check_signature(sig: &Signature, params: &[Param]) -> Result<(), CheckError> {
    let args = &sig.args;

    match args.first() {
        Some(ArgType::Context) => {}
        other => {
            return Err(CheckError::MissingContext {
                found: other.map_or("nothing", ArgType::type_name),
            })
        }
    }

    match args.last() {
        Some(ArgType::Collector(_)) if args.len() >= 2 => {}
        _ => {
            return Err(CheckError::MissingCollector {
                found: if args.len() >= 2 {
                    args[args.len() - 1].type_name()
                } else {
                    "nothing"
                },
            })
        }
    }

    let middle = &args[1..args.len() - 1];
    if middle.len() != params.len() {
        return Err(CheckError::ArityMismatch {
            got: middle.len(),
            want: params.len(),
        });
    }

    for (i, (arg, param)) in middle.iter().zip(params).enumerate() {
        if *arg != ArgType::Value(param.kind) {
            return Err(CheckError::TypeMismatch {
                index: i + 1,
                param: param.name.clone(),
                got: arg.type_name(),
                want: param.kind.type_name(),
            });
        }
    }

    match sig.returns {
        ReturnShape::Unit | ReturnShape::Result => Ok(()),
        ReturnShape::Other(found) => Err(CheckError::NotErrorReturn { found }),
    }
}

/// Checks a parameter list on its own.
///
/// Names must be addressable and unique, every default must coerce into its
/// kind, flags must come before positionals, and no required positional may
/// follow an optional one.
pub fn check_params(params: &[Param]) -> Result<(), CheckError> {
    validate_names(params)?;

    for param in params {
        param.coerced_default()?;
    }

    let (_, positionals) = split_params(params);
    let mut optional_seen = false;
    for param in positionals {
        if param.is_flag() {
            return Err(CheckError::ParamOrder {
                param: param.name.clone(),
                reason: "flags must come before positional parameters",
            });
        }
        if param.is_optional() {
            optional_seen = true;
        } else if optional_seen {
            return Err(CheckError::ParamOrder {
                param: param.name.clone(),
                reason: "required positional follows an optional one",
            });
        }
    }
    Ok(())
}

/// Checks every subcommand in a registry, in name order.
pub fn check_map(map: &Map) -> Result<(), SubcmdCheckError> {
    for (name, subcmd) in map {
        check(subcmd).map_err(|source| SubcmdCheckError {
            name: name.clone(),
            source,
        })?;
    }
    Ok(())
}
