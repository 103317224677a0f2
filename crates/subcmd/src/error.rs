//! Error types for checking, binding and running subcommands.

use std::io;
use std::num::{ParseFloatError, ParseIntError};
use std::process::ExitStatus;

use crate::handler::CallError;
use crate::kind::Kind;
use crate::usage::UsageError;

/// Boxed error returned by [`crate::CustomValue::set`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A kind label that is not in the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown parameter kind {0:?}")]
pub struct UnknownKindError(pub String);

/// A token that could not be converted into a parameter's kind.
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    #[error("invalid boolean {0:?}")]
    Bool(String),

    #[error("invalid integer {token:?}: {source}")]
    Int {
        token: String,
        #[source]
        source: ParseIntError,
    },

    #[error("invalid number {token:?}: {source}")]
    Float {
        token: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("invalid duration {token:?}: {reason}")]
    Duration { token: String, reason: &'static str },

    #[error("invalid value {token:?}: {source}")]
    Custom {
        token: String,
        #[source]
        source: BoxError,
    },
}

/// A default whose dynamic type does not fit the target kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoercionError {
    #[error("{got} default cannot be used as {want}")]
    Incompatible { want: Kind, got: &'static str },

    #[error("negative {got} default cannot be used as {want}")]
    Negative { want: Kind, got: &'static str },

    /// Custom kinds have no zero value to fall back on.
    #[error("custom parameters need a prototype value as their default")]
    MissingPrototype,
}

/// A parameter whose default does not coerce into its kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("parameter {param} ({kind}): {source}")]
pub struct ParamDefaultError {
    pub param: String,
    pub kind: Kind,
    #[source]
    pub source: CoercionError,
}

/// A handler signature or parameter list that cannot be bound.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    /// The subcommand has no handler.
    #[error("subcommand has no handler")]
    NotCallable,

    #[error("first handler parameter is {found}, want Context")]
    MissingContext { found: &'static str },

    #[error("last handler parameter is {found}, want Vec<String> or Rest")]
    MissingCollector { found: &'static str },

    /// `got` counts the handler parameters between the context and the tail.
    #[error(
        "handler takes {got} parameters between context and tail, {want} declared ({:+})",
        arity_delta(.got, .want)
    )]
    ArityMismatch { got: usize, want: usize },

    /// `index` is the position in the handler's own parameter list.
    #[error("handler parameter {index} is {got}, want {want} for {param}")]
    TypeMismatch {
        index: usize,
        param: String,
        got: &'static str,
        want: &'static str,
    },

    #[error("handler returns {found}, want () or Result<(), E>")]
    NotErrorReturn { found: &'static str },

    #[error(transparent)]
    ParamDefault(#[from] ParamDefaultError),

    #[error("parameter {param}: {reason}")]
    ParamOrder { param: String, reason: &'static str },

    #[error("invalid parameter name {0:?}")]
    InvalidName(String),

    #[error("duplicate parameter name {0:?}")]
    DuplicateName(String),
}

fn arity_delta(got: &usize, want: &usize) -> i64 {
    *got as i64 - *want as i64
}

/// A [`CheckError`] tagged with the subcommand it was found in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("checking {name}: {source}")]
pub struct SubcmdCheckError {
    pub name: String,
    #[source]
    pub source: CheckError,
}

/// Failures turning tokens into a bound argument vector.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("bad flag syntax: {token}")]
    FlagSyntax { token: String },

    #[error("flag needs an argument: -{flag}")]
    MissingFlagValue { flag: String },

    /// `flag` is spelled as it was given, dashes included.
    #[error("flag provided but not defined: {flag}")]
    UnknownFlag { flag: String },

    /// Rejected by the flag schema.
    #[error("{message}")]
    Flags {
        message: String,
        #[source]
        source: clap::Error,
    },

    #[error("invalid value for flag -{flag}: {source}")]
    FlagValue {
        flag: String,
        #[source]
        source: ValueError,
    },

    /// `-h` or `-help` given to a subcommand that declares neither.
    #[error("help requested")]
    Help,

    #[error("parsing {param}: {source}")]
    Parse {
        param: String,
        #[source]
        source: ValueError,
    },

    #[error("too few arguments: missing {param}")]
    TooFewArgs { param: String },

    #[error(transparent)]
    Default(#[from] ParamDefaultError),

    /// A parameter list that was never checked and cannot form a schema.
    #[error(transparent)]
    Schema(CheckError),
}

impl BindError {
    pub(crate) fn flags(source: clap::Error) -> Self {
        // clap renders a multi-line report; the first line carries the reason.
        let rendered = source.to_string();
        let first = rendered.lines().next().unwrap_or_default();
        let message = first.strip_prefix("error: ").unwrap_or(first).to_string();
        Self::Flags { message, source }
    }
}

/// Errors from loading parameter lists out of configuration text.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    UnknownKind(#[from] UnknownKindError),

    #[error("parameter {param}: default {value} is not a valid {kind}")]
    BadDefault {
        param: String,
        kind: Kind,
        value: String,
    },

    #[error("parameter {param}: {kind} parameters cannot be declared in configuration")]
    Unsupported { param: String, kind: Kind },

    #[error("invalid YAML parameter list: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON parameter list: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures calling a handler with a bound argument vector.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    /// The handler ran and returned an error.
    #[error("running {name}: {source}")]
    Handler {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// The bound arguments did not fit the handler. Only reachable when
    /// checking was suppressed.
    #[error("calling {name}: {source}")]
    Call {
        name: String,
        #[source]
        source: CallError,
    },
}

/// Everything [`crate::run`] can fail with.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Check(#[from] SubcmdCheckError),

    #[error("parsing arguments for {name}: {source}")]
    Bind {
        name: String,
        #[source]
        source: BindError,
    },

    #[error(transparent)]
    Invoke(#[from] InvokeError),

    #[error("looking up {program}: {source}")]
    Lookup {
        program: String,
        #[source]
        source: which::Error,
    },

    #[error("encoding command for {program}: {source}")]
    Snapshot {
        program: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("running {program}: {source}")]
    Delegate {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}")]
    DelegateStatus { program: String, status: ExitStatus },
}

impl RunError {
    /// The usage error, if this is one.
    pub fn usage(&self) -> Option<&UsageError> {
        match self {
            RunError::Usage(e) => Some(e),
            _ => None,
        }
    }

    /// The binding error, if argument parsing failed.
    pub fn bind_error(&self) -> Option<&BindError> {
        match self {
            RunError::Bind { source, .. } => Some(source),
            _ => None,
        }
    }

    /// The error a handler returned, if it ran and failed.
    pub fn handler_error(&self) -> Option<&anyhow::Error> {
        match self {
            RunError::Invoke(InvokeError::Handler { source, .. }) => Some(source),
            _ => None,
        }
    }

    /// True for errors caused by the command line rather than the program.
    ///
    /// A parameter list that cannot form a schema, or a default that does not
    /// fit its kind, is a programming error and never counts.
    pub fn is_usage(&self) -> bool {
        match self {
            RunError::Usage(_) => true,
            RunError::Bind { source, .. } => {
                !matches!(source, BindError::Schema(_) | BindError::Default(_))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_delta_is_signed() {
        let more = CheckError::ArityMismatch { got: 3, want: 2 };
        assert!(more.to_string().ends_with("(+1)"), "{more}");
        let fewer = CheckError::ArityMismatch { got: 1, want: 2 };
        assert!(fewer.to_string().ends_with("(-1)"), "{fewer}");
    }

    #[test]
    fn test_param_default_names_everything() {
        let err = ParamDefaultError {
            param: "-n".into(),
            kind: Kind::Int32,
            source: CoercionError::Incompatible {
                want: Kind::Int32,
                got: "i64",
            },
        };
        assert_eq!(
            err.to_string(),
            "parameter -n (int32): i64 default cannot be used as int32"
        );
    }

    #[test]
    fn test_handler_error_is_wrapped_once() {
        let err = RunError::from(InvokeError::Handler {
            name: "list".into(),
            source: anyhow::anyhow!("boom"),
        });
        assert_eq!(err.to_string(), "running list: boom");
        assert_eq!(err.handler_error().unwrap().to_string(), "boom");
        assert!(!err.is_usage());
    }

    fn bind_failure(source: BindError) -> RunError {
        RunError::Bind {
            name: "c".into(),
            source,
        }
    }

    #[test]
    fn test_bad_command_lines_are_usage_errors() {
        let unknown = bind_failure(BindError::UnknownFlag { flag: "-x".into() });
        assert!(unknown.is_usage());
        assert_eq!(
            unknown.to_string(),
            "parsing arguments for c: flag provided but not defined: -x"
        );
        assert!(bind_failure(BindError::TooFewArgs { param: "n".into() }).is_usage());
        assert!(bind_failure(BindError::Help).is_usage());
    }

    #[test]
    fn test_broken_parameter_lists_are_not_usage_errors() {
        let schema = bind_failure(BindError::Schema(CheckError::DuplicateName("-a".into())));
        assert!(!schema.is_usage());

        let default = bind_failure(BindError::Default(ParamDefaultError {
            param: "n".into(),
            kind: Kind::Int32,
            source: CoercionError::MissingPrototype,
        }));
        assert!(!default.is_usage());
        assert!(default.bind_error().is_some());
    }
}
