//! Handler functions and their signatures.
//!
//! A handler is an ordinary function or closure shaped like
//!
//! ```text
//! fn(Context, P1, P2, ..., Pn, Tail) -> Ret
//! ```
//!
//! where each `Pi` is the canonical storage type of the i-th declared
//! parameter's kind (`bool`, `i32`, `i64`, `u32`, `u64`, `String`, `f64`,
//! `Duration` or `Box<dyn CustomValue>`), `Tail` is `Vec<String>` or [`Rest`],
//! and `Ret` is `()` or `Result<(), E>` for any `E: Into<anyhow::Error>`.
//!
//! [`IntoHandler`] erases such a function into an `Arc<dyn Handler>` and
//! records its [`Signature`] so it can be checked against a parameter list
//! before any arguments are bound. Arguments travel to the function as
//! [`BoundArg`]s and are unpacked by each parameter type's [`HandlerArg`] impl.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use crate::context::Context;
use crate::kind::Kind;
use crate::value::{CustomValue, Value};

/// How a handler receives the trailing tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collector {
    /// `Vec<String>`
    Batch,
    /// [`Rest`]
    Spread,
}

/// What one handler parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    Context,
    Value(Kind),
    Collector(Collector),
    /// A type that can never be bound, kept so checks can name it.
    Other(&'static str),
}

impl ArgType {
    pub fn type_name(&self) -> &'static str {
        match self {
            ArgType::Context => "Context",
            ArgType::Value(kind) => kind.type_name(),
            ArgType::Collector(Collector::Batch) => "Vec<String>",
            ArgType::Collector(Collector::Spread) => "Rest",
            ArgType::Other(name) => name,
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// What a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    Unit,
    Result,
    /// A return type that cannot carry an error.
    Other(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub args: Vec<ArgType>,
    pub returns: ReturnShape,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(arg.type_name())?;
        }
        f.write_str(")")?;
        match self.returns {
            ReturnShape::Unit => Ok(()),
            ReturnShape::Result => f.write_str(" -> Result<(), Error>"),
            ReturnShape::Other(name) => write!(f, " -> {name}"),
        }
    }
}

/// One argument on its way into a handler.
#[derive(Debug)]
pub enum BoundArg {
    Context(Context),
    Value(Value),
    Tail(Vec<String>),
}

/// Trailing tokens taken as a spread collector.
///
/// Equivalent to `Vec<String>` at the call site; the distinction only shows in
/// a handler's [`Signature`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rest(pub Vec<String>);

impl Rest {
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl Deref for Rest {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl IntoIterator for Rest {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A type that can appear as a handler parameter.
pub trait HandlerArg: Sized {
    fn arg_type() -> ArgType;
    fn from_bound(arg: BoundArg) -> Option<Self>;
}

impl HandlerArg for Context {
    fn arg_type() -> ArgType {
        ArgType::Context
    }

    fn from_bound(arg: BoundArg) -> Option<Self> {
        match arg {
            BoundArg::Context(ctx) => Some(ctx),
            _ => None,
        }
    }
}

macro_rules! value_arg {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl HandlerArg for $ty {
                fn arg_type() -> ArgType {
                    ArgType::Value(Kind::$variant)
                }

                fn from_bound(arg: BoundArg) -> Option<Self> {
                    match arg {
                        BoundArg::Value(Value::$variant(v)) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

value_arg! {
    bool => Bool,
    i32 => Int32,
    i64 => Int64,
    u32 => Uint32,
    u64 => Uint64,
    String => String,
    f64 => Float64,
    Duration => Duration,
    Box<dyn CustomValue> => Custom,
}

impl HandlerArg for Vec<String> {
    fn arg_type() -> ArgType {
        ArgType::Collector(Collector::Batch)
    }

    fn from_bound(arg: BoundArg) -> Option<Self> {
        match arg {
            BoundArg::Tail(tail) => Some(tail),
            _ => None,
        }
    }
}

impl HandlerArg for Rest {
    fn arg_type() -> ArgType {
        ArgType::Collector(Collector::Spread)
    }

    fn from_bound(arg: BoundArg) -> Option<Self> {
        match arg {
            BoundArg::Tail(tail) => Some(Rest(tail)),
            _ => None,
        }
    }
}

// Types with no kind of their own. They compile as handler parameters so the
// checker can report them instead of the caller hitting a trait error.
macro_rules! unbindable_arg {
    ($($ty:ty),* $(,)?) => {
        $(
            impl HandlerArg for $ty {
                fn arg_type() -> ArgType {
                    ArgType::Other(stringify!($ty))
                }

                fn from_bound(_: BoundArg) -> Option<Self> {
                    None
                }
            }
        )*
    };
}

unbindable_arg!(i8, i16, isize, u8, u16, usize, f32, char, &'static str);

/// A type that can be returned from a handler.
pub trait HandlerReturn {
    fn shape() -> ReturnShape;
    fn into_result(self) -> anyhow::Result<()>;
}

impl HandlerReturn for () {
    fn shape() -> ReturnShape {
        ReturnShape::Unit
    }

    fn into_result(self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<E: Into<anyhow::Error>> HandlerReturn for Result<(), E> {
    fn shape() -> ReturnShape {
        ReturnShape::Result
    }

    fn into_result(self) -> anyhow::Result<()> {
        self.map_err(Into::into)
    }
}

macro_rules! value_return {
    ($($ty:ty),* $(,)?) => {
        $(
            impl HandlerReturn for $ty {
                fn shape() -> ReturnShape {
                    ReturnShape::Other(stringify!($ty))
                }

                fn into_result(self) -> anyhow::Result<()> {
                    Ok(())
                }
            }
        )*
    };
}

value_return!(bool, i32, i64, u32, u64, usize, f64, String);

/// Why a bound argument vector could not be applied to a handler.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("handler takes {want} arguments, got {got}")]
    Count { got: usize, want: usize },

    #[error("argument {index} is not a {want}")]
    Mismatch { index: usize, want: ArgType },

    #[error(transparent)]
    Failed(anyhow::Error),
}

/// A type-erased handler.
pub trait Handler: Send + Sync {
    fn signature(&self) -> Signature;

    /// Calls the handler once with `[context, values..., tail]`.
    fn call(&self, args: Vec<BoundArg>) -> Result<(), CallError>;
}

/// Conversion of a function or closure into a [`Handler`].
///
/// `Args` is the tuple of parameter types; it only exists to keep the impls
/// for different arities apart.
pub trait IntoHandler<Args, R> {
    fn into_handler(self) -> Arc<dyn Handler>;
}

/// A function paired with the `fn` pointer type describing its signature.
pub struct FnHandler<F, S> {
    f: F,
    _signature: PhantomData<S>,
}

macro_rules! impl_handler {
    ($($arg:ident),*) => {
        impl<F, R, $($arg,)*> IntoHandler<($($arg,)*), R> for F
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: HandlerReturn + 'static,
            $($arg: HandlerArg + 'static,)*
        {
            fn into_handler(self) -> Arc<dyn Handler> {
                Arc::new(FnHandler {
                    f: self,
                    _signature: PhantomData::<fn($($arg),*) -> R>,
                })
            }
        }

        impl<F, R, $($arg,)*> Handler for FnHandler<F, fn($($arg),*) -> R>
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: HandlerReturn + 'static,
            $($arg: HandlerArg + 'static,)*
        {
            fn signature(&self) -> Signature {
                Signature {
                    args: vec![$($arg::arg_type()),*],
                    returns: R::shape(),
                }
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn call(&self, args: Vec<BoundArg>) -> Result<(), CallError> {
                let want = 0usize $(+ { let _ = stringify!($arg); 1 })*;
                if args.len() != want {
                    return Err(CallError::Count { got: args.len(), want });
                }
                let mut args = args.into_iter().enumerate();
                $(
                    let $arg = match args.next() {
                        Some((index, bound)) => $arg::from_bound(bound).ok_or(CallError::Mismatch {
                            index,
                            want: $arg::arg_type(),
                        })?,
                        None => return Err(CallError::Count { got: 0, want }),
                    };
                )*
                (self.f)($($arg),*).into_result().map_err(CallError::Failed)
            }
        }
    };
}

macro_rules! all_arities {
    ($first:ident $(, $rest:ident)*) => {
        impl_handler!($first $(, $rest)*);
        all_arities!($($rest),*);
    };
    () => {
        impl_handler!();
    };
}

all_arities!(A20, A19, A18, A17, A16, A15, A14, A13, A12, A11, A10, A9, A8, A7, A6, A5, A4, A3, A2, A1);
