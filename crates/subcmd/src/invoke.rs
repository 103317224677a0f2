//! Calling a handler with a bound argument vector.

use tracing::debug;

use crate::bind::Bound;
use crate::context::Context;
use crate::error::InvokeError;
use crate::handler::{BoundArg, CallError, Handler};

/// Calls `handler` once as subcommand `name`.
///
/// The handler receives a child of `ctx` (its path extended by `name`, its
/// flag set replaced by the one in `bound`), then the bound values in order,
/// then the tail. An error the handler returns comes back as
/// [`InvokeError::Handler`], wrapped only with the subcommand name.
pub fn invoke(
    name: &str,
    handler: &dyn Handler,
    ctx: &Context,
    bound: Bound,
) -> Result<(), InvokeError> {
    let Bound {
        values,
        tail,
        flags,
    } = bound;

    let mut args = Vec::with_capacity(values.len() + 2);
    args.push(BoundArg::Context(ctx.child(name, flags)));
    args.extend(values.into_iter().map(BoundArg::Value));
    args.push(BoundArg::Tail(tail));

    debug!(subcmd = name, args = args.len(), "invoking handler");
    handler.call(args).map_err(|e| match e {
        CallError::Failed(source) => InvokeError::Handler {
            name: name.to_string(),
            source,
        },
        source => InvokeError::Call {
            name: name.to_string(),
            source,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::{bind, FlagSet};
    use crate::handler::{IntoHandler, Rest};
    use crate::kind::Kind;
    use crate::param::Param;
    use crate::value::Value;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_passes_context_values_and_tail() {
        let seen = Arc::new(Mutex::new(None));
        let out = seen.clone();
        let handler = (move |ctx: Context, n: i32, rest: Rest| {
            let verbose = ctx.flag_set().map(FlagSet::len);
            *out.lock().unwrap() = Some((ctx.path().to_vec(), verbose, n, rest.into_inner()));
        })
        .into_handler();

        let bound = bind(&[Param::positional("n", Kind::Int32)], &["3", "x", "y"]).unwrap();
        invoke("count", handler.as_ref(), &Context::new(), bound).unwrap();

        let (path, flags, n, rest) = seen.lock().unwrap().take().unwrap();
        assert_eq!(path, ["count"]);
        assert_eq!(flags, None);
        assert_eq!(n, 3);
        assert_eq!(rest, ["x", "y"]);
    }

    #[test]
    fn test_handler_error_surfaces_verbatim() {
        #[derive(Debug, thiserror::Error)]
        #[error("disk full")]
        struct DiskFull;

        let handler =
            (|_: Context, _: Vec<String>| -> Result<(), DiskFull> { Err(DiskFull) }).into_handler();
        let bound = bind::<&str>(&[], &[]).unwrap();
        let err = invoke("save", handler.as_ref(), &Context::new(), bound).unwrap_err();

        assert_eq!(err.to_string(), "running save: disk full");
        match err {
            InvokeError::Handler { source, .. } => assert!(source.is::<DiskFull>()),
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn test_mismatched_values_are_reported_not_called() {
        let handler = (|_: Context, _: i64, _: Vec<String>| -> () {
            panic!("must not run");
        })
        .into_handler();
        let bound = Bound {
            values: vec![Value::Int32(1)],
            tail: vec![],
            flags: None,
        };
        let err = invoke("x", handler.as_ref(), &Context::new(), bound).unwrap_err();
        assert!(matches!(err, InvokeError::Call { .. }));
    }
}
