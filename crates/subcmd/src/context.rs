//! Per-invocation context passed to every handler as its first argument.
//!
//! A [`Context`] carries:
//!
//! - the path of subcommand names that led to the handler (`["db", "migrate"]`),
//! - the [`FlagSet`] bound for the current subcommand, if it declares flags,
//! - a [`CancellationToken`] the caller may trip,
//! - shared application state ([`Extensions`]),
//! - whether [`crate::run`] should skip its eager registry check.
//!
//! Contexts are cheap to clone; nested `run` calls derive a child context
//! from the one their handler received.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::bind::FlagSet;

/// Type-keyed container for application state shared with handlers.
///
/// ```rust
/// use subcmd::{Context, Extensions};
///
/// struct Database { url: String }
///
/// let mut state = Extensions::new();
/// state.insert(Database { url: "sqlite::memory:".into() });
/// let ctx = Context::new().with_state(state);
///
/// let db = ctx.state().get_required::<Database>()?;
/// assert_eq!(db.url, "sqlite::memory:");
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Default)]
pub struct Extensions {
    map: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the previous value of the same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, val: T) -> Option<T> {
        self.map
            .insert(TypeId::of::<T>(), Box::new(val))
            .and_then(|boxed| boxed.downcast().ok().map(|b| *b))
    }

    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref())
    }

    /// Like [`Extensions::get`], but a missing value is an error.
    pub fn get_required<T: 'static>(&self) -> Result<&T, anyhow::Error> {
        self.get::<T>().ok_or_else(|| {
            anyhow::anyhow!(
                "state missing: type {} not found in context",
                std::any::type_name::<T>()
            )
        })
    }

    pub fn remove<T: 'static>(&mut self) -> Option<T> {
        self.map
            .remove(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast().ok().map(|b| *b))
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extensions")
            .field("len", &self.map.len())
            .finish_non_exhaustive()
    }
}

/// A shared cancellation flag.
///
/// The dispatcher passes it through untouched; long-running handlers poll it.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Context {
    path: Vec<String>,
    flags: Option<Arc<FlagSet>>,
    cancellation: CancellationToken,
    state: Arc<Extensions>,
    suppress_check: bool,
    program: Option<String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the program name shown in usage text.
    ///
    /// Defaults to the first process argument.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// Skips the registry-wide signature check [`crate::run`] performs before
    /// dispatching.
    pub fn with_suppress_check(mut self, suppress: bool) -> Self {
        self.suppress_check = suppress;
        self
    }

    pub fn with_state(mut self, state: Extensions) -> Self {
        self.state = Arc::new(state);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn program(&self) -> String {
        self.program
            .clone()
            .or_else(|| std::env::args().next())
            .unwrap_or_default()
    }

    pub fn suppress_check(&self) -> bool {
        self.suppress_check
    }

    pub fn state(&self) -> &Extensions {
        &self.state
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Subcommand names from the outermost `run` down to the current handler.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The flags bound for the current subcommand.
    ///
    /// `None` when the subcommand declares no flags.
    pub fn flag_set(&self) -> Option<&FlagSet> {
        self.flags.as_deref()
    }

    /// The context a handler for subcommand `name` receives.
    pub(crate) fn child(&self, name: &str, flags: Option<FlagSet>) -> Context {
        let mut path = self.path.clone();
        path.push(name.to_string());
        Context {
            path,
            flags: flags.map(Arc::new),
            ..self.clone()
        }
    }
}
