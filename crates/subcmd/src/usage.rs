//! Usage errors and help text.
//!
//! Every [`UsageError`] has a one-line `Display` and a multi-line
//! [`UsageError::detail`]. For a single subcommand the detail looks like
//!
//! ```text
//! add: add an employee
//! Usage: roster add [-manager] [-start duration] name [title]
//! -manager         mark as a manager
//! -start duration  start delay
//! ```
//!
//! A word in backquotes inside a flag's doc names the flag's value in usage
//! text: a doc of ``"the `port` to listen on"`` shows the flag as
//! `-listen port`. Without one, the placeholder comes from the flag's kind.

use std::fmt;
use std::fmt::Write as _;

use crate::bind::split_params;
use crate::context::Context;
use crate::dispatch::{Map, Subcmd};
use crate::param::Param;

/// Subcommand names and descriptions, in name order.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    entries: Vec<(String, String)>,
}

impl Listing {
    pub fn of(map: &Map) -> Self {
        Self {
            entries: map
                .iter()
                .map(|(name, sub)| (name.clone(), sub.desc().to_string()))
                .collect(),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    fn joined(&self) -> String {
        self.names().collect::<Vec<_>>().join("; ")
    }

    fn table(&self, header: &str) -> String {
        let width = self.names().map(|n| n.chars().count()).max().unwrap_or(0);
        let mut out = format!("{header}\n");
        for (name, desc) in &self.entries {
            let _ = writeln!(out, "{name:<width$}  {desc}");
        }
        out
    }
}

/// A `help` request and what it refers to.
#[derive(Debug, Clone)]
pub struct HelpRequest {
    /// Program name followed by the enclosing subcommand path.
    pub invocation: String,
    /// The subcommand help was asked about, if any.
    pub topic: Option<String>,
    /// The registered subcommand named by `topic`.
    pub subcmd: Option<Subcmd>,
    pub listing: Listing,
}

#[derive(Debug, Clone)]
pub enum UsageError {
    MissingSubcmd { listing: Listing },
    UnknownSubcmd { name: String, listing: Listing },
    HelpRequested(Box<HelpRequest>),
}

impl UsageError {
    pub(crate) fn missing(map: &Map) -> Self {
        UsageError::MissingSubcmd {
            listing: Listing::of(map),
        }
    }

    pub(crate) fn unknown(map: &Map, name: &str) -> Self {
        UsageError::UnknownSubcmd {
            name: name.to_string(),
            listing: Listing::of(map),
        }
    }

    pub(crate) fn help(ctx: &Context, map: &Map, topic: Option<&str>) -> Self {
        let mut invocation = ctx.program();
        for name in ctx.path() {
            invocation.push(' ');
            invocation.push_str(name);
        }
        UsageError::HelpRequested(Box::new(HelpRequest {
            invocation,
            topic: topic.map(str::to_string),
            subcmd: topic.and_then(|t| map.get(t)).cloned(),
            listing: Listing::of(map),
        }))
    }

    pub fn listing(&self) -> &Listing {
        match self {
            UsageError::MissingSubcmd { listing } | UsageError::UnknownSubcmd { listing, .. } => {
                listing
            }
            UsageError::HelpRequested(req) => &req.listing,
        }
    }

    /// Multi-line usage information.
    pub fn detail(&self) -> String {
        match self {
            UsageError::MissingSubcmd { listing } => {
                listing.table("Missing subcommand, want one of:")
            }
            UsageError::UnknownSubcmd { name, listing } => {
                listing.table(&format!("Unknown subcommand \"{name}\", want one of:"))
            }
            UsageError::HelpRequested(req) => match (&req.topic, &req.subcmd) {
                (None, _) => req.listing.table("Subcommands are:"),
                (Some(name), None) => unknown_line(name, &req.listing),
                (Some(name), Some(sub)) => {
                    let mut out = String::new();
                    if !sub.desc().is_empty() {
                        let _ = writeln!(out, "{name}: {}", sub.desc());
                    }
                    let _ = writeln!(
                        out,
                        "Usage: {} {name}{}",
                        req.invocation,
                        synopsis(sub.get_params())
                    );
                    out.push_str(&flag_table(sub.get_params()));
                    out
                }
            },
        }
    }
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageError::MissingSubcmd { listing } => {
                write!(f, "missing subcommand, want one of: {}", listing.joined())
            }
            UsageError::UnknownSubcmd { name, listing } => f.write_str(&unknown_line(name, listing)),
            UsageError::HelpRequested(req) => match (&req.topic, &req.subcmd) {
                (None, _) => write!(f, "subcommands are: {}", req.listing.joined()),
                (Some(name), None) => f.write_str(&unknown_line(name, &req.listing)),
                (Some(name), Some(sub)) => write!(
                    f,
                    "usage: {} {name}{}",
                    req.invocation,
                    synopsis(sub.get_params())
                ),
            },
        }
    }
}

impl std::error::Error for UsageError {}

fn unknown_line(name: &str, listing: &Listing) -> String {
    format!(
        "unknown subcommand \"{name}\", want one of: {}",
        listing.joined()
    )
}

/// Splits a flag doc into its value placeholder and display text.
///
/// The first backquoted word is the placeholder and loses its quotes in the
/// text. Otherwise the placeholder comes from the kind.
pub fn unquote_usage(param: &Param) -> (String, String) {
    let doc = &param.doc;
    if let Some(start) = doc.find('`') {
        if let Some(len) = doc[start + 1..].find('`') {
            let name = &doc[start + 1..start + 1 + len];
            let text = format!("{}{}{}", &doc[..start], name, &doc[start + 2 + len..]);
            return (name.to_string(), text);
        }
    }
    (param.kind.placeholder().to_string(), doc.clone())
}

/// Flags sorted by name.
fn sorted_flags(params: &[Param]) -> Vec<&Param> {
    let (flags, _) = split_params(params);
    let mut flags: Vec<&Param> = flags.iter().collect();
    flags.sort_by(|a, b| a.display_name().cmp(b.display_name()));
    flags
}

/// ` [-flag] [-flag value] required [optional]`
pub fn synopsis(params: &[Param]) -> String {
    let mut out = String::new();
    for flag in sorted_flags(params) {
        let (placeholder, _) = unquote_usage(flag);
        if placeholder.is_empty() {
            let _ = write!(out, " [-{}]", flag.display_name());
        } else {
            let _ = write!(out, " [-{} {placeholder}]", flag.display_name());
        }
    }
    let (_, positionals) = split_params(params);
    for param in positionals {
        if param.is_optional() {
            let _ = write!(out, " [{}]", param.display_name());
        } else {
            let _ = write!(out, " {}", param.display_name());
        }
    }
    out
}

/// One line per flag, the docs aligned after the longest `-flag value`.
pub fn flag_table(params: &[Param]) -> String {
    let rows: Vec<(String, String)> = sorted_flags(params)
        .into_iter()
        .map(|flag| {
            let (placeholder, text) = unquote_usage(flag);
            let entry = if placeholder.is_empty() {
                flag.display_name().to_string()
            } else {
                format!("{} {placeholder}", flag.display_name())
            };
            (entry, text)
        })
        .collect();

    let width = rows.iter().map(|(e, _)| e.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for (entry, text) in rows {
        let _ = writeln!(out, "-{entry:<width$}  {text}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::Kind;

    fn params() -> Vec<Param> {
        vec![
            Param::flag("a1", Kind::Bool).doc("the a1 flag"),
            Param::flag("a2", Kind::Int64).doc("the a2 flag"),
            Param::flag("a3", Kind::String).doc("a `word` flag"),
            Param::positional("a4", Kind::String),
            Param::optional("a5", Kind::String),
        ]
    }

    #[test]
    fn test_unquote_usage() {
        let p = Param::flag("x", Kind::String).doc("a `word` flag");
        assert_eq!(unquote_usage(&p), ("word".into(), "a word flag".into()));

        let p = Param::flag("x", Kind::Duration).doc("how long");
        assert_eq!(unquote_usage(&p), ("duration".into(), "how long".into()));

        let p = Param::flag("x", Kind::Bool).doc("on or off");
        assert_eq!(unquote_usage(&p), ("".into(), "on or off".into()));

        let p = Param::flag("x", Kind::Int32).doc("unbalanced `quote");
        assert_eq!(unquote_usage(&p).0, "int");
    }

    #[test]
    fn test_synopsis() {
        assert_eq!(synopsis(&params()), " [-a1] [-a2 int] [-a3 word] a4 [a5]");
    }

    #[test]
    fn test_synopsis_sorts_flags() {
        let params = vec![Param::flag("z", Kind::Bool), Param::flag("b", Kind::Uint64)];
        assert_eq!(synopsis(&params), " [-b uint] [-z]");
    }

    #[test]
    fn test_flag_table() {
        assert_eq!(
            flag_table(&params()),
            "-a1       the a1 flag\n-a2 int   the a2 flag\n-a3 word  a word flag\n"
        );
    }
}
