//! Parameter descriptors.
//!
//! A [`Param`] name beginning with `-` declares a flag; any other name is a
//! positional argument, optional when it ends in `?`. Flags must form a
//! leading run of the list.

use crate::coerce;
use crate::error::ParamDefaultError;
use crate::kind::Kind;
use crate::value::{DefaultValue, Value};

pub const FLAG_PREFIX: char = '-';
pub const OPTIONAL_SUFFIX: char = '?';

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub kind: Kind,
    pub default: DefaultValue,
    pub doc: String,
}

impl Param {
    /// Creates a parameter from a raw name such as `-verbose`, `file` or `count?`.
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: DefaultValue::Unset,
            doc: String::new(),
        }
    }

    /// A flag parameter; the `-` prefix is added.
    pub fn flag(name: &str, kind: Kind) -> Self {
        Self::new(format!("{FLAG_PREFIX}{name}"), kind)
    }

    /// A required positional parameter.
    pub fn positional(name: impl Into<String>, kind: Kind) -> Self {
        Self::new(name, kind)
    }

    /// An optional positional parameter; the `?` suffix is added.
    pub fn optional(name: &str, kind: Kind) -> Self {
        Self::new(format!("{name}{OPTIONAL_SUFFIX}"), kind)
    }

    pub fn default(mut self, value: impl Into<DefaultValue>) -> Self {
        self.default = value.into();
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn is_flag(&self) -> bool {
        self.name.starts_with(FLAG_PREFIX)
    }

    /// Flags are always optional.
    pub fn is_optional(&self) -> bool {
        self.is_flag() || self.name.ends_with(OPTIONAL_SUFFIX)
    }

    /// The name with its flag prefix or optional suffix removed.
    pub fn display_name(&self) -> &str {
        if self.is_flag() {
            self.name.trim_start_matches(FLAG_PREFIX)
        } else {
            self.name
                .strip_suffix(OPTIONAL_SUFFIX)
                .unwrap_or(&self.name)
        }
    }

    /// The name a flag is addressed by on the command line.
    pub fn flag_name(&self) -> Option<&str> {
        self.is_flag().then(|| self.display_name())
    }

    /// The default coerced into this parameter's kind.
    ///
    /// Custom prototypes come back as a fresh clone.
    pub fn coerced_default(&self) -> Result<Value, ParamDefaultError> {
        coerce::as_value(self.kind, &self.default).map_err(|source| ParamDefaultError {
            param: self.name.clone(),
            kind: self.kind,
            source,
        })
    }
}

/// Builds a parameter list from `name, kind, default, doc` groups.
///
/// ```
/// use subcmd::{params, Kind};
///
/// let list = params![
///     "-verbose", Kind::Bool, false, "be chatty",
///     "file", Kind::String, "", "input file",
///     "count?", Kind::Int32, 1, "how many",
/// ];
/// assert_eq!(list.len(), 3);
/// assert!(list[0].is_flag());
/// ```
#[macro_export]
macro_rules! params {
    ($($name:expr, $kind:expr, $default:expr, $doc:expr),* $(,)?) => {
        vec![$($crate::Param::new($name, $kind).default($default).doc($doc)),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_names() {
        let flag = Param::flag("verbose", Kind::Bool);
        assert_eq!(flag.name, "-verbose");
        assert!(flag.is_flag());
        assert!(flag.is_optional());
        assert_eq!(flag.flag_name(), Some("verbose"));

        let required = Param::positional("file", Kind::String);
        assert!(!required.is_flag());
        assert!(!required.is_optional());
        assert_eq!(required.flag_name(), None);

        let optional = Param::optional("count", Kind::Int32);
        assert_eq!(optional.name, "count?");
        assert!(optional.is_optional());
        assert_eq!(optional.display_name(), "count");
    }

    #[test]
    fn test_double_dash_flag_names() {
        let flag = Param::new("--dry-run", Kind::Bool);
        assert_eq!(flag.flag_name(), Some("dry-run"));
    }

    #[test]
    fn test_coerced_default_names_param() {
        let p = Param::flag("n", Kind::Int32).default(7i64);
        let err = p.coerced_default().unwrap_err();
        assert_eq!(err.param, "-n");
        assert_eq!(err.kind, Kind::Int32);

        let p = Param::optional("n", Kind::Int32).default(7);
        assert_eq!(p.coerced_default().unwrap(), Value::Int32(7));
    }

    #[test]
    fn test_params_macro() {
        let list = params![
            "-a", Kind::Bool, false, "flag a",
            "b?", Kind::Uint64, 3u64, "",
        ];
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].doc, "flag a");
        assert_eq!(list[1].coerced_default().unwrap(), Value::Uint64(3));
    }
}
