//! Runtime values for parameters.
//!
//! [`Value`] is the tagged union of the canonical storage types, one variant
//! per [`Kind`]. [`DefaultValue`] is the looser form a parameter's default is
//! declared in; [`crate::coerce`] turns one into the other.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::duration;
use crate::error::{BoxError, ValueError};
use crate::kind::{self, Kind};

/// A user-defined parameter value.
///
/// `set` parses a token into the value, mutating it; it may be called once per
/// occurrence of a repeated flag. `Display` renders the value back. Binding
/// always works on a fresh clone of a parameter's prototype.
///
/// ```
/// use std::fmt;
/// use subcmd::{BoxError, CustomValue};
///
/// #[derive(Clone, Default)]
/// struct Tags(Vec<String>);
///
/// impl fmt::Display for Tags {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         f.write_str(&self.0.join(","))
///     }
/// }
///
/// impl CustomValue for Tags {
///     fn set(&mut self, token: &str) -> Result<(), BoxError> {
///         self.0.extend(token.split(',').map(str::to_string));
///         Ok(())
///     }
/// }
/// ```
pub trait CustomValue: CloneCustomValue + fmt::Display + Send + Sync + 'static {
    fn set(&mut self, token: &str) -> Result<(), BoxError>;
}

/// Object-safe cloning and downcasting for [`CustomValue`].
///
/// Implemented for every `CustomValue + Clone`; there is no need to implement
/// it by hand.
pub trait CloneCustomValue {
    fn clone_value(&self) -> Box<dyn CustomValue>;
    fn as_any(&self) -> &dyn Any;
}

impl<T: CustomValue + Clone> CloneCustomValue for T {
    fn clone_value(&self) -> Box<dyn CustomValue> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn CustomValue {
    pub fn downcast_ref<T: CustomValue>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }
}

impl Clone for Box<dyn CustomValue> {
    fn clone(&self) -> Self {
        self.clone_value()
    }
}

impl fmt::Debug for dyn CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CustomValue({self})")
    }
}

/// A bound parameter value in its canonical storage type.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Uint32(u32),
    Uint64(u64),
    String(String),
    Float64(f64),
    Duration(Duration),
    Custom(Box<dyn CustomValue>),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::Int32(_) => Kind::Int32,
            Value::Int64(_) => Kind::Int64,
            Value::Uint32(_) => Kind::Uint32,
            Value::Uint64(_) => Kind::Uint64,
            Value::String(_) => Kind::String,
            Value::Float64(_) => Kind::Float64,
            Value::Duration(_) => Kind::Duration,
            Value::Custom(_) => Kind::Custom,
        }
    }

    /// Parses `token` into this value.
    ///
    /// Scalars are replaced; custom values are updated in place through
    /// [`CustomValue::set`]. On error the value is left unchanged for scalars.
    pub fn set(&mut self, token: &str) -> Result<(), ValueError> {
        match self {
            Value::Bool(v) => *v = kind::parse_bool(token)?,
            Value::Int32(v) => *v = kind::parse_i32(token)?,
            Value::Int64(v) => *v = kind::parse_i64(token)?,
            Value::Uint32(v) => *v = kind::parse_u32(token)?,
            Value::Uint64(v) => *v = kind::parse_u64(token)?,
            Value::String(v) => *v = token.to_string(),
            Value::Float64(v) => *v = kind::parse_f64(token)?,
            Value::Duration(v) => *v = kind::parse_duration(token)?,
            Value::Custom(v) => v.set(token).map_err(|source| ValueError::Custom {
                token: token.to_string(),
                source,
            })?,
        }
        Ok(())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Uint32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Value::Duration(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_custom(&self) -> Option<&dyn CustomValue> {
        match self {
            Value::Custom(v) => Some(v.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Uint32(v) => write!(f, "{v}"),
            Value::Uint64(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Duration(v) => f.write_str(&duration::format(*v)),
            Value::Custom(v) => write!(f, "{v}"),
        }
    }
}

/// Custom values compare by their rendering.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Uint32(a), Value::Uint32(b)) => a == b,
            (Value::Uint64(a), Value::Uint64(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

/// A parameter default as declared, before coercion into the parameter's kind.
///
/// Any integer width may be used; [`crate::coerce`] decides which widths fit
/// which kinds. `Unset` stands for the kind's zero value.
#[derive(Debug, Clone, Default)]
pub enum DefaultValue {
    #[default]
    Unset,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    F32(f32),
    F64(f64),
    Str(String),
    Duration(Duration),
    /// A prototype that binding clones and never mutates.
    Custom(Arc<dyn CustomValue>),
}

impl DefaultValue {
    pub fn custom<T: CustomValue>(value: T) -> Self {
        DefaultValue::Custom(Arc::new(value))
    }

    /// Name of the dynamic type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            DefaultValue::Unset => "unset",
            DefaultValue::Bool(_) => "bool",
            DefaultValue::I8(_) => "i8",
            DefaultValue::I16(_) => "i16",
            DefaultValue::I32(_) => "i32",
            DefaultValue::I64(_) => "i64",
            DefaultValue::Isize(_) => "isize",
            DefaultValue::U8(_) => "u8",
            DefaultValue::U16(_) => "u16",
            DefaultValue::U32(_) => "u32",
            DefaultValue::U64(_) => "u64",
            DefaultValue::Usize(_) => "usize",
            DefaultValue::F32(_) => "f32",
            DefaultValue::F64(_) => "f64",
            DefaultValue::Str(_) => "String",
            DefaultValue::Duration(_) => "Duration",
            DefaultValue::Custom(_) => "custom value",
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, DefaultValue::Unset)
    }
}

macro_rules! default_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for DefaultValue {
                fn from(v: $ty) -> Self {
                    DefaultValue::$variant(v)
                }
            }
        )*
    };
}

default_from! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    String => Str,
    Duration => Duration,
}

impl From<&str> for DefaultValue {
    fn from(v: &str) -> Self {
        DefaultValue::Str(v.to_string())
    }
}

impl From<Arc<dyn CustomValue>> for DefaultValue {
    fn from(v: Arc<dyn CustomValue>) -> Self {
        DefaultValue::Custom(v)
    }
}

impl<T: Into<DefaultValue>> From<Option<T>> for DefaultValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(DefaultValue::Unset, Into::into)
    }
}
