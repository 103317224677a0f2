//! Coercion of declared defaults into their parameter's kind.
//!
//! Each helper accepts exactly the dynamic types that fit the target kind
//! without loss and fails otherwise. [`DefaultValue::Unset`] coerces to the
//! kind's zero value, except for custom kinds, which need a prototype.

use std::time::Duration;

use crate::error::CoercionError;
use crate::kind::Kind;
use crate::value::{CustomValue, DefaultValue, Value};

fn incompatible(want: Kind, got: &DefaultValue) -> CoercionError {
    CoercionError::Incompatible {
        want,
        got: got.type_name(),
    }
}

fn negative(want: Kind, got: &DefaultValue) -> CoercionError {
    CoercionError::Negative {
        want,
        got: got.type_name(),
    }
}

pub fn as_bool(v: &DefaultValue) -> Result<bool, CoercionError> {
    match v {
        DefaultValue::Unset => Ok(false),
        DefaultValue::Bool(b) => Ok(*b),
        other => Err(incompatible(Kind::Bool, other)),
    }
}

pub fn as_string(v: &DefaultValue) -> Result<String, CoercionError> {
    match v {
        DefaultValue::Unset => Ok(String::new()),
        DefaultValue::Str(s) => Ok(s.clone()),
        other => Err(incompatible(Kind::String, other)),
    }
}

pub fn as_int32(v: &DefaultValue) -> Result<i32, CoercionError> {
    match *v {
        DefaultValue::Unset => Ok(0),
        DefaultValue::I8(n) => Ok(n.into()),
        DefaultValue::I16(n) => Ok(n.into()),
        DefaultValue::I32(n) => Ok(n),
        DefaultValue::U8(n) => Ok(n.into()),
        DefaultValue::U16(n) => Ok(n.into()),
        ref other => Err(incompatible(Kind::Int32, other)),
    }
}

pub fn as_int64(v: &DefaultValue) -> Result<i64, CoercionError> {
    match *v {
        DefaultValue::Unset => Ok(0),
        DefaultValue::I8(n) => Ok(n.into()),
        DefaultValue::I16(n) => Ok(n.into()),
        DefaultValue::I32(n) => Ok(n.into()),
        DefaultValue::I64(n) => Ok(n),
        // isize is at most 64 bits on every supported target.
        DefaultValue::Isize(n) => Ok(n as i64),
        DefaultValue::U8(n) => Ok(n.into()),
        DefaultValue::U16(n) => Ok(n.into()),
        DefaultValue::U32(n) => Ok(n.into()),
        ref other => Err(incompatible(Kind::Int64, other)),
    }
}

pub fn as_uint32(v: &DefaultValue) -> Result<u32, CoercionError> {
    match *v {
        DefaultValue::Unset => Ok(0),
        DefaultValue::U8(n) => Ok(n.into()),
        DefaultValue::U16(n) => Ok(n.into()),
        DefaultValue::U32(n) => Ok(n),
        DefaultValue::I8(n) => u32::try_from(n).map_err(|_| negative(Kind::Uint32, v)),
        DefaultValue::I16(n) => u32::try_from(n).map_err(|_| negative(Kind::Uint32, v)),
        ref other => Err(incompatible(Kind::Uint32, other)),
    }
}

pub fn as_uint64(v: &DefaultValue) -> Result<u64, CoercionError> {
    match *v {
        DefaultValue::Unset => Ok(0),
        DefaultValue::U8(n) => Ok(n.into()),
        DefaultValue::U16(n) => Ok(n.into()),
        DefaultValue::U32(n) => Ok(n.into()),
        DefaultValue::U64(n) => Ok(n),
        DefaultValue::Usize(n) => Ok(n as u64),
        DefaultValue::I8(n) => u64::try_from(n).map_err(|_| negative(Kind::Uint64, v)),
        DefaultValue::I16(n) => u64::try_from(n).map_err(|_| negative(Kind::Uint64, v)),
        DefaultValue::I32(n) => u64::try_from(n).map_err(|_| negative(Kind::Uint64, v)),
        DefaultValue::I64(n) => u64::try_from(n).map_err(|_| negative(Kind::Uint64, v)),
        DefaultValue::Isize(n) => u64::try_from(n).map_err(|_| negative(Kind::Uint64, v)),
        ref other => Err(incompatible(Kind::Uint64, other)),
    }
}

pub fn as_float64(v: &DefaultValue) -> Result<f64, CoercionError> {
    match *v {
        DefaultValue::Unset => Ok(0.0),
        DefaultValue::I8(n) => Ok(n.into()),
        DefaultValue::I16(n) => Ok(n.into()),
        DefaultValue::I32(n) => Ok(n.into()),
        DefaultValue::I64(n) => Ok(n as f64),
        DefaultValue::Isize(n) => Ok(n as f64),
        DefaultValue::U8(n) => Ok(n.into()),
        DefaultValue::U16(n) => Ok(n.into()),
        DefaultValue::U32(n) => Ok(n.into()),
        DefaultValue::U64(n) => Ok(n as f64),
        DefaultValue::Usize(n) => Ok(n as f64),
        DefaultValue::F32(n) => Ok(n.into()),
        DefaultValue::F64(n) => Ok(n),
        ref other => Err(incompatible(Kind::Float64, other)),
    }
}

/// Durations, or integers taken as a nanosecond count.
pub fn as_duration(v: &DefaultValue) -> Result<Duration, CoercionError> {
    if let DefaultValue::Duration(d) = v {
        return Ok(*d);
    }
    let nanos = as_int64(v).map_err(|_| incompatible(Kind::Duration, v))?;
    let nanos = u64::try_from(nanos).map_err(|_| negative(Kind::Duration, v))?;
    Ok(Duration::from_nanos(nanos))
}

/// A fresh clone of the custom prototype.
pub fn as_custom(v: &DefaultValue) -> Result<Box<dyn CustomValue>, CoercionError> {
    match v {
        DefaultValue::Custom(proto) => Ok(proto.clone_value()),
        DefaultValue::Unset => Err(CoercionError::MissingPrototype),
        other => Err(incompatible(Kind::Custom, other)),
    }
}

/// Coerces `v` into a [`Value`] of `kind`.
pub fn as_value(kind: Kind, v: &DefaultValue) -> Result<Value, CoercionError> {
    Ok(match kind {
        Kind::Bool => Value::Bool(as_bool(v)?),
        Kind::Int32 => Value::Int32(as_int32(v)?),
        Kind::Int64 => Value::Int64(as_int64(v)?),
        Kind::Uint32 => Value::Uint32(as_uint32(v)?),
        Kind::Uint64 => Value::Uint64(as_uint64(v)?),
        Kind::String => Value::String(as_string(v)?),
        Kind::Float64 => Value::Float64(as_float64(v)?),
        Kind::Duration => Value::Duration(as_duration(v)?),
        Kind::Custom => Value::Custom(as_custom(v)?),
    })
}
