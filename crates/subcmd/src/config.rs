//! Parameter lists declared in YAML or JSON.
//!
//! Each entry has a `name`, a `kind` label (see [`Kind`]), an optional
//! `default` and an optional `doc`:
//!
//! ```yaml
//! - name: -timeout
//!   kind: duration
//!   default: 30s
//!   doc: how long to wait
//! - name: host
//!   kind: string
//! ```
//!
//! Defaults are converted by kind, so `30s` above becomes a duration and a
//! number given for an `int32` parameter must fit in 32 bits. Custom kinds
//! need a prototype object and cannot be declared this way.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::kind::Kind;
use crate::param::Param;
use crate::value::DefaultValue;

#[derive(Debug, Deserialize)]
struct ParamSpec {
    name: String,
    kind: String,
    #[serde(default)]
    default: serde_json::Value,
    #[serde(default)]
    doc: String,
}

pub fn params_from_yaml(text: &str) -> Result<Vec<Param>, ConfigError> {
    let specs: Vec<ParamSpec> = serde_yaml::from_str(text)?;
    specs.into_iter().map(Param::try_from).collect()
}

pub fn params_from_json(text: &str) -> Result<Vec<Param>, ConfigError> {
    let specs: Vec<ParamSpec> = serde_json::from_str(text)?;
    specs.into_iter().map(Param::try_from).collect()
}

impl TryFrom<ParamSpec> for Param {
    type Error = ConfigError;

    fn try_from(spec: ParamSpec) -> Result<Self, Self::Error> {
        let kind: Kind = spec.kind.parse()?;
        let default = default_for(&spec.name, kind, &spec.default)?;
        Ok(Param::new(spec.name, kind).default(default).doc(spec.doc))
    }
}

fn default_for(
    param: &str,
    kind: Kind,
    value: &serde_json::Value,
) -> Result<DefaultValue, ConfigError> {
    use serde_json::Value as Json;

    if value.is_null() {
        return if kind == Kind::Custom {
            Err(ConfigError::Unsupported {
                param: param.to_string(),
                kind,
            })
        } else {
            Ok(DefaultValue::Unset)
        };
    }

    let converted = match (kind, value) {
        (Kind::Bool, Json::Bool(b)) => Some(DefaultValue::Bool(*b)),
        (Kind::String, Json::String(s)) => Some(DefaultValue::Str(s.clone())),
        (Kind::Int32, Json::Number(n)) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(DefaultValue::I32),
        (Kind::Int64, Json::Number(n)) => n.as_i64().map(DefaultValue::I64),
        (Kind::Uint32, Json::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(DefaultValue::U32),
        (Kind::Uint64, Json::Number(n)) => n.as_u64().map(DefaultValue::U64),
        (Kind::Float64, Json::Number(n)) => n.as_f64().map(DefaultValue::F64),
        (Kind::Duration, Json::Number(n)) => n
            .as_u64()
            .map(|nanos| DefaultValue::Duration(std::time::Duration::from_nanos(nanos))),
        (Kind::Duration, Json::String(s)) => {
            crate::duration::parse(s).ok().map(DefaultValue::Duration)
        }
        (Kind::Custom, _) => {
            return Err(ConfigError::Unsupported {
                param: param.to_string(),
                kind,
            })
        }
        _ => None,
    };

    converted.ok_or_else(|| ConfigError::BadDefault {
        param: param.to_string(),
        kind,
        value: value.to_string(),
    })
}
