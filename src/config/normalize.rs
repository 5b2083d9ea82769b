//! YAML to JSON-safe value normalization.
//!
//! Configuration documents are parsed as YAML but stored and exported as
//! plain JSON data. Normalization happens exactly once, at load time, through
//! [`normalize`] -- nothing YAML-specific (tags, non-string mapping keys,
//! non-finite floats) survives into an [`crate::config::EnvStore`].

use serde_json::Value;
use thiserror::Error;

/// A YAML construct that has no JSON-safe representation.
#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("tagged value '{0}' is not representable as JSON")]
    TaggedValue(String),

    #[error("mapping key is not a scalar")]
    NonScalarKey,

    #[error("non-finite number is not representable as JSON")]
    NonFiniteNumber,
}

/// Convert a YAML value into JSON-safe data.
///
/// - Scalars map across directly; integers stay integers.
/// - Sequences and mappings are converted recursively.
/// - Mapping keys must be scalars and are coerced to their YAML string
///   rendering (`true`, `8080`, `~`).
/// - Tagged values and non-finite floats are rejected.
pub fn normalize(value: serde_yaml::Value) -> Result<Value, NormalizeError> {
    match value {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_yaml::Value::Number(n) => normalize_number(&n),
        serde_yaml::Value::String(s) => Ok(Value::String(s)),
        serde_yaml::Value::Sequence(seq) => {
            let items = seq.into_iter().map(normalize).collect::<Result<_, _>>()?;
            Ok(Value::Array(items))
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut object = serde_json::Map::new();
            for (key, val) in mapping {
                object.insert(key_to_string(&key)?, normalize(val)?);
            }
            Ok(Value::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => {
            Err(NormalizeError::TaggedValue(tagged.tag.to_string()))
        }
    }
}

fn normalize_number(n: &serde_yaml::Number) -> Result<Value, NormalizeError> {
    if let Some(i) = n.as_i64() {
        Ok(Value::Number(i.into()))
    } else if let Some(u) = n.as_u64() {
        Ok(Value::Number(u.into()))
    } else {
        let f = n.as_f64().ok_or(NormalizeError::NonFiniteNumber)?;
        serde_json::Number::from_f64(f)
            .map(Value::Number)
            .ok_or(NormalizeError::NonFiniteNumber)
    }
}

/// Coerce a scalar mapping key to its string rendering.
pub fn key_to_string(key: &serde_yaml::Value) -> Result<String, NormalizeError> {
    match key {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Null => Ok("~".to_string()),
        _ => Err(NormalizeError::NonScalarKey),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn yaml(text: &str) -> serde_yaml::Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(normalize(yaml("hello")).unwrap(), json!("hello"));
        assert_eq!(normalize(yaml("42")).unwrap(), json!(42));
        assert_eq!(normalize(yaml("true")).unwrap(), json!(true));
        assert_eq!(normalize(yaml("~")).unwrap(), Value::Null);
    }

    #[test]
    fn test_nested_collections() {
        let value = normalize(yaml("a:\n  b: [1, 2]\n  c: x")).unwrap();
        assert_eq!(value, json!({"a": {"b": [1, 2], "c": "x"}}));
    }

    #[test]
    fn test_scalar_keys_coerced_to_strings() {
        let value = normalize(yaml("1: one\ntrue: yes")).unwrap();
        assert_eq!(value, json!({"1": "one", "true": "yes"}));
    }

    #[test]
    fn test_tagged_value_rejected() {
        let err = normalize(yaml("!custom data")).unwrap_err();
        assert!(matches!(err, NormalizeError::TaggedValue(_)));
    }

    #[test]
    fn test_sequence_key_rejected() {
        let err = normalize(yaml("[1, 2]: value")).unwrap_err();
        assert!(matches!(err, NormalizeError::NonScalarKey));
    }

    #[test]
    fn test_float_preserved() {
        assert_eq!(normalize(yaml("3.5")).unwrap(), json!(3.5));
    }
}
