//! Parameter values for positional and named queries.

use crate::error::{DbError, DbResult};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// A parameter value for parameterized queries.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (stored as i64 for maximum range)
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    Text(String),
    /// Binary data
    Bytes(Vec<u8>),
}

impl SqlValue {
    /// Check if this parameter is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the type name of this parameter for debugging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
        }
    }

    /// Convert a JSON value into a parameter.
    ///
    /// Arrays and objects have no portable SQL representation and are bound
    /// as their JSON text. Numbers that don't fit an `i64` become floats.
    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => Self::Text(s),
            other @ (JsonValue::Array(_) | JsonValue::Object(_)) => Self::Text(other.to_string()),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),+) => {
        $(
            impl From<$t> for SqlValue {
                fn from(v: $t) -> Self {
                    Self::Int(i64::from(v))
                }
            }
        )+
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<&[u8]> for SqlValue {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Build a `Vec<SqlValue>` from heterogeneous expressions.
///
/// ```
/// use dbutil::sql_args;
/// let args = sql_args![1, "two", None::<i64>];
/// assert_eq!(args.len(), 3);
/// ```
#[macro_export]
macro_rules! sql_args {
    () => { ::std::vec::Vec::<$crate::models::SqlValue>::new() };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::models::SqlValue::from($arg)),+]
    };
}

/// Named parameter values, looked up by the names found in a `:name` query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedArgs(HashMap<String, SqlValue>);

impl NamedArgs {
    /// Serialize a struct or map into named parameters.
    ///
    /// Field names become parameter names (serde renames apply).
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> DbResult<Self> {
        let json = serde_json::to_value(value)
            .map_err(|e| DbError::invalid_input(format!("Cannot serialize named args: {e}")))?;
        match json {
            JsonValue::Object(map) => Ok(Self(
                map.into_iter()
                    .map(|(k, v)| (k, SqlValue::from_json(v)))
                    .collect(),
            )),
            other => Err(DbError::invalid_input(format!(
                "Named args must serialize to an object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Add or replace a single value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<SqlValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.0.get(name)
    }

    /// Order values by `names`, failing on the first missing one.
    pub fn bind_order(&self, names: &[String]) -> DbResult<Vec<SqlValue>> {
        names
            .iter()
            .map(|name| {
                self.get(name).cloned().ok_or_else(|| {
                    DbError::invalid_input(format!("Missing value for named parameter ':{name}'"))
                })
            })
            .collect()
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Person {
        name: String,
        age: u32,
        #[serde(rename = "mail")]
        email: Option<String>,
    }

    #[test]
    fn test_sql_value_types() {
        assert!(SqlValue::Null.is_null());
        assert!(!SqlValue::Bool(true).is_null());
        assert_eq!(SqlValue::Int(42).type_name(), "int");
        assert_eq!(SqlValue::from("hello").type_name(), "text");
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(SqlValue::from(7u8), SqlValue::Int(7));
        assert_eq!(SqlValue::from(None::<i32>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some("x")), SqlValue::Text("x".to_string()));
        assert_eq!(SqlValue::from(1.5f32), SqlValue::Float(1.5));
    }

    #[test]
    fn test_sql_args_macro() {
        let args = sql_args![1, "two", false, None::<i64>];
        assert_eq!(
            args,
            vec![
                SqlValue::Int(1),
                SqlValue::Text("two".to_string()),
                SqlValue::Bool(false),
                SqlValue::Null,
            ]
        );
        assert!(sql_args![].is_empty());
    }

    #[test]
    fn test_from_json_nested_becomes_text() {
        let value = SqlValue::from_json(serde_json::json!({"a": [1, 2]}));
        assert_eq!(value, SqlValue::Text(r#"{"a":[1,2]}"#.to_string()));
        assert_eq!(
            SqlValue::from_json(serde_json::json!(u64::MAX)),
            SqlValue::Float(u64::MAX as f64)
        );
    }

    #[test]
    fn test_named_args_from_struct() {
        let args = NamedArgs::from_serialize(&Person {
            name: "ada".to_string(),
            age: 36,
            email: None,
        })
        .unwrap();
        assert_eq!(args.get("name"), Some(&SqlValue::Text("ada".to_string())));
        assert_eq!(args.get("age"), Some(&SqlValue::Int(36)));
        assert_eq!(args.get("mail"), Some(&SqlValue::Null));
        assert_eq!(args.get("email"), None);
    }

    #[test]
    fn test_named_args_rejects_non_object() {
        let err = NamedArgs::from_serialize(&vec![1, 2]).unwrap_err();
        assert!(err.to_string().contains("got array"));
    }

    #[test]
    fn test_bind_order_reports_missing_name() {
        let mut args = NamedArgs::default();
        args.insert("a", 1);
        let names = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        let err = args.bind_order(&names).unwrap_err();
        assert!(err.to_string().contains(":b"));

        args.insert("b", "x");
        let ordered = args.bind_order(&names).unwrap();
        assert_eq!(
            ordered,
            vec![
                SqlValue::Int(1),
                SqlValue::Text("x".to_string()),
                SqlValue::Int(1)
            ]
        );
    }
}
