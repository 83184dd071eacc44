//! Bindable parameter values.
//!
//! [`FieldValue`] is the value type carried by update payloads and by the
//! parameter lists of [`Sql`](crate::Sql) and [`Query`](crate::Query). It keeps
//! the JSON shape a caller supplied (string, integer, decimal, boolean, null)
//! and only decides on a wire encoding when Postgres tells it the column type.

use crate::error::{JoblyError, JoblyResult};
use bytes::BytesMut;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::error::Error;
use std::str::FromStr;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A single positional parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short type name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Decimal(_) => "number",
            Self::Text(_) => "string",
        }
    }
}

impl TryFrom<serde_json::Value> for FieldValue {
    type Error = JoblyError;

    fn try_from(value: serde_json::Value) -> JoblyResult<Self> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::String(s) => Ok(Self::Text(s)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Ok(Self::Int(i));
                }
                let raw = n.to_string();
                Decimal::from_str(&raw)
                    .or_else(|_| Decimal::from_scientific(&raw))
                    .map(Self::Decimal)
                    .map_err(|_| JoblyError::bad_request(format!("number out of range: {raw}")))
            }
            Value::Array(_) | Value::Object(_) => Err(JoblyError::bad_request(
                "nested arrays and objects are not valid field values",
            )),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<Decimal> for FieldValue {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

fn mismatch(value: &FieldValue, ty: &Type) -> Box<dyn Error + Sync + Send> {
    format!("cannot bind {} value to column of type {}", value.kind(), ty).into()
}

impl ToSql for FieldValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Self::Null => Ok(IsNull::Yes),
            Self::Bool(b) => match *ty {
                Type::BOOL => b.to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            Self::Int(n) => match *ty {
                Type::INT2 => i16::try_from(*n)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*n)?.to_sql(ty, out),
                Type::INT8 => n.to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*n).to_sql(ty, out),
                Type::FLOAT8 => (*n as f64).to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            Self::Decimal(d) => match *ty {
                Type::NUMERIC => d.to_sql(ty, out),
                Type::FLOAT8 => d
                    .to_f64()
                    .ok_or("decimal out of range for float8")?
                    .to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            Self::Text(s) => match *ty {
                // Equity and other decimal columns arrive as strings in JSON.
                Type::NUMERIC => Decimal::from_str(s)?.to_sql(ty, out),
                _ if <&str as ToSql>::accepts(ty) => s.as_str().to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::BOOL | Type::INT2 | Type::INT4 | Type::INT8 | Type::NUMERIC | Type::FLOAT8
        ) || <&str as ToSql>::accepts(ty)
    }

    tokio_postgres::types::to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_values_keep_their_shape() {
        assert_eq!(FieldValue::try_from(json!(null)).unwrap(), FieldValue::Null);
        assert_eq!(
            FieldValue::try_from(json!("0.05")).unwrap(),
            FieldValue::Text("0.05".into())
        );
        assert_eq!(FieldValue::try_from(json!(5)).unwrap(), FieldValue::Int(5));
        assert_eq!(
            FieldValue::try_from(json!(0.5)).unwrap(),
            FieldValue::Decimal(Decimal::new(5, 1))
        );
        assert_eq!(
            FieldValue::try_from(json!(true)).unwrap(),
            FieldValue::Bool(true)
        );
    }

    #[test]
    fn json_containers_are_rejected() {
        assert!(FieldValue::try_from(json!([1, 2])).is_err());
        assert!(FieldValue::try_from(json!({"a": 1})).is_err());
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(FieldValue::from(None::<i32>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(7_i32)), FieldValue::Int(7));
    }

    #[test]
    fn int_binds_to_int4() {
        let mut buf = BytesMut::new();
        let res = FieldValue::Int(50000).to_sql(&Type::INT4, &mut buf).unwrap();
        assert!(matches!(res, IsNull::No));
        assert_eq!(&buf[..], &50000_i32.to_be_bytes());
    }

    #[test]
    fn int_overflowing_int4_is_an_error() {
        let mut buf = BytesMut::new();
        assert!(
            FieldValue::Int(i64::MAX)
                .to_sql(&Type::INT4, &mut buf)
                .is_err()
        );
    }

    #[test]
    fn text_binds_to_numeric_when_parseable() {
        let mut buf = BytesMut::new();
        assert!(
            FieldValue::Text("0.25".into())
                .to_sql(&Type::NUMERIC, &mut buf)
                .is_ok()
        );
        let mut buf = BytesMut::new();
        assert!(
            FieldValue::Text("lots".into())
                .to_sql(&Type::NUMERIC, &mut buf)
                .is_err()
        );
    }

    #[test]
    fn null_binds_to_anything() {
        let mut buf = BytesMut::new();
        let res = FieldValue::Null.to_sql(&Type::INT4, &mut buf).unwrap();
        assert!(matches!(res, IsNull::Yes));
        assert!(buf.is_empty());
    }

    #[test]
    fn mismatched_types_are_rejected() {
        let mut buf = BytesMut::new();
        assert!(FieldValue::Bool(true).to_sql(&Type::INT4, &mut buf).is_err());
        assert!(
            FieldValue::Text("x".into())
                .to_sql(&Type::INT4, &mut buf)
                .is_err()
        );
    }
}
