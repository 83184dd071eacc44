//! Listing filters.
//!
//! Each filter turns its active criteria into an ordered list of
//! [`Predicate`]s (one condition plus one bound value each). Rendering joins
//! the conditions with `AND` and binds the values in the same order, so the
//! placeholder numbers always line up with the parameter list no matter which
//! criteria are present.

mod company;
mod job;


pub use company::CompanyFilter;
pub use job::JobFilter;

use crate::error::{JoblyError, JoblyResult};
use crate::sql::Sql;
use crate::value::FieldValue;
use serde::de::{self, Deserialize, Deserializer};

/// One filter condition and the value bound to its placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    condition: &'static str,
    value: FieldValue,
}

impl Predicate {
    /// `condition` is the SQL left of the placeholder, e.g. `salary >=`.
    pub fn new(condition: &'static str, value: impl Into<FieldValue>) -> Self {
        Self {
            condition,
            value: value.into(),
        }
    }

    pub fn condition(&self) -> &'static str {
        self.condition
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }
}

/// Append ` WHERE <p1> AND <p2> ...`; a no-op for an empty list.
pub(crate) fn push_where(q: &mut Sql, predicates: Vec<Predicate>) {
    for (i, predicate) in predicates.into_iter().enumerate() {
        q.push(if i == 0 { " WHERE " } else { " AND " });
        q.push(predicate.condition).push(" ").push_bind(predicate.value);
    }
}

/// `%needle%` for a case-insensitive substring match.
///
/// LIKE wildcards in the needle are escaped so they match literally.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for ch in needle.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

pub(crate) fn parse_count(key: &str, raw: &str) -> JoblyResult<i32> {
    let n: i32 = raw
        .trim()
        .parse()
        .map_err(|_| JoblyError::bad_request(format!("{key} must be an integer")))?;
    check_count(key, n)
}

fn check_count(key: &str, n: i32) -> JoblyResult<i32> {
    if n < 0 {
        return Err(JoblyError::bad_request(format!("{key} must be >= 0")));
    }
    Ok(n)
}

/// Serde counterpart of [`parse_count`] for optional count fields.
pub(crate) fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i32>::deserialize(deserializer)?
        .map(|n| check_count("value", n))
        .transpose()
        .map_err(de::Error::custom)
}

pub(crate) fn parse_flag(key: &str, raw: &str) -> JoblyResult<bool> {
    match raw.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(JoblyError::bad_request(format!(
            "{key} must be true or false"
        ))),
    }
}
