//! Partial-update `SET` clause builder.
//!
//! Turns an ordered field → value payload into `"col1"=$1, "col2"=$2` plus the
//! matching value list. Placeholder numbers come from each field's position in
//! the payload, so a caller can append `WHERE id = $N` with
//! `N = values.len() + 1` and never collide.
//!
//! ```ignore
//! use jobly::{ColumnAliases, UpdatePayload, sql_for_partial_update};
//!
//! let mut payload = UpdatePayload::new();
//! payload.set("numEmployees", 5);
//! let aliases = ColumnAliases::new(&[("numEmployees", "num_employees")]);
//!
//! let update = sql_for_partial_update(&payload, &aliases)?;
//! assert_eq!(update.set_clause, r#""num_employees"=$1"#);
//! ```

use crate::error::{JoblyError, JoblyResult};
use crate::ident::Ident;
use crate::value::FieldValue;
use std::fmt::Write as _;

/// Insertion-ordered mapping from logical field name to new value.
///
/// Setting a key that is already present replaces its value in place, so the
/// key keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePayload {
    fields: Vec<(String, FieldValue)>,
}

impl UpdatePayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field` to `value`.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> &mut Self {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == field) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((field, value)),
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for UpdatePayload
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = Self::new();
        for (k, v) in iter {
            payload.set(k, v);
        }
        payload
    }
}

/// Logical field name → storage column name, for fields whose column differs.
///
/// Fields without an entry use their own name as the column name.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnAliases<'a> {
    pairs: &'a [(&'a str, &'a str)],
}

impl<'a> ColumnAliases<'a> {
    pub const fn new(pairs: &'a [(&'a str, &'a str)]) -> Self {
        Self { pairs }
    }

    /// No aliases: every field is its own column.
    pub const fn none() -> Self {
        Self { pairs: &[] }
    }

    /// Resolve the storage column for a logical field.
    pub fn column_for<'f>(&self, field: &'f str) -> &'f str
    where
        'a: 'f,
    {
        self.pairs
            .iter()
            .find(|(logical, _)| *logical == field)
            .map_or(field, |(_, column)| *column)
    }
}

/// Output of [`sql_for_partial_update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialUpdate {
    /// `"col1"=$1, "col2"=$2, ...` in payload order.
    pub set_clause: String,
    /// Payload values in the same order as the placeholders.
    pub values: Vec<FieldValue>,
}

impl PartialUpdate {
    /// Placeholder number for the first parameter after the `SET` values.
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }
}

/// Build a parameterized `SET` clause from a partial update payload.
///
/// Fails with [`JoblyError::NoFields`] when `payload` is empty. Values are
/// passed through as supplied.
pub fn sql_for_partial_update(
    payload: &UpdatePayload,
    aliases: &ColumnAliases<'_>,
) -> JoblyResult<PartialUpdate> {
    if payload.is_empty() {
        return Err(JoblyError::NoFields);
    }

    let mut set_clause = String::new();
    let mut values = Vec::with_capacity(payload.len());
    for (idx, (field, value)) in payload.iter().enumerate() {
        if idx > 0 {
            set_clause.push_str(", ");
        }
        Ident::quoted(aliases.column_for(field))?.write_sql(&mut set_clause);
        let _ = write!(set_clause, "=${}", idx + 1);
        values.push(value.clone());
    }

    Ok(PartialUpdate { set_clause, values })
}
