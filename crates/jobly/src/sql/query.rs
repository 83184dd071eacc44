use crate::value::FieldValue;
use tokio_postgres::types::ToSql;

/// A SQL string with pre-numbered placeholders (`$1, $2, ...`) plus bound parameters.
///
/// Use this when you already have a complete SQL string and just want to bind
/// values, e.g. an `UPDATE` assembled around a
/// [`PartialUpdate`](crate::PartialUpdate) set clause.
#[must_use]
#[derive(Debug, Clone)]
pub struct Query {
    sql: String,
    params: Vec<FieldValue>,
    tag: Option<String>,
}

impl Query {
    /// Create a new pre-numbered query.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            tag: None,
        }
    }

    /// Associate a tag for logging.
    ///
    /// # Example
    /// ```ignore
    /// let job: Job = jobly::query("SELECT id, title FROM jobs WHERE id = $1")
    ///     .tag("jobs.get")
    ///     .bind(1_i32)
    ///     .fetch_one_as(&client)
    ///     .await?;
    /// ```
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Bind a parameter value.
    ///
    /// This does not modify the SQL string; it only appends the value to the
    /// parameter list. The SQL string must already contain `$1, $2, ...`.
    pub fn bind(mut self, value: impl Into<FieldValue>) -> Self {
        self.params.push(value.into());
        self
    }

    /// Bind several values in order.
    pub fn bind_all(mut self, values: impl IntoIterator<Item = FieldValue>) -> Self {
        self.params.extend(values);
        self
    }

    /// Access the SQL string.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bound values in placeholder order.
    pub fn params(&self) -> &[FieldValue] {
        &self.params
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect()
    }

    impl_query_exec! {
        prepare(self) {
            let sql = self.sql.as_str();
            let params = self.params_ref();
            let tag = self.tag.as_deref();
            (sql, params, tag)
        }
    }
}
