//! SQL logging via `tracing`.
//!
//! [`TracingClient`] wraps any [`GenericClient`] and emits one event per
//! statement on the `jobly.sql` target: the tag, the (possibly truncated) SQL,
//! the parameter count, the elapsed time, and the outcome. Parameter values are
//! never logged.
//!
//! ```ignore
//! use jobly::{Job, JobFilter, TracingClient};
//!
//! let conn = TracingClient::new(pool.get().await?).level(tracing::Level::INFO);
//! let jobs = Job::find_all(&conn, &JobFilter::new().min_salary(50_000)).await?;
//! ```

use crate::client::GenericClient;
use crate::error::JoblyResult;
use std::time::{Duration, Instant};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::Level;

/// Truncate to at most `max_bytes`, backing off to a char boundary.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// A client wrapper that logs every statement it runs.
#[derive(Debug, Clone)]
pub struct TracingClient<C> {
    inner: C,
    /// Tracing event level for successful statements. Failures log at `WARN`
    /// unless this is already `WARN` or `ERROR`.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl<C> TracingClient<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    fn emit<T>(
        &self,
        tag: Option<&str>,
        sql: &str,
        param_count: usize,
        elapsed: Duration,
        result: &JoblyResult<T>,
        rows: impl FnOnce(&T) -> u64,
    ) {
        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    _ => tracing::trace!($($field)*),
                }
            };
        }

        let tag = tag.unwrap_or("-");
        let sql = self.truncate_sql(sql);
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        match result {
            Ok(value) => emit_at_level!(
                self.level,
                target: "jobly.sql",
                tag,
                param_count,
                rows = rows(value),
                elapsed_ms,
                sql = %sql,
            ),
            Err(err) => emit_at_level!(
                self.level.min(Level::WARN),
                target: "jobly.sql",
                tag,
                param_count,
                elapsed_ms,
                sql = %sql,
                error = %err,
            ),
        }
    }
}

impl<C: GenericClient> GenericClient for TracingClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<Vec<Row>> {
        let start = Instant::now();
        let result = self.inner.query(sql, params).await;
        self.emit(None, sql, params.len(), start.elapsed(), &result, |rows| {
            rows.len() as u64
        });
        result
    }

    async fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<Vec<Row>> {
        let start = Instant::now();
        let result = self.inner.query_tagged(tag, sql, params).await;
        self.emit(Some(tag), sql, params.len(), start.elapsed(), &result, |rows| {
            rows.len() as u64
        });
        result
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<u64> {
        let start = Instant::now();
        let result = self.inner.execute(sql, params).await;
        self.emit(None, sql, params.len(), start.elapsed(), &result, |n| *n);
        result
    }

    async fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<u64> {
        let start = Instant::now();
        let result = self.inner.execute_tagged(tag, sql, params).await;
        self.emit(Some(tag), sql, params.len(), start.elapsed(), &result, |n| *n);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_sql_bytes("SELECT 1", 100), "SELECT 1");
        assert_eq!(truncate_sql_bytes("SELECT 1", 6), "SELECT");
        // 'é' is two bytes; cutting inside it backs off.
        assert_eq!(truncate_sql_bytes("café", 4), "caf");
        assert_eq!(truncate_sql_bytes("é", 1), "");
    }

    #[test]
    fn long_sql_gets_an_ellipsis() {
        let client = TracingClient::new(()).max_sql_length(10);
        assert_eq!(client.truncate_sql("SELECT * FROM jobs"), "SELECT * F...");
        assert_eq!(client.truncate_sql("SELECT 1"), "SELECT 1");

        let client = client.no_truncate();
        assert_eq!(client.truncate_sql("SELECT * FROM jobs"), "SELECT * FROM jobs");
    }

    #[test]
    fn defaults() {
        let client = TracingClient::new(());
        assert_eq!(client.level, Level::DEBUG);
        assert_eq!(client.max_sql_length, Some(200));
        let client = client.level(Level::INFO);
        assert_eq!(client.level, Level::INFO);
    }
}
