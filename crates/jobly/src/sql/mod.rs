//! Dynamic SQL builder.
//!
//! - `query()` is great when you already have a full SQL string with `$1, $2...`.
//! - `Sql` is great when you want to *compose* SQL dynamically without manually
//!   tracking placeholder indices.
//!
//! # Example
//!
//! ```ignore
//! use jobly::sql;
//!
//! let mut q = sql("SELECT id, title FROM jobs WHERE 1=1");
//! if let Some(min) = min_salary {
//!     q.push(" AND salary >= ").push_bind(min);
//! }
//! q.push(" ORDER BY salary DESC");
//!
//! let jobs: Vec<Job> = q.fetch_all_as(&conn).await?;
//! ```

#[macro_use]
mod exec_macros;

mod builder;
mod parts;
mod query;


pub use builder::Sql;
pub use query::Query;

/// Build a SQL query from a pre-numbered SQL string (`$1, $2, ...`).
pub fn query(initial_sql: impl Into<String>) -> Query {
    Query::new(initial_sql)
}

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}

pub(crate) fn starts_with_keyword(s: &str, keyword: &str) -> bool {
    match s.get(0..keyword.len()) {
        Some(prefix) => prefix.eq_ignore_ascii_case(keyword),
        None => false,
    }
}
