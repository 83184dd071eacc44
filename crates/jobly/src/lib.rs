//! # jobly
//!
//! The PostgreSQL data layer of a job board.
//!
//! ## Features
//!
//! - **Partial updates**: [`sql_for_partial_update`] turns an ordered payload of
//!   logical field names into a parameterized `SET` clause, mapping names to
//!   storage columns through [`ColumnAliases`]
//! - **Filtered listings**: [`JobFilter`] and [`CompanyFilter`] build their
//!   `WHERE` clause from whichever criteria are present, with placeholders
//!   always numbered `$1..$N` in a fixed order
//! - **Repositories**: `create`/`find_all`/`get`/`update`/`remove` on [`Job`]
//!   and [`Company`] over any [`GenericClient`], so several calls can share a
//!   transaction
//! - **Status mapping**: [`JoblyError::http_status`] tells the route layer
//!   what to answer
//!
//! ## Example
//!
//! ```ignore
//! use jobly::{Job, JobFilter, JobPatch};
//!
//! let pool = jobly::create_pool(&std::env::var("DATABASE_URL")?)?;
//! let conn = pool.get().await?;
//!
//! let jobs = Job::find_all(&conn, &JobFilter::new().title("eng").min_salary(50_000)).await?;
//!
//! let patch = JobPatch::from_json(serde_json::json!({"salary": 95000}))?;
//! let job = Job::update(&conn, jobs[0].id, &patch).await?;
//! ```

pub mod changeset;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod ident;
pub mod models;
pub mod monitor;
pub mod row;
pub mod sql;
pub mod update;
pub mod validate;
pub mod value;

#[cfg(feature = "migrate")]
pub mod migrate;

#[cfg(feature = "pool")]
pub mod pool;

pub use changeset::{ValidationCode, ValidationError, ValidationErrors};
pub use client::GenericClient;
pub use config::JoblyConfig;
pub use error::{JoblyError, JoblyResult};
pub use filter::{CompanyFilter, JobFilter, Predicate};
pub use ident::Ident;
pub use models::company::{
    COMPANY_ALIASES, Company, CompanyDetail, CompanyJob, CompanyPatch, NewCompany,
};
pub use models::job::{JOB_ALIASES, Job, JobPatch, NewJob, parse_job_id};
pub use monitor::TracingClient;
pub use row::{FromRow, RowExt};
pub use sql::{Query, Sql, query, sql};
pub use update::{ColumnAliases, PartialUpdate, UpdatePayload, sql_for_partial_update};
pub use value::FieldValue;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_from_config, create_pool_with_config};

// Re-export the driver so callers can name `Row`, `Client`, etc.
pub use tokio_postgres;

#[cfg(feature = "pool")]
pub use deadpool_postgres;
