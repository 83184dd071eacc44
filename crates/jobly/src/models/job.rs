//! Job postings.

use super::{check_equity, check_non_empty_text, check_non_negative_int, payload_from_json};
use crate::changeset::ValidationErrors;
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::JobFilter;
use crate::row::{FromRow, RowExt};
use crate::sql::query;
use crate::update::{ColumnAliases, UpdatePayload, sql_for_partial_update};
use crate::value::FieldValue;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

pub(crate) const JOB_COLUMNS: &str = "id, title, salary, equity, company_handle";

/// Logical job fields whose column name differs.
pub const JOB_ALIASES: ColumnAliases<'static> =
    ColumnAliases::new(&[("companyHandle", "company_handle")]);

const PATCH_FIELDS: &[&str] = &["title", "salary", "equity"];
const IMMUTABLE_FIELDS: &[&str] = &["id", "companyHandle"];

/// A job row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// Input for [`Job::create`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl NewJob {
    pub fn new(title: impl Into<String>, company_handle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            salary: None,
            equity: None,
            company_handle: company_handle.into(),
        }
    }

    pub fn salary(mut self, salary: i32) -> Self {
        self.salary = Some(salary);
        self
    }

    pub fn equity(mut self, equity: Decimal) -> Self {
        self.equity = Some(equity);
        self
    }

    pub fn validate(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::default();
        check_non_empty_text(&mut errs, "title", &FieldValue::from(self.title.as_str()), None);
        check_non_negative_int(&mut errs, "salary", &FieldValue::from(self.salary));
        check_equity(&mut errs, "equity", &FieldValue::from(self.equity));
        check_non_empty_text(
            &mut errs,
            "companyHandle",
            &FieldValue::from(self.company_handle.as_str()),
            Some(25),
        );
        errs
    }
}

/// A partial update to a job: any of `title`, `salary`, `equity`.
///
/// The id and the owning company can never change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobPatch {
    payload: UpdatePayload,
}

impl JobPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.payload.set("title", title.into());
        self
    }

    pub fn salary(mut self, salary: Option<i32>) -> Self {
        self.payload.set("salary", salary);
        self
    }

    pub fn equity(mut self, equity: Option<Decimal>) -> Self {
        self.payload.set("equity", equity);
        self
    }

    /// Accept a JSON request body, keeping its key order.
    pub fn from_json(body: serde_json::Value) -> JoblyResult<Self> {
        let payload = payload_from_json(body, PATCH_FIELDS, IMMUTABLE_FIELDS)?;
        let patch = Self { payload };
        patch.validate().into_result()?;
        Ok(patch)
    }

    pub fn payload(&self) -> &UpdatePayload {
        &self.payload
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn validate(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::default();
        for (field, value) in self.payload.iter() {
            match field {
                "title" => check_non_empty_text(&mut errs, field, value, None),
                "salary" => check_non_negative_int(&mut errs, field, value),
                "equity" => check_equity(&mut errs, field, value),
                _ => {}
            }
        }
        errs
    }
}

/// Parse a job id from a path segment.
///
/// Anything that is not an integer reports as a missing job.
pub fn parse_job_id(raw: &str) -> JoblyResult<i32> {
    raw.trim()
        .parse()
        .map_err(|_| JoblyError::InvalidIdentifier(format!("No job: {raw}")))
}

impl Job {
    /// Insert a job.
    ///
    /// A job with the same title at the same company is a
    /// [`JoblyError::Duplicate`]. The pre-check is best-effort: a concurrent
    /// insert that slips past it is caught by the unique constraint and
    /// reported the same way.
    pub async fn create(conn: &impl GenericClient, new_job: &NewJob) -> JoblyResult<Job> {
        new_job.validate().into_result()?;

        let duplicate = query("SELECT 1 FROM jobs WHERE title = $1 AND company_handle = $2")
            .tag("jobs.create.duplicate_check")
            .bind(new_job.title.as_str())
            .bind(new_job.company_handle.as_str())
            .exists(conn)
            .await?;
        if duplicate {
            return Err(JoblyError::duplicate(format!(
                "job {:?} at {}",
                new_job.title, new_job.company_handle
            )));
        }

        let job: Job = query(format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) RETURNING {JOB_COLUMNS}"
        ))
        .tag("jobs.create")
        .bind(new_job.title.as_str())
        .bind(new_job.salary)
        .bind(new_job.equity)
        .bind(new_job.company_handle.as_str())
        .fetch_one_as(conn)
        .await?;

        tracing::info!(target: "jobly", job_id = job.id, company = %job.company_handle, "job created");
        Ok(job)
    }

    /// List jobs matching `filter`.
    pub async fn find_all(conn: &impl GenericClient, filter: &JobFilter) -> JoblyResult<Vec<Job>> {
        filter
            .to_sql()
            .tagged("jobs.find_all")
            .fetch_all_as(conn)
            .await
    }

    pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<Job> {
        query(format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"))
            .tag("jobs.get")
            .bind(id)
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))
    }

    /// Apply a partial update and return the updated row.
    pub async fn update(conn: &impl GenericClient, id: i32, patch: &JobPatch) -> JoblyResult<Job> {
        patch.validate().into_result()?;

        let update = sql_for_partial_update(patch.payload(), &JOB_ALIASES)?;
        let sql = format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {JOB_COLUMNS}",
            update.set_clause,
            update.next_placeholder()
        );

        query(sql)
            .tag("jobs.update")
            .bind_all(update.values)
            .bind(id)
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))
    }

    pub async fn remove(conn: &impl GenericClient, id: i32) -> JoblyResult<()> {
        let deleted = query("DELETE FROM jobs WHERE id = $1")
            .tag("jobs.remove")
            .bind(id)
            .execute(conn)
            .await?;
        if deleted == 0 {
            return Err(JoblyError::not_found(format!("No job: {id}")));
        }
        tracing::info!(target: "jobly", job_id = id, "job removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patch_from_json_keeps_body_order() {
        let patch = JobPatch::from_json(json!({"salary": 90000, "title": "Lead"})).unwrap();
        assert_eq!(
            patch.payload().keys().collect::<Vec<_>>(),
            vec!["salary", "title"]
        );

        let update = sql_for_partial_update(patch.payload(), &JOB_ALIASES).unwrap();
        assert_eq!(update.set_clause, r#""salary"=$1, "title"=$2"#);
        assert_eq!(update.next_placeholder(), 3);
    }

    #[test]
    fn patch_rejects_id_and_company() {
        for body in [
            json!({"id": 3}),
            json!({"companyHandle": "other"}),
            json!({"title": "ok", "location": "remote"}),
        ] {
            let err = JobPatch::from_json(body).unwrap_err();
            assert!(matches!(err, JoblyError::BadRequest(_)), "{err}");
        }
    }

    #[test]
    fn patch_rejects_non_object_body() {
        assert!(JobPatch::from_json(json!(["title"])).is_err());
    }

    #[test]
    fn patch_validates_values() {
        let err = JobPatch::from_json(json!({"salary": -1, "equity": "1.5", "title": ""}))
            .unwrap_err();
        let JoblyError::Validation(errs) = err else {
            panic!("expected validation error");
        };
        let fields: Vec<&str> = errs.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["salary", "equity", "title"]);
    }

    #[test]
    fn patch_allows_nulls_for_optional_fields() {
        let patch = JobPatch::from_json(json!({"salary": null, "equity": null})).unwrap();
        assert_eq!(patch.payload().get("salary"), Some(&FieldValue::Null));
    }

    #[test]
    fn empty_patch_is_a_no_fields_error() {
        let patch = JobPatch::from_json(json!({})).unwrap();
        assert!(patch.is_empty());
        let err = sql_for_partial_update(patch.payload(), &JOB_ALIASES).unwrap_err();
        assert!(matches!(err, JoblyError::NoFields));
    }

    #[test]
    fn typed_patch_builder() {
        let patch = JobPatch::new()
            .title("Engineer")
            .equity(Some(Decimal::new(5, 2)));
        assert_eq!(
            patch.payload().get("equity"),
            Some(&FieldValue::Decimal(Decimal::new(5, 2)))
        );
        assert!(patch.validate().is_empty());
    }

    #[test]
    fn new_job_validation() {
        let ok = NewJob::new("Engineer", "c1")
            .salary(100)
            .equity(Decimal::new(1, 1));
        assert!(ok.validate().is_empty());

        let mut bad = NewJob::new(" ", "a-company-handle-that-is-too-long");
        bad.salary = Some(-5);
        bad.equity = Some(Decimal::new(2, 0));
        let fields: Vec<String> = bad.validate().iter().map(|e| e.field.clone()).collect();
        assert_eq!(fields, vec!["title", "salary", "equity", "companyHandle"]);
    }

    #[test]
    fn new_job_from_json() {
        let job: NewJob = serde_json::from_value(json!({
            "title": "Engineer",
            "salary": 120000,
            "equity": "0.05",
            "companyHandle": "c1"
        }))
        .unwrap();
        assert_eq!(job.equity, Some(Decimal::new(5, 2)));
        assert!(serde_json::from_value::<NewJob>(json!({"title": "x", "companyHandle": "c", "id": 1})).is_err());
    }

    #[test]
    fn job_ids() {
        assert_eq!(parse_job_id("42").unwrap(), 42);
        let err = parse_job_id("forty-two").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.http_status(), 404);
        assert!(parse_job_id("99999999999").is_err());
    }

    #[test]
    fn job_serializes_camel_case() {
        let job = Job {
            id: 1,
            title: "Engineer".into(),
            salary: Some(100),
            equity: Some(Decimal::new(5, 2)),
            company_handle: "c1".into(),
        };
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["companyHandle"], "c1");
        assert_eq!(json["equity"], "0.05");
    }
}
