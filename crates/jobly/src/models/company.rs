//! Companies and their job listings.

use super::{check_non_empty_text, check_non_negative_int, check_url, payload_from_json};
use crate::changeset::{ValidationCode, ValidationErrors};
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::CompanyFilter;
use crate::row::{FromRow, RowExt};
use crate::sql::query;
use crate::update::{ColumnAliases, UpdatePayload, sql_for_partial_update};
use crate::value::FieldValue;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

pub(crate) const COMPANY_COLUMNS: &str = "handle, name, description, num_employees, logo_url";

pub const COMPANY_ALIASES: ColumnAliases<'static> = ColumnAliases::new(&[
    ("numEmployees", "num_employees"),
    ("logoUrl", "logo_url"),
]);

const PATCH_FIELDS: &[&str] = &["name", "description", "numEmployees", "logoUrl"];
const IMMUTABLE_FIELDS: &[&str] = &["handle"];
const MAX_HANDLE_LEN: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// A job as listed under its company (the handle is implied).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyJob {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

impl FromRow for CompanyJob {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
        })
    }
}

/// A company with its jobs, as returned by [`Company::get`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<CompanyJob>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl NewCompany {
    pub fn new(
        handle: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            handle: handle.into(),
            name: name.into(),
            description: description.into(),
            num_employees: None,
            logo_url: None,
        }
    }

    pub fn num_employees(mut self, n: i32) -> Self {
        self.num_employees = Some(n);
        self
    }

    pub fn logo_url(mut self, url: impl Into<String>) -> Self {
        self.logo_url = Some(url.into());
        self
    }

    pub fn validate(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::default();
        check_non_empty_text(
            &mut errs,
            "handle",
            &FieldValue::from(self.handle.as_str()),
            Some(MAX_HANDLE_LEN),
        );
        check_non_empty_text(&mut errs, "name", &FieldValue::from(self.name.as_str()), None);
        check_non_negative_int(&mut errs, "numEmployees", &FieldValue::from(self.num_employees));
        check_url(&mut errs, "logoUrl", &FieldValue::from(self.logo_url.clone()));
        errs
    }
}

/// A partial update to a company. The handle is fixed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyPatch {
    payload: UpdatePayload,
}

impl CompanyPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.payload.set("name", name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.payload.set("description", description.into());
        self
    }

    pub fn num_employees(mut self, n: Option<i32>) -> Self {
        self.payload.set("numEmployees", n);
        self
    }

    pub fn logo_url(mut self, url: Option<String>) -> Self {
        self.payload.set("logoUrl", url);
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
                "name" => check_non_empty_text(&mut errs, field, value, None),
                // Descriptions may be blank but never null.
                "description" if value.is_null() => {
                    errs.add(field, ValidationCode::Required, "is required")
                }
                "description" if value.as_str().is_none() => errs.add(
                    field,
                    ValidationCode::Type,
                    format!("must be a string, got {}", value.kind()),
                ),
                "numEmployees" => check_non_negative_int(&mut errs, field, value),
                "logoUrl" => check_url(&mut errs, field, value),
                _ => {}
            }
        }
        errs
    }
}

impl Company {
    /// Insert a company. An existing handle is a [`JoblyError::Duplicate`].
    pub async fn create(conn: &impl GenericClient, new_company: &NewCompany) -> JoblyResult<Company> {
        new_company.validate().into_result()?;

        let duplicate = query("SELECT 1 FROM companies WHERE handle = $1")
            .tag("companies.create.duplicate_check")
            .bind(new_company.handle.as_str())
            .exists(conn)
            .await?;
        if duplicate {
            return Err(JoblyError::duplicate(format!(
                "company {}",
                new_company.handle
            )));
        }

        let company: Company = query(format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COMPANY_COLUMNS}"
        ))
        .tag("companies.create")
        .bind(new_company.handle.as_str())
        .bind(new_company.name.as_str())
        .bind(new_company.description.as_str())
        .bind(new_company.num_employees)
        .bind(new_company.logo_url.as_deref())
        .fetch_one_as(conn)
        .await?;

        tracing::info!(target: "jobly", handle = %company.handle, "company created");
        Ok(company)
    }

    /// List companies matching `filter`, sorted by name.
    pub async fn find_all(
        conn: &impl GenericClient,
        filter: &CompanyFilter,
    ) -> JoblyResult<Vec<Company>> {
        filter
            .to_sql()?
            .tagged("companies.find_all")
            .fetch_all_as(conn)
            .await
    }

    /// Fetch a company together with its jobs, ordered by id.
    pub async fn get(conn: &impl GenericClient, handle: &str) -> JoblyResult<CompanyDetail> {
        let company: Company = query(format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE handle = $1"
        ))
        .tag("companies.get")
        .bind(handle)
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;

        let jobs = query(
            "SELECT id, title, salary, equity FROM jobs WHERE company_handle = $1 ORDER BY id",
        )
        .tag("companies.get.jobs")
        .bind(handle)
        .fetch_all_as(conn)
        .await?;

        Ok(CompanyDetail { company, jobs })
    }

    /// Apply a partial update and return the updated row.
    pub async fn update(
        conn: &impl GenericClient,
        handle: &str,
        patch: &CompanyPatch,
    ) -> JoblyResult<Company> {
        patch.validate().into_result()?;

        let update = sql_for_partial_update(patch.payload(), &COMPANY_ALIASES)?;
        let sql = format!(
            "UPDATE companies SET {} WHERE handle = ${} RETURNING {COMPANY_COLUMNS}",
            update.set_clause,
            update.next_placeholder()
        );

        query(sql)
            .tag("companies.update")
            .bind_all(update.values)
            .bind(handle)
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))
    }

    /// Delete a company. Its jobs go with it.
    pub async fn remove(conn: &impl GenericClient, handle: &str) -> JoblyResult<()> {
        let deleted = query("DELETE FROM companies WHERE handle = $1")
            .tag("companies.remove")
            .bind(handle)
            .execute(conn)
            .await?;
        if deleted == 0 {
            return Err(JoblyError::not_found(format!("No company: {handle}")));
        }
        tracing::info!(target: "jobly", handle, "company removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patch_uses_column_aliases() {
        let patch = CompanyPatch::from_json(json!({
            "numEmployees": 10,
            "logoUrl": "https://example.com/logo.png",
            "name": "Acme"
        }))
        .unwrap();
        let update = sql_for_partial_update(patch.payload(), &COMPANY_ALIASES).unwrap();
        assert_eq!(
            update.set_clause,
            r#""num_employees"=$1, "logo_url"=$2, "name"=$3"#
        );
        assert_eq!(update.values[0], FieldValue::Int(10));
        assert_eq!(update.next_placeholder(), 4);
    }

    #[test]
    fn handle_cannot_change() {
        let err = CompanyPatch::from_json(json!({"handle": "new"})).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: handle cannot be changed");
    }

    #[test]
    fn unknown_patch_field() {
        let err = CompanyPatch::from_json(json!({"num_employees": 3})).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: unknown field: num_employees");
    }

    #[test]
    fn patch_value_checks() {
        let err = CompanyPatch::from_json(json!({
            "logoUrl": "not a url",
            "numEmployees": -1,
            "description": null
        }))
        .unwrap_err();
        let JoblyError::Validation(errs) = err else {
            panic!("expected validation error");
        };
        let fields: Vec<&str> = errs.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["logoUrl", "numEmployees", "description"]);
    }

    #[test]
    fn patch_can_clear_optional_fields() {
        let patch = CompanyPatch::new().logo_url(None).num_employees(None);
        assert!(patch.validate().is_empty());
        assert_eq!(patch.payload().get("logoUrl"), Some(&FieldValue::Null));
    }

    #[test]
    fn new_company_validation() {
        let ok = NewCompany::new("acme", "Acme", "Widgets")
            .num_employees(5)
            .logo_url("http://acme.test/logo.png");
        assert!(ok.validate().is_empty());

        let bad = NewCompany::new("", "", "")
            .num_employees(-2)
            .logo_url("logo");
        let fields: Vec<String> = bad.validate().iter().map(|e| e.field.clone()).collect();
        assert_eq!(fields, vec!["handle", "name", "numEmployees", "logoUrl"]);
    }

    #[test]
    fn detail_flattens_company() {
        let detail = CompanyDetail {
            company: Company {
                handle: "c1".into(),
                name: "C1".into(),
                description: "Desc1".into(),
                num_employees: Some(1),
                logo_url: None,
            },
            jobs: vec![CompanyJob {
                id: 7,
                title: "J1".into(),
                salary: Some(1),
                equity: None,
            }],
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["handle"], "c1");
        assert_eq!(json["numEmployees"], 1);
        assert_eq!(json["jobs"][0]["id"], 7);
        assert!(json["logoUrl"].is_null());
    }
}
