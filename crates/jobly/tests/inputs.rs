//! Request-shaped inputs through the public API, no database needed.

use jobly::{
    COMPANY_ALIASES, ColumnAliases, CompanyPatch, FieldValue, JOB_ALIASES, JobFilter, JobPatch,
    JoblyError, UpdatePayload, parse_job_id, sql_for_partial_update,
};
use rust_decimal::Decimal;
use serde_json::json;

#[test]
fn partial_update_then_where_clause() {
    let patch = CompanyPatch::from_json(json!({"name": "Acme", "numEmployees": 5})).unwrap();
    let update = sql_for_partial_update(patch.payload(), &COMPANY_ALIASES).unwrap();

    let statement = format!(
        "UPDATE companies SET {} WHERE handle = ${}",
        update.set_clause,
        update.next_placeholder()
    );
    assert_eq!(
        statement,
        r#"UPDATE companies SET "name"=$1, "num_employees"=$2 WHERE handle = $3"#
    );
    assert_eq!(
        update.values,
        vec![FieldValue::from("Acme"), FieldValue::Int(5)]
    );
}

#[test]
fn job_aliases_leave_patch_fields_alone() {
    let patch = JobPatch::new().title("X").salary(Some(1));
    let update = sql_for_partial_update(patch.payload(), &JOB_ALIASES).unwrap();
    assert_eq!(update.set_clause, r#""title"=$1, "salary"=$2"#);
}

#[test]
fn raw_payloads_skip_validation() {
    let mut payload = UpdatePayload::new();
    payload.set("numEmployees", -3);
    let update = sql_for_partial_update(
        &payload,
        &ColumnAliases::new(&[("numEmployees", "num_employees")]),
    )
    .unwrap();
    assert_eq!(update.values, vec![FieldValue::Int(-3)]);
}

#[test]
fn empty_json_body_is_no_data() {
    let patch = JobPatch::from_json(json!({})).unwrap();
    let err = sql_for_partial_update(patch.payload(), &JOB_ALIASES).unwrap_err();
    assert_eq!(err.to_string(), "No data");
    assert_eq!(err.http_status(), 400);
}

#[test]
fn query_string_to_sql() {
    let filter = JobFilter::from_query_pairs([("hasEquity", "true"), ("title", "Eng")]).unwrap();
    let q = filter.to_sql();
    assert!(
        q.to_sql()
            .ends_with("WHERE lower(title) LIKE $1 AND equity <> $2 ORDER BY salary DESC")
    );
    assert_eq!(
        q.params(),
        &[FieldValue::from("%eng%"), FieldValue::Decimal(Decimal::ZERO)]
    );
}

#[test]
fn has_equity_false_is_unfiltered() {
    let filter = JobFilter::from_query_pairs([("hasEquity", "false")]).unwrap();
    assert!(filter.is_empty());
    assert!(filter.to_sql().to_sql().ends_with("FROM jobs ORDER BY company_handle"));
}

#[test]
fn malformed_and_missing_ids_look_the_same() {
    let malformed = parse_job_id("abc").unwrap_err();
    let missing = JoblyError::not_found("No job: abc");
    assert_eq!(malformed.to_string(), missing.to_string());
    assert_eq!(malformed.http_status(), missing.http_status());
}
