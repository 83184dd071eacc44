//! Entities, their input types, and their repository operations.

pub mod company;
pub mod job;

use crate::changeset::{ValidationCode, ValidationErrors};
use crate::error::{JoblyError, JoblyResult};
use crate::update::UpdatePayload;
use crate::validate;
use crate::value::FieldValue;
use rust_decimal::Decimal;

/// Copy a JSON object body into an [`UpdatePayload`], keeping key order.
///
/// Keys outside `allowed` are rejected; `immutable` keys get a dedicated
/// message since clients commonly try to send them back.
pub(crate) fn payload_from_json(
    body: serde_json::Value,
    allowed: &[&str],
    immutable: &[&str],
) -> JoblyResult<UpdatePayload> {
    let serde_json::Value::Object(map) = body else {
        return Err(JoblyError::bad_request("update body must be a JSON object"));
    };

    let mut payload = UpdatePayload::new();
    for (key, value) in map {
        if immutable.contains(&key.as_str()) {
            return Err(JoblyError::bad_request(format!("{key} cannot be changed")));
        }
        if !allowed.contains(&key.as_str()) {
            return Err(JoblyError::bad_request(format!("unknown field: {key}")));
        }
        let value = FieldValue::try_from(value)?;
        payload.set(key, value);
    }
    Ok(payload)
}

pub(crate) fn check_non_empty_text(
    errs: &mut ValidationErrors,
    field: &str,
    value: &FieldValue,
    max_len: Option<usize>,
) {
    match value {
        FieldValue::Text(s) if s.trim().is_empty() => {
            errs.add(field, ValidationCode::Len, "must not be empty");
        }
        FieldValue::Text(s) => {
            if let Some(max) = max_len {
                if s.chars().count() > max {
                    errs.add(
                        field,
                        ValidationCode::Len,
                        format!("must be at most {max} characters"),
                    );
                }
            }
        }
        FieldValue::Null => errs.add(field, ValidationCode::Required, "is required"),
        other => errs.add(
            field,
            ValidationCode::Type,
            format!("must be a string, got {}", other.kind()),
        ),
    }
}

pub(crate) fn check_non_negative_int(errs: &mut ValidationErrors, field: &str, value: &FieldValue) {
    match value {
        FieldValue::Null => {}
        FieldValue::Int(n) if *n < 0 => errs.add(field, ValidationCode::Range, "must be >= 0"),
        FieldValue::Int(n) if i32::try_from(*n).is_err() => {
            errs.add(field, ValidationCode::Range, "is too large")
        }
        FieldValue::Int(_) => {}
        other => errs.add(
            field,
            ValidationCode::Type,
            format!("must be an integer, got {}", other.kind()),
        ),
    }
}

pub(crate) fn check_equity(errs: &mut ValidationErrors, field: &str, value: &FieldValue) {
    let in_range = |d: Decimal| d >= Decimal::ZERO && d <= Decimal::ONE;
    match value {
        FieldValue::Null => {}
        FieldValue::Text(s) if validate::is_equity(s) => {}
        FieldValue::Text(_) => errs.add(
            field,
            ValidationCode::Regex,
            "must be a decimal string between 0 and 1",
        ),
        FieldValue::Decimal(d) if in_range(*d) => {}
        FieldValue::Int(n) if in_range(Decimal::from(*n)) => {}
        FieldValue::Decimal(_) | FieldValue::Int(_) => {
            errs.add(field, ValidationCode::Range, "must be between 0 and 1")
        }
        other => errs.add(
            field,
            ValidationCode::Type,
            format!("must be a decimal string, got {}", other.kind()),
        ),
    }
}

pub(crate) fn check_url(errs: &mut ValidationErrors, field: &str, value: &FieldValue) {
    match value {
        FieldValue::Null => {}
        FieldValue::Text(s) if validate::is_url(s) => {}
        FieldValue::Text(_) => errs.add(field, ValidationCode::Url, "must be a valid URL"),
        other => errs.add(
            field,
            ValidationCode::Type,
            format!("must be a string, got {}", other.kind()),
        ),
    }
}
