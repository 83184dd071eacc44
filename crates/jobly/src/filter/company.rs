use super::{Predicate, contains_pattern, deserialize_count, parse_count, push_where};
use crate::error::{JoblyError, JoblyResult};
use crate::models::company::COMPANY_COLUMNS;
use crate::sql::{Sql, sql};
use serde::Deserialize;

/// Criteria for listing companies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    /// Case-insensitive substring of the name.
    pub name_like: Option<String>,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub min_employees: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub max_employees: Option<i32>,
}

impl CompanyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name_like(mut self, name: impl Into<String>) -> Self {
        self.name_like = Some(name.into());
        self
    }

    pub fn min_employees(mut self, n: i32) -> Self {
        self.min_employees = Some(n);
        self
    }

    pub fn max_employees(mut self, n: i32) -> Self {
        self.max_employees = Some(n);
        self
    }

    /// Map query-string pairs into criteria, rejecting unknown keys.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> JoblyResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = Self::default();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "nameLike" => filter.name_like = Some(value.to_string()),
                "minEmployees" => filter.min_employees = Some(parse_count(key, value)?),
                "maxEmployees" => filter.max_employees = Some(parse_count(key, value)?),
                _ => {
                    return Err(JoblyError::bad_request(format!(
                        "unknown company filter: {key}"
                    )));
                }
            }
        }
        filter.check_range()?;
        Ok(filter)
    }

    fn check_range(&self) -> JoblyResult<()> {
        if let (Some(min), Some(max)) = (self.min_employees, self.max_employees) {
            if min > max {
                return Err(JoblyError::bad_request(
                    "minEmployees cannot be greater than maxEmployees",
                ));
            }
        }
        Ok(())
    }

    /// Active predicates in name, min, max order.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::with_capacity(3);
        if let Some(name) = self.name_like.as_deref().filter(|n| !n.is_empty()) {
            predicates.push(Predicate::new("lower(name) LIKE", contains_pattern(name)));
        }
        if let Some(min) = self.min_employees {
            predicates.push(Predicate::new("num_employees >=", min));
        }
        if let Some(max) = self.max_employees {
            predicates.push(Predicate::new("num_employees <=", max));
        }
        predicates
    }

    /// Build the listing query, sorted by name.
    pub fn to_sql(&self) -> JoblyResult<Sql> {
        self.check_range()?;
        let mut q = sql(format!("SELECT {COMPANY_COLUMNS} FROM companies"));
        push_where(&mut q, self.predicates());
        q.push(" ORDER BY name");
        Ok(q)
    }
}
