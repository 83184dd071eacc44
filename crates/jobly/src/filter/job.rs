use super::{
    Predicate, contains_pattern, deserialize_count, parse_count, parse_flag, push_where,
};
use crate::error::{JoblyError, JoblyResult};
use crate::models::job::JOB_COLUMNS;
use crate::sql::{Sql, sql};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Criteria for listing jobs.
///
/// ```ignore
/// let filter = JobFilter::from_query_pairs([("title", "eng"), ("minSalary", "50000")])?;
/// let jobs = Job::find_all(&client, &filter).await?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    /// Inclusive salary lower bound.
    #[serde(default, deserialize_with = "deserialize_count")]
    pub min_salary: Option<i32>,
    /// Only jobs with non-zero equity.
    #[serde(default)]
    pub has_equity: bool,
}

impl JobFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn min_salary(mut self, min_salary: i32) -> Self {
        self.min_salary = Some(min_salary);
        self
    }

    pub fn has_equity(mut self, has_equity: bool) -> Self {
        self.has_equity = has_equity;
        self
    }

    /// Map query-string pairs into criteria.
    ///
    /// Unknown keys, non-integer or negative `minSalary`, and `hasEquity`
    /// values other than `true`/`false` are rejected as bad requests.
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
                "title" => filter.title = Some(value.to_string()),
                "minSalary" => filter.min_salary = Some(parse_count(key, value)?),
                "hasEquity" => filter.has_equity = parse_flag(key, value)?,
                _ => {
                    return Err(JoblyError::bad_request(format!(
                        "unknown job filter: {key}"
                    )));
                }
            }
        }
        Ok(filter)
    }

    /// `true` when no criterion would contribute a predicate.
    pub fn is_empty(&self) -> bool {
        self.predicates().is_empty()
    }

    /// Active predicates in title, salary, equity order.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::with_capacity(3);
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            predicates.push(Predicate::new("lower(title) LIKE", contains_pattern(title)));
        }
        if let Some(min_salary) = self.min_salary {
            predicates.push(Predicate::new("salary >=", min_salary));
        }
        if self.has_equity {
            predicates.push(Predicate::new("equity <>", Decimal::ZERO));
        }
        predicates
    }

    /// Build the listing query.
    ///
    /// Filtered listings sort by salary, highest first. With no active
    /// criterion this is the plain listing of every job, sorted by company
    /// handle instead.
    pub fn to_sql(&self) -> Sql {
        let mut q = sql(format!("SELECT {JOB_COLUMNS} FROM jobs"));
        let predicates = self.predicates();
        if predicates.is_empty() {
            q.push(" ORDER BY company_handle");
        } else {
            push_where(&mut q, predicates);
            q.push(" ORDER BY salary DESC");
        }
        q
    }
}
