//! Runtime configuration.
//!
//! Read from a TOML file:
//!
//! ```toml
//! database_url = "postgres://${PGUSER}@localhost/jobly"
//! pool_max_size = 8
//! sql_log_level = "info"
//! sql_log_max_length = 500
//! ```
//!
//! or from the environment (`.env` is honored): `DATABASE_URL`,
//! `JOBLY_POOL_MAX_SIZE`, `JOBLY_SQL_LOG_LEVEL`, `JOBLY_SQL_LOG_MAX_LENGTH`.

use crate::error::{JoblyError, JoblyResult};
use crate::monitor::TracingClient;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::Level;

const DEFAULT_POOL_MAX_SIZE: usize = 16;
const DEFAULT_SQL_LOG_MAX_LENGTH: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoblyConfig {
    pub database_url: String,
    pub pool_max_size: usize,
    pub sql_log_level: Level,
    /// `None` logs SQL untruncated.
    pub sql_log_max_length: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    database_url: String,
    #[serde(default)]
    pool_max_size: Option<usize>,
    #[serde(default)]
    sql_log_level: Option<String>,
    #[serde(default)]
    sql_log_max_length: Option<usize>,
}

impl JoblyConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            sql_log_level: Level::DEBUG,
            sql_log_max_length: Some(DEFAULT_SQL_LOG_MAX_LENGTH),
        }
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> JoblyResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            JoblyError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse TOML text. `${VAR}` references in `database_url` are expanded.
    pub fn from_toml_str(raw: &str) -> JoblyResult<Self> {
        let file: ConfigFile = toml::from_str(raw)
            .map_err(|e| JoblyError::Config(format!("failed to parse config: {e}")))?;

        let mut config = Self::new(expand_env_vars(&file.database_url)?);
        if let Some(size) = file.pool_max_size {
            config.pool_max_size = size;
        }
        if let Some(level) = file.sql_log_level {
            config.sql_log_level = parse_level(&level)?;
        }
        config.sql_log_max_length = match file.sql_log_max_length {
            Some(0) => None,
            Some(n) => Some(n),
            None => Some(DEFAULT_SQL_LOG_MAX_LENGTH),
        };
        config.validate()?;
        Ok(config)
    }

    /// Build from process environment, loading `.env` first if present.
    pub fn from_env() -> JoblyResult<Self> {
        // A missing .env is fine; real environment variables still apply.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> JoblyResult<Self> {
        let url = lookup("DATABASE_URL")
            .ok_or_else(|| JoblyError::Config("DATABASE_URL is not set".to_string()))?;

        let mut config = Self::new(url);
        if let Some(size) = lookup("JOBLY_POOL_MAX_SIZE") {
            config.pool_max_size = size.trim().parse().map_err(|_| {
                JoblyError::Config(format!("JOBLY_POOL_MAX_SIZE is not a number: {size}"))
            })?;
        }
        if let Some(level) = lookup("JOBLY_SQL_LOG_LEVEL") {
            config.sql_log_level = parse_level(&level)?;
        }
        if let Some(len) = lookup("JOBLY_SQL_LOG_MAX_LENGTH") {
            let len: usize = len.trim().parse().map_err(|_| {
                JoblyError::Config(format!("JOBLY_SQL_LOG_MAX_LENGTH is not a number: {len}"))
            })?;
            config.sql_log_max_length = (len > 0).then_some(len);
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> JoblyResult<()> {
        if self.database_url.trim().is_empty() {
            return Err(JoblyError::Config("database_url is empty".to_string()));
        }
        if self.pool_max_size == 0 {
            return Err(JoblyError::Config("pool_max_size must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Wrap `client` in a [`TracingClient`] using the configured log settings.
    pub fn tracing_client<C>(&self, client: C) -> TracingClient<C> {
        let client = TracingClient::new(client).level(self.sql_log_level);
        match self.sql_log_max_length {
            Some(len) => client.max_sql_length(len),
            None => client.no_truncate(),
        }
    }
}

fn parse_level(raw: &str) -> JoblyResult<Level> {
    Level::from_str(raw.trim())
        .map_err(|_| JoblyError::Config(format!("invalid sql_log_level: {raw}")))
}

fn expand_env_vars(input: &str) -> JoblyResult<String> {
    expand_with(input, |key| std::env::var(key).ok())
}

fn expand_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> JoblyResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                return Err(JoblyError::Config(format!(
                    "unterminated env var reference: ${{{key}}}"
                )));
            }
            if key.is_empty() {
                return Err(JoblyError::Config(
                    "invalid env var reference: ${}".to_string(),
                ));
            }

            let value = lookup(&key).ok_or_else(|| {
                JoblyError::Config(format!("missing env var for config expansion: {key}"))
            })?;
            out.push_str(&value);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn toml_with_defaults() {
        let config = JoblyConfig::from_toml_str(r#"database_url = "postgres://localhost/jobly""#)
            .unwrap();
        assert_eq!(config, JoblyConfig::new("postgres://localhost/jobly"));
        assert_eq!(config.pool_max_size, 16);
        assert_eq!(config.sql_log_level, Level::DEBUG);
    }

    #[test]
    fn toml_overrides() {
        let config = JoblyConfig::from_toml_str(
            r#"
            database_url = "postgres://localhost/jobly"
            pool_max_size = 4
            sql_log_level = "info"
            sql_log_max_length = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.pool_max_size, 4);
        assert_eq!(config.sql_log_level, Level::INFO);
        assert_eq!(config.sql_log_max_length, None);
    }

    #[test]
    fn toml_rejects_bad_input() {
        for raw in [
            r#"pool_max_size = 4"#,
            r#"database_url = "x"
               pool = 3"#,
            r#"database_url = "x"
               sql_log_level = "loud""#,
            r#"database_url = "x"
               pool_max_size = 0"#,
        ] {
            let err = JoblyConfig::from_toml_str(raw).unwrap_err();
            assert!(matches!(err, JoblyError::Config(_)), "{err}");
        }
    }

    #[test]
    fn env_expansion() {
        let lookup = env(&[("PGUSER", "app")]);
        assert_eq!(
            expand_with("postgres://${PGUSER}@db/jobly", &lookup).unwrap(),
            "postgres://app@db/jobly"
        );
        assert_eq!(expand_with("cost: $5", &lookup).unwrap(), "cost: $5");
        assert!(expand_with("${PGUSER", &lookup).is_err());
        assert!(expand_with("${}", &lookup).is_err());
        assert!(expand_with("${NOPE}", &lookup).is_err());
    }

    #[test]
    fn environment_lookup() {
        let config = JoblyConfig::from_lookup(env(&[
            ("DATABASE_URL", "postgres://localhost/jobly_test"),
            ("JOBLY_POOL_MAX_SIZE", "2"),
            ("JOBLY_SQL_LOG_LEVEL", "TRACE"),
            ("JOBLY_SQL_LOG_MAX_LENGTH", "80"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "postgres://localhost/jobly_test");
        assert_eq!(config.pool_max_size, 2);
        assert_eq!(config.sql_log_level, Level::TRACE);
        assert_eq!(config.sql_log_max_length, Some(80));

        assert!(JoblyConfig::from_lookup(env(&[])).is_err());
        assert!(
            JoblyConfig::from_lookup(env(&[
                ("DATABASE_URL", "postgres://x"),
                ("JOBLY_POOL_MAX_SIZE", "many"),
            ]))
            .is_err()
        );
    }

    #[test]
    fn tracing_client_uses_log_settings() {
        let mut config = JoblyConfig::new("postgres://x");
        config.sql_log_level = Level::WARN;
        config.sql_log_max_length = None;
        let client = config.tracing_client(());
        assert_eq!(client.level, Level::WARN);
        assert_eq!(client.max_sql_length, None);
    }
}
