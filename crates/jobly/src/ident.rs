//! Safe SQL identifier handling.
//!
//! Column names produced from caller-supplied field names are always emitted
//! as quoted identifiers: the name is wrapped in `"` and any embedded `"` is
//! doubled, so reserved words (`"order"`, `"user"`) and odd casing survive.
//!
//! # Example
//! ```ignore
//! use jobly::Ident;
//!
//! let c = Ident::quoted("num_employees")?;
//! assert_eq!(c.to_sql(), r#""num_employees""#);
//! # Ok::<(), jobly::JoblyError>(())
//! ```

use crate::error::{JoblyError, JoblyResult};

/// A quoted SQL identifier (column or table name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    name: String,
}

impl Ident {
    /// Create a quoted identifier.
    pub fn quoted(name: &str) -> JoblyResult<Self> {
        if name.is_empty() {
            return Err(JoblyError::bad_request("Empty quoted identifier"));
        }
        if name.contains('\0') {
            return Err(JoblyError::bad_request(
                "Identifier cannot contain NUL character",
            ));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    /// The unquoted name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the identifier as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::with_capacity(self.name.len() + 2);
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        out.push('"');
        for ch in self.name.chars() {
            if ch == '"' {
                out.push('"');
                out.push('"');
            } else {
                out.push(ch);
            }
        }
        out.push('"');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_simple() {
        let ident = Ident::quoted("title").unwrap();
        assert_eq!(ident.to_sql(), r#""title""#);
    }

    #[test]
    fn ident_reserved_word() {
        let ident = Ident::quoted("order").unwrap();
        assert_eq!(ident.to_sql(), r#""order""#);
    }

    #[test]
    fn ident_quoted_with_escape() {
        let ident = Ident::quoted(r#"has"quote"#).unwrap();
        assert_eq!(ident.to_sql(), r#""has""quote""#);
    }

    #[test]
    fn ident_keeps_case() {
        let ident = Ident::quoted("CamelCase").unwrap();
        assert_eq!(ident.to_sql(), r#""CamelCase""#);
        assert_eq!(ident.name(), "CamelCase");
    }

    #[test]
    fn ident_rejects_empty() {
        assert!(Ident::quoted("").is_err());
    }

    #[test]
    fn ident_rejects_nul() {
        assert!(Ident::quoted("a\0b").is_err());
    }
}
