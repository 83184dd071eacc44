//! Validation helpers shared by the input types.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

/// Returns `true` if `value` matches the provided regex `pattern`.
///
/// # Panics
/// Panics if `pattern` is not a valid regex. This is considered a developer
/// configuration error.
pub fn regex_is_match(pattern: &'static str, value: &str) -> bool {
    static CACHE: OnceLock<Mutex<HashMap<&'static str, regex::Regex>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));

    let regex = {
        let mut cache = cache.lock().expect("regex cache poisoned");
        if let Some(re) = cache.get(pattern) {
            re.clone()
        } else {
            let re = regex::Regex::new(pattern)
                .unwrap_or_else(|e| panic!("invalid regex pattern: {pattern:?}: {e}"));
            cache.insert(pattern, re.clone());
            re
        }
    };

    regex.is_match(value)
}

/// Equity is a fraction written as a decimal string between 0 and 1 inclusive.
pub const EQUITY_PATTERN: &str = r"^(0|0?\.[0-9]+|1(\.0+)?)$";

pub fn is_equity(s: &str) -> bool {
    regex_is_match(EQUITY_PATTERN, s)
}

pub fn is_url(s: &str) -> bool {
    url::Url::parse(s).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equity_accepts_fractions() {
        for ok in ["0", "0.5", ".05", "1", "1.0", "0.000"] {
            assert!(is_equity(ok), "{ok}");
        }
    }

    #[test]
    fn equity_rejects_out_of_range_or_garbage() {
        for bad in ["", "1.5", "2", "-0.1", "abc", "0.", "01.5"] {
            assert!(!is_equity(bad), "{bad}");
        }
    }

    #[test]
    fn url_check() {
        assert!(is_url("https://example.com/logo.png"));
        assert!(!is_url("not a url"));
    }
}
