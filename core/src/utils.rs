//! Utility functions and types.

use std::fmt::Debug;

/// Debug wrapper that masks secret material in log and Debug output.
///
/// Short values are masked entirely; values of 12 characters or more keep
/// their first and last three characters so that two different secrets remain
/// distinguishable in logs without being recoverable.
pub struct Redact<'a>(&'a str);

impl<'a> Redact<'a> {
    fn masked(&self) -> String {
        match self.0.len() {
            0 => "EMPTY".to_string(),
            n if n < 12 => "***".to_string(),
            n => format!("{}***{}", &self.0[..3], &self.0[n - 3..]),
        }
    }
}

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value.as_str())
    }
}

impl<'a> From<&'a Option<String>> for Redact<'a> {
    fn from(value: &'a Option<String>) -> Self {
        Redact(value.as_deref().unwrap_or(""))
    }
}

impl<'a> Debug for Redact<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.masked())
    }
}
