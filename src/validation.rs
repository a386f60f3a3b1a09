//! Field-level validation primitives shared by the forms.

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};
use regex::Regex;
use reqwest::Url;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

/// Key used for errors that belong to the whole form rather than one field.
pub const FORM_KEY: &str = "_form";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Field path -> first error message for that field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; the first message for a field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(value)` when nothing was recorded, otherwise the collected errors.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    pub fn required(&mut self, field: &str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.add(field, message);
        }
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize, message: &str) {
        if value.chars().count() < min {
            self.add(field, message);
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if !is_valid_email(value) {
            self.add(field, "Invalid email address");
        }
    }

    /// Blank is allowed; anything else must look like an http(s) URL.
    pub fn optional_url(&mut self, field: &str, value: &str, message: &str) {
        if !value.trim().is_empty() && !is_valid_url(value.trim()) {
            self.add(field, message);
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            if field == FORM_KEY {
                write!(f, "{message}")?;
            } else {
                write!(f, "{field}: {message}")?;
            }
        }
        Ok(())
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

/// An absolute http(s) URL with a host, as a browser would parse it.
pub fn is_valid_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
        Err(_) => false,
    }
}

/// Whether a deadline date may be picked. Dates whose local midnight falls
/// strictly before `now - 1 day` are disabled.
pub fn is_deadline_selectable(date: NaiveDate, now: DateTime<Local>) -> bool {
    let cutoff = now - Duration::days(1);
    match Local.from_local_datetime(&date.and_time(chrono::NaiveTime::MIN)).earliest() {
        Some(midnight) => midnight >= cutoff,
        // Midnight skipped by a DST jump; compare on the calendar date instead.
        None => date >= cutoff.date_naive(),
    }
}

/// Parse a `YYYY-MM-DD` date typed by the user.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}
