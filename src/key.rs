//! Composite column keys: `"{period}|{measurement kind}"`.
//!
//! Flattening the two header rows yields one composite key per data column;
//! [`CompositeKey::from_str`] splits it back into a typed period and gender
//! and rejects anything that does not have exactly that shape.

use crate::error::FormatError;
use crate::types::{Gender, Period};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;

pub const KEY_SEPARATOR: char = '|';

pub const KIND_TOTAL: &str = "총인구수 (명)";
pub const KIND_MALE: &str = "남자인구수 (명)";
pub const KIND_FEMALE: &str = "여자인구수 (명)";

// `2024`, `2025.04`, `2025-04`, `2025/4`
static PERIOD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})(?:[.\-/](\d{1,2}))?$").expect("static period regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeKey {
    pub period: Period,
    pub gender: Gender,
}

impl CompositeKey {
    /// Join a period label and a measurement kind the way the flattened
    /// header names columns.
    pub fn join(period: &str, kind: &str) -> String {
        format!("{}{}{}", period.trim(), KEY_SEPARATOR, kind.trim())
    }
}

impl FromStr for CompositeKey {
    type Err = FormatError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let malformed =
            |reason: &'static str| FormatError::MalformedKey { key: key.to_string(), reason };

        let mut parts = key.split(KEY_SEPARATOR);
        let (period, kind) = match (parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(k), None) => (p.trim(), k.trim()),
            (_, None, _) => return Err(malformed("missing separator")),
            _ => return Err(malformed("more than one separator")),
        };
        if period.is_empty() {
            return Err(malformed("empty period"));
        }
        if kind.is_empty() {
            return Err(malformed("empty measurement kind"));
        }

        Ok(CompositeKey { period: parse_period(period)?, gender: map_kind(kind)? })
    }
}

/// Parse a raw period label into a [`Period`], validating the month.
pub fn parse_period(label: &str) -> Result<Period, FormatError> {
    let label = label.trim();
    let bad = || FormatError::MalformedPeriod(label.to_string());
    let caps = PERIOD_RE.captures(label).ok_or_else(bad)?;
    let year: i32 = caps[1].parse().map_err(|_| bad())?;
    match caps.get(2) {
        None => Ok(Period::annual(year)),
        Some(m) => {
            let month: u32 = m.as_str().parse().map_err(|_| bad())?;
            // Rejects month 0 and 13+.
            NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(bad)?;
            Ok(Period::monthly(year, month))
        }
    }
}

/// Fixed measurement-kind table. Anything else means the export changed.
pub fn map_kind(kind: &str) -> Result<Gender, FormatError> {
    match kind.trim() {
        KIND_TOTAL => Ok(Gender::All),
        KIND_MALE => Ok(Gender::Male),
        KIND_FEMALE => Ok(Gender::Female),
        other => Err(FormatError::UnmappedKind(other.to_string())),
    }
}
