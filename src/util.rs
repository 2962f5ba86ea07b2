// Parsing and formatting helpers.
//
// All "dirty" cell handling lives here so the loader and queries can work
// with typed values.
use num_format::{Locale, ToFormattedString};

/// Parse a population cell into `f64`, forgiving the usual export noise.
///
/// - Trims whitespace and strips thousands separators (`","`).
/// - Rejects values containing letters (KOSIS uses `X` for suppressed cells).
/// - Rejects `-` placeholders and non-finite results.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_population(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    if s.chars().any(|c| c.is_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Sum the present values; missing values contribute nothing.
pub fn sum_present<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    // `Sum for f64` starts at -0.0; an empty sum must read as 0.
    values.into_iter().flatten().fold(0.0, |acc, v| acc + v)
}

/// `51_200_000.0` -> `"51.20 M"`.
pub fn format_millions(n: f64) -> String {
    format!("{:.2} M", n / 1_000_000.0)
}

/// `(↑, 200_000.0)` -> `"↑ 200.0 K"`. The sign is carried by the arrow.
pub fn format_thousands_delta(arrow: &str, delta: f64) -> String {
    format!("{} {:.1} K", arrow, delta.abs() / 1_000.0)
}

/// Whole-number population with thousands separators, or `-` when missing.
pub fn format_population(n: Option<f64>) -> String {
    match n {
        Some(v) => (v.round() as i64).to_formatted_string(&Locale::en),
        None => "-".to_string(),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// FNV-1a over raw bytes; used to fingerprint source file contents.
pub fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut h = OFFSET;
    for b in bytes {
        h ^= u64::from(*b);
        h = h.wrapping_mul(PRIME);
    }
    h
}
