use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;

/// Formats a currency amount with a unit suffix: `$1.2B`, `$45.6M`, `$3.4K`, `$999`.
pub fn format_currency(amount: f64) -> String {
    const UNITS: [(f64, &str); 3] = [(1e9, "B"), (1e6, "M"), (1e3, "K")];

    let sign = if amount < 0.0 { "-" } else { "" };
    let magnitude = amount.abs();
    for (scale, suffix) in UNITS {
        if magnitude >= scale {
            return format!("{sign}${:.1}{suffix}", magnitude / scale);
        }
    }

    format!("{sign}${}", magnitude.round() as u64)
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|date| date.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "undated".to_owned())
}

/// Accepts `2023-04-02` as well as RFC 3339 date-times; only the calendar date is kept.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

pub fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_uses_unit_suffixes() {
        assert_eq!(format_currency(1_234_000_000.0), "$1.2B");
        assert_eq!(format_currency(45_600_000.0), "$45.6M");
        assert_eq!(format_currency(12_345.0), "$12.3K");
        assert_eq!(format_currency(999.0), "$999");
        assert_eq!(format_currency(0.0), "$0");
    }

    #[test]
    fn currency_thresholds_are_inclusive() {
        assert_eq!(format_currency(1_000_000_000.0), "$1.0B");
        assert_eq!(format_currency(1_000_000.0), "$1.0M");
        assert_eq!(format_currency(1_000.0), "$1.0K");
    }

    #[test]
    fn parse_date_accepts_plain_and_rfc3339() {
        let expected = NaiveDate::from_ymd_opt(2023, 4, 2);
        assert_eq!(parse_date("2023-04-02"), expected);
        assert_eq!(parse_date("2023-04-02T10:30:00Z"), expected);
        assert_eq!(parse_date("last spring"), None);
    }

    #[test]
    fn stable_pair_is_stable_and_bounded() {
        let first = stable_pair("company-17");
        assert_eq!(first, stable_pair("company-17"));
        assert!((-1.0..=1.0).contains(&first.0));
        assert!((-1.0..=1.0).contains(&first.1));
    }
}
