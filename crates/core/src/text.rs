//! Date and text normalization helpers.
//!
//! Pure functions shared by the extractor and the facade: title casing,
//! "Month Day, Year" date conversion, and the input validators.

use std::sync::LazyLock;

use regex::Regex;
use time::Date;
use time::macros::format_description;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z0-9_]\S*").unwrap());
static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static CHART_NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").unwrap());

/// English month names and their two-digit numbers.
pub const MONTHS: [(&str, &str); 12] = [
    ("January", "01"),
    ("February", "02"),
    ("March", "03"),
    ("April", "04"),
    ("May", "05"),
    ("June", "06"),
    ("July", "07"),
    ("August", "08"),
    ("September", "09"),
    ("October", "10"),
    ("November", "11"),
    ("December", "12"),
];

fn month_number(name: &str) -> Option<&'static str> {
    MONTHS.iter().find(|(month, _)| *month == name).map(|(_, number)| *number)
}

/// Converts a string to title case.
///
/// Every token starting with a word character runs until the next
/// whitespace, so `hip-hop` becomes `Hip-hop` rather than `Hip-Hop`.
///
/// ```rust
/// use billboard_core::text::to_title_case;
///
/// assert_eq!(to_title_case("hello woRld"), "Hello World");
/// ```
pub fn to_title_case(s: &str) -> String {
    WORD_RE
        .replace_all(s, |caps: &regex::Captures| {
            let word = &caps[0];
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    let mut out = first.to_uppercase().collect::<String>();
                    out.push_str(&chars.as_str().to_lowercase());
                    out
                }
                None => String::new(),
            }
        })
        .into_owned()
}

/// Converts a "Month Day, Year" date to `YYYY-MM-DD`.
///
/// Returns an empty string when the input does not have that shape or the
/// month name is unknown.
///
/// ```rust
/// use billboard_core::text::format_date_to_yyyymmdd;
///
/// assert_eq!(format_date_to_yyyymmdd("November 19, 2016"), "2016-11-19");
/// assert_eq!(format_date_to_yyyymmdd("not a date"), "");
/// ```
pub fn format_date_to_yyyymmdd(month_day_year: &str) -> String {
    parse_month_day_year(month_day_year).unwrap_or_default()
}

fn parse_month_day_year(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut parts = trimmed.split(',');
    let month_day = parts.next()?.trim();
    let year = parts.next()?.trim();

    let mut month_day = month_day.split(' ');
    let month = month_day.next()?;
    let day = month_day.next()?;

    let month = month_number(month)?;
    if year.is_empty() {
        return None;
    }

    Some(format!("{}-{}-{:0>2}", year, month, day))
}

/// Validates a `YYYY-MM-DD` string that is also a real calendar date.
pub fn is_valid_date_format(date: &str) -> bool {
    if !ISO_DATE_RE.is_match(date) {
        return false;
    }

    let format = format_description!("[year]-[month]-[day]");
    Date::parse(date, &format).is_ok()
}

/// Validates a chart slug: lowercase letters, digits and hyphens.
pub fn is_valid_chart_name(name: &str) -> bool {
    CHART_NAME_RE.is_match(name)
}

/// Trims and collapses every run of whitespace to a single space.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses the integer prefix of a string.
///
/// Leading whitespace and a sign are accepted and trailing characters are
/// ignored, so `" 12 new"` yields `12` and `"-"` yields `None`.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().ok()?;

    Some(if negative { -value } else { value })
}
