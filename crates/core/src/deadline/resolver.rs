//! Date expression resolver.
//!
//! Turns a raw deadline date expression into a canonical calendar date.
//! Two independent strategies exist: relative weekday expressions
//! ("next Friday", "last Monday") and absolute formats ("2025-06-03",
//! "3rd of June 2025", "3-6-2025", "3/6/2025", "3rd of June"). Input
//! containing any letter tries the weekday strategy first and falls back to
//! the absolute formats; purely numeric input goes straight to the absolute
//! formats.
//!
//! Resolution failure is `None`, never a panic or an error type: one
//! unparsable deadline must not take the rest of a batch down with it.

use chrono::{Datelike, Duration, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Optional modifier followed by a weekday name, anywhere in the text.
    static ref WEEKDAY_EXPR: Regex = Regex::new(
        r"(?i)(next|previous|this|last)?\s*(monday|tuesday|wednesday|thursday|friday|saturday|sunday)"
    )
    .expect("weekday pattern is valid");

    /// Ordinal suffix on a day token ("3rd", "21st").
    static ref ORDINAL_SUFFIX: Regex =
        Regex::new(r"(\d+)(st|nd|rd|th)").expect("ordinal pattern is valid");

    /// Already-canonical yyyy-MM-dd.
    static ref CANONICAL: Regex =
        Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("canonical pattern is valid");

    /// "<day> of <MonthName> <year>"; years must be four digits.
    static ref DAY_OF_MONTH_YEAR: Regex =
        Regex::new(r"^(\d{1,2}) of ([A-Za-z]+) (\d{4})$").expect("pattern is valid");

    /// "<day>-<month>-<year>".
    static ref DAY_DASH: Regex =
        Regex::new(r"^(\d{1,2})-(\d{1,2})-(\d{4})$").expect("pattern is valid");

    /// "<day>/<month>/<year>".
    static ref DAY_SLASH: Regex =
        Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("pattern is valid");

    /// "<day> of <MonthName>" with the year left implied.
    static ref DAY_OF_MONTH: Regex =
        Regex::new(r"^(\d{1,2}) of ([A-Za-z]+)$").expect("pattern is valid");
}

/// English month table; the only locale the resolver understands.
const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Weekday ordinals, 0 = Sunday through 6 = Saturday.
const WEEKDAY_NAMES: [&str; 7] =
    ["sunday", "monday", "tuesday", "wednesday", "thursday", "friday", "saturday"];

/// Resolve a raw date expression against a reference date.
///
/// Returns the resolved calendar date, or `None` when neither strategy can
/// make sense of the input (including syntactically plausible but
/// semantically invalid dates such as a 32nd day).
#[must_use]
pub fn resolve_deadline_date(text: &str, reference: NaiveDate) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if text.chars().any(|c| c.is_ascii_alphabetic()) {
        if let Some(date) = resolve_relative_weekday(text, reference) {
            return Some(date);
        }
    }

    resolve_absolute(text, reference)
}

/// Relative-weekday strategy.
///
/// `next`, `this`, and a bare weekday all resolve to the next occurrence
/// strictly after the reference (never the reference itself, even when it
/// falls on the named weekday); `previous`/`last` resolve strictly before.
fn resolve_relative_weekday(text: &str, reference: NaiveDate) -> Option<NaiveDate> {
    let caps = WEEKDAY_EXPR.captures(text)?;

    let modifier =
        caps.get(1).map_or_else(|| "this".to_string(), |m| m.as_str().to_ascii_lowercase());
    let target = weekday_ordinal(&caps[2])?;
    let current = reference.weekday().num_days_from_sunday();

    match modifier.as_str() {
        "previous" | "last" => {
            let mut back = (current + 7 - target) % 7;
            if back == 0 {
                back = 7;
            }
            Some(reference - Duration::days(i64::from(back)))
        }
        _ => {
            let mut ahead = (target + 7 - current) % 7;
            if ahead == 0 {
                ahead = 7;
            }
            Some(reference + Duration::days(i64::from(ahead)))
        }
    }
}

/// Absolute-format strategy.
///
/// Formats are tried in fixed priority order; the first one that parses to
/// a valid calendar date wins. Canonical-looking input is still calendar
/// validated so that e.g. a 13th month fails instead of passing through.
fn resolve_absolute(text: &str, reference: NaiveDate) -> Option<NaiveDate> {
    if CANONICAL.is_match(text) {
        return NaiveDate::parse_from_str(text, "%Y-%m-%d").ok();
    }

    // Strip the ordinal suffix from the day token ("3rd of June" -> "3 of June").
    let cleaned = ORDINAL_SUFFIX.replace(text, "$1");
    let cleaned = cleaned.as_ref();

    if let Some(caps) = DAY_OF_MONTH_YEAR.captures(cleaned) {
        if let Some(date) = named_month_date(&caps[3], &caps[2], &caps[1]) {
            return Some(date);
        }
    }

    if let Some(caps) = DAY_DASH.captures(cleaned) {
        if let Some(date) = numeric_date(&caps[3], &caps[2], &caps[1]) {
            return Some(date);
        }
    }

    if let Some(caps) = DAY_SLASH.captures(cleaned) {
        if let Some(date) = numeric_date(&caps[3], &caps[2], &caps[1]) {
            return Some(date);
        }
    }

    if let Some(caps) = DAY_OF_MONTH.captures(cleaned) {
        let month = month_ordinal(&caps[2])?;
        let day = caps[1].parse().ok()?;
        return NaiveDate::from_ymd_opt(reference.year(), month, day);
    }

    None
}

fn named_month_date(year: &str, month_name: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month_ordinal(month_name)?, day.parse().ok()?)
}

fn numeric_date(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn month_ordinal(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    MONTH_NAMES.iter().position(|m| *m == lower).map(|i| i as u32 + 1)
}

fn weekday_ordinal(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    WEEKDAY_NAMES.iter().position(|w| *w == lower).map(|i| i as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Wednesday.
    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 11).unwrap()
    }

    fn resolve(text: &str) -> Option<String> {
        resolve_deadline_date(text, reference()).map(|d| d.format("%Y-%m-%d").to_string())
    }

    #[test]
    fn test_canonical_input_passes_through_unchanged() {
        assert_eq!(resolve("2025-06-03").as_deref(), Some("2025-06-03"));
        assert_eq!(resolve("1999-12-31").as_deref(), Some("1999-12-31"));
    }

    #[test]
    fn test_canonical_looking_but_invalid_date_fails() {
        assert_eq!(resolve("2025-13-05"), None);
        assert_eq!(resolve("2025-02-30"), None);
    }

    #[test]
    fn test_next_weekday_is_strictly_after_reference() {
        // Reference is Wednesday 2025-06-11.
        assert_eq!(resolve("next Friday").as_deref(), Some("2025-06-13"));
        assert_eq!(resolve("next Monday").as_deref(), Some("2025-06-16"));
        // The reference weekday itself resolves a full week ahead, never today.
        assert_eq!(resolve("next Wednesday").as_deref(), Some("2025-06-18"));
    }

    #[test]
    fn test_unmodified_and_this_behave_like_next() {
        assert_eq!(resolve("Friday").as_deref(), Some("2025-06-13"));
        assert_eq!(resolve("this Tuesday").as_deref(), Some("2025-06-17"));
        assert_eq!(resolve("this Wednesday").as_deref(), Some("2025-06-18"));
    }

    #[test]
    fn test_previous_and_last_are_strictly_before_reference() {
        assert_eq!(resolve("last Friday").as_deref(), Some("2025-06-06"));
        assert_eq!(resolve("previous Monday").as_deref(), Some("2025-06-09"));
        assert_eq!(resolve("last Wednesday").as_deref(), Some("2025-06-04"));
    }

    #[test]
    fn test_weekday_matching_is_case_insensitive() {
        assert_eq!(resolve("NEXT FRIDAY"), resolve("next Friday"));
        assert_eq!(resolve("Last friday"), resolve("last Friday"));
    }

    #[test]
    fn test_reference_on_the_named_weekday_never_returns_itself() {
        // 2025-06-13 is a Friday.
        let friday = NaiveDate::from_ymd_opt(2025, 6, 13).unwrap();
        assert_eq!(
            resolve_deadline_date("next Friday", friday),
            NaiveDate::from_ymd_opt(2025, 6, 20)
        );
        assert_eq!(
            resolve_deadline_date("last Friday", friday),
            NaiveDate::from_ymd_opt(2025, 6, 6)
        );
    }

    #[test]
    fn test_absolute_named_month_with_year() {
        assert_eq!(resolve("3rd of June 2025").as_deref(), Some("2025-06-03"));
        assert_eq!(resolve("21st of December 2026").as_deref(), Some("2026-12-21"));
    }

    #[test]
    fn test_absolute_numeric_formats_are_day_first() {
        assert_eq!(resolve("3-6-2025").as_deref(), Some("2025-06-03"));
        assert_eq!(resolve("3/6/2025").as_deref(), Some("2025-06-03"));
        assert_eq!(resolve("31/1/2026").as_deref(), Some("2026-01-31"));
    }

    #[test]
    fn test_implied_year_comes_from_reference() {
        assert_eq!(resolve("3rd of June").as_deref(), Some("2025-06-03"));
        let next_year = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(
            resolve_deadline_date("3rd of June", next_year),
            NaiveDate::from_ymd_opt(2026, 6, 3)
        );
    }

    #[test]
    fn test_semantically_invalid_dates_fail_instead_of_wrapping() {
        assert_eq!(resolve("the 32nd of June 2025"), None);
        assert_eq!(resolve("31/2/2025"), None);
        assert_eq!(resolve("31-4-2025"), None);
    }

    #[test]
    fn test_two_digit_years_are_rejected() {
        assert_eq!(resolve("3-6-25"), None);
        assert_eq!(resolve("3/6/25"), None);
        assert_eq!(resolve("3rd of June 25"), None);
    }

    #[test]
    fn test_unknown_month_names_fail() {
        assert_eq!(resolve("3rd of Juny 2025"), None);
    }

    #[test]
    fn test_textual_input_without_weekday_falls_back_to_absolute() {
        // Contains letters, so the weekday strategy runs first and fails
        // without consuming the input.
        assert_eq!(resolve("3rd of June 2025").as_deref(), Some("2025-06-03"));
    }

    #[test]
    fn test_unresolvable_input_fails_quietly() {
        assert_eq!(resolve(""), None);
        assert_eq!(resolve("soon"), None);
        assert_eq!(resolve("June"), None);
        assert_eq!(resolve("12345"), None);
    }
}
