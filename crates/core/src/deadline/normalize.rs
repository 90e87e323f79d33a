//! Deadline normalization pass.
//!
//! Maps the extraction service's raw deadlines through the date expression
//! resolver. The pass never drops or reorders entries: a date that fails to
//! resolve surfaces as an empty string so the user can correct it by hand.

use chrono::NaiveDate;
use echodue_domain::{CanonicalDeadline, RawDeadline};
use tracing::debug;

use super::resolver::resolve_deadline_date;

/// Normalize a batch of raw deadlines against a reference date.
///
/// Output order and length always equal the input's; subjects pass through
/// untouched.
#[must_use]
pub fn normalize_deadlines(raw: &[RawDeadline], reference: NaiveDate) -> Vec<CanonicalDeadline> {
    raw.iter()
        .map(|deadline| {
            let date = resolve_deadline_date(&deadline.date, reference)
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default();

            if date.is_empty() {
                debug!(raw_date = %deadline.date, "deadline date did not resolve");
            }

            CanonicalDeadline { date, subject: deadline.subject.clone() }
        })
        .collect()
}
