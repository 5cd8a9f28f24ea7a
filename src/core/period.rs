//! Natural-language period resolution.
//!
//! Turns phrases like "hoje", "este mês" or "últimos 15 dias" into a
//! half-open `[start, end)` interval expressed in BRT wall-clock time.
//!
//! All user-facing date math happens in a fixed UTC-3 offset with no
//! daylight-saving awareness. That simplification is part of the observable
//! behavior, so the offset lives here as a single named constant instead of
//! a real timezone lookup.

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// Hours to add to a UTC instant to get BRT wall-clock time.
pub const BRT_UTC_OFFSET_HOURS: i64 = -3;

#[allow(clippy::expect_used)]
static LAST_N_DAYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"últimos (\d+) dias").expect("pattern is valid"));

/// A half-open `[start, end)` interval in BRT wall-clock time.
///
/// `end` is always exclusive; reports must render the inclusive end date as
/// `end - 1 day`. Both bounds are whole-day boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    /// Inclusive start, BRT wall clock
    pub start_local: NaiveDateTime,
    /// Exclusive end, BRT wall clock
    pub end_local: NaiveDateTime,
}

impl Period {
    /// The interval start as a UTC instant.
    #[must_use]
    pub fn start_utc(&self) -> DateTime<Utc> {
        brt_to_utc(self.start_local)
    }

    /// The interval end (exclusive) as a UTC instant.
    #[must_use]
    pub fn end_utc(&self) -> DateTime<Utc> {
        brt_to_utc(self.end_local)
    }
}

/// Converts a UTC instant to BRT wall-clock time.
#[must_use]
pub fn utc_to_brt(instant: DateTime<Utc>) -> NaiveDateTime {
    instant.naive_utc() + Duration::hours(BRT_UTC_OFFSET_HOURS)
}

/// Converts a BRT wall-clock time back to a UTC instant.
#[must_use]
pub fn brt_to_utc(local: NaiveDateTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&(local - Duration::hours(BRT_UTC_OFFSET_HOURS)))
}

/// Resolves a natural-language period phrase into a [`Period`].
///
/// Matching is case-insensitive, substring-based and first-match-wins. The
/// rule order is load-bearing: a phrase containing both "mês" and "7 dias"
/// resolves as the month window. Do not reorder without product input.
///
/// Returns `None` when no rule matches.
#[must_use]
pub fn resolve(phrase: &str, now_utc: DateTime<Utc>) -> Option<Period> {
    let now_local = utc_to_brt(now_utc);
    let start_of_today = now_local.date().and_hms_opt(0, 0, 0)?;
    let end_of_today = start_of_today + Duration::days(1);

    let phrase = phrase.to_lowercase();

    let (start_local, end_local) = if phrase.contains("mês") {
        let first_of_month = start_of_today.date().with_day(1)?.and_hms_opt(0, 0, 0)?;
        (first_of_month, end_of_today)
    } else if phrase.contains("hoje") {
        (start_of_today, end_of_today)
    } else if phrase.contains("ontem") {
        (start_of_today - Duration::days(1), start_of_today)
    } else if phrase.contains("semana") || phrase.contains("7 dias") {
        (start_of_today - Duration::days(6), end_of_today)
    } else if let Some(captures) = LAST_N_DAYS.captures(&phrase) {
        let days: i64 = captures.get(1)?.as_str().parse().ok()?;
        (start_of_today - Duration::days(days - 1), end_of_today)
    } else {
        return None;
    };

    Some(Period {
        start_local,
        end_local,
    })
}
