//! D-Day arithmetic on Korea Standard Time calendar dates
//!
//! The API publishes application windows as free-form strings: `20260131`,
//! `2026.01.31`, `2026-01-31`, or phrases such as `상시 신청`. Anything that is
//! not a concrete date is treated as year-round.

use benefitbell_common::BenefitStatus;
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};

/// D-Day reported for year-round or undated benefits.
pub const YEAR_ROUND_D_DAY: i64 = 365;

/// Registration age (days) under which a benefit counts as new.
pub const NEW_BENEFIT_WINDOW_DAYS: i64 = 90;

const KST_OFFSET_HOURS: i64 = 9;
const YEAR_ROUND_MARKERS: [&str; 3] = ["상시", "연중", "별도"];

/// Current wall-clock time in KST (UTC+9, no DST).
pub fn kst_now() -> NaiveDateTime {
    utc_to_kst(Utc::now())
}

pub fn utc_to_kst(utc: chrono::DateTime<Utc>) -> NaiveDateTime {
    (utc + Duration::hours(KST_OFFSET_HOURS)).naive_utc()
}

/// Today's date in KST.
pub fn today_kst() -> NaiveDate {
    kst_now().date()
}

/// Convert a KST wall-clock time to UTC.
pub fn kst_to_utc(kst: NaiveDateTime) -> chrono::DateTime<Utc> {
    chrono::DateTime::from_naive_utc_and_offset(kst - Duration::hours(KST_OFFSET_HOURS), Utc)
}

pub fn is_year_round(s: &str) -> bool {
    YEAR_ROUND_MARKERS.iter().any(|marker| s.contains(marker))
}

fn leading_ymd(digits: &str) -> Option<NaiveDate> {
    let ymd = digits.get(..8)?;
    if !ymd.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let year = ymd[..4].parse().ok()?;
    let month = ymd[4..6].parse().ok()?;
    let day = ymd[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse `YYYYMMDD` after dropping `.`, `-`, `/` and whitespace.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '.' | '-' | '/') && !c.is_whitespace())
        .collect();
    leading_ymd(&cleaned)
}

/// Days from `today` until `end`; 0 closes today, negative is closed.
pub fn d_day(end: Option<&str>, today: NaiveDate) -> i64 {
    let Some(end) = end.map(str::trim).filter(|s| !s.is_empty()) else {
        return YEAR_ROUND_D_DAY;
    };
    if is_year_round(end) {
        return YEAR_ROUND_D_DAY;
    }

    match parse_date(end) {
        Some(end_date) => (end_date - today).num_days(),
        None => YEAR_ROUND_D_DAY,
    }
}

pub fn status(start: Option<&str>, end: Option<&str>, today: NaiveDate) -> BenefitStatus {
    if d_day(end, today) < 0 {
        return BenefitStatus::Closed;
    }

    match start.and_then(parse_date) {
        Some(start_date) if start_date > today => BenefitStatus::Upcoming,
        _ => BenefitStatus::Open,
    }
}

/// Whether a first-registration timestamp falls within the last 90 days.
///
/// Accepts `YYYY-MM-DD`, `YYYY.MM.DD`, `YYYYMMDDhhmmss` and ISO-8601.
pub fn is_recently_registered(ts: &str, today: NaiveDate) -> bool {
    let digits: String = ts
        .chars()
        .filter(|c| !matches!(c, '.' | '-' | '/' | 'T' | ':') && !c.is_whitespace())
        .collect();

    match leading_ymd(&digits) {
        Some(registered) => (today - registered).num_days() <= NEW_BENEFIT_WINDOW_DAYS,
        None => false,
    }
}

pub fn d_day_label(d_day: i64) -> String {
    match d_day {
        d if d < 0 => "마감".to_string(),
        0 => "D-Day".to_string(),
        d => format!("D-{d}"),
    }
}
