use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Calendar-only layouts, tried in order. Month-first wins for ambiguous
/// slash/dash forms.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%m/%d/%y",
    "%m-%d-%y",
];

/// `%Y` also accepts one or two digits, which would turn `1/5/24` into year 1.
const MIN_FULL_YEAR: i32 = 1000;

/// Layouts carrying a time of day, which is dropped after parsing.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Coerce a raw cell into a calendar date, or `None` if it is not one.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let dated = DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .find(has_full_year);
    if dated.is_some() {
        return dated;
    }

    let timed = DATETIME_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
        .find(has_full_year);
    if timed.is_some() {
        return timed;
    }

    // Offsets are ignored: the local calendar day as written is what counts.
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_rfc2822(s))
        .ok()
        .map(|dt| dt.date_naive())
        .filter(has_full_year)
}

fn has_full_year(date: &NaiveDate) -> bool {
    date.year() >= MIN_FULL_YEAR
}
