//! Timezone abbreviations used by advisories, and the timestamp parsers built on top of them.
//!
//! Advisory text carries local times such as `11:00 PM EDT Tue Jul 01 2014`. Abbreviations are
//! rewritten to fixed `UTC±N` tokens from a lookup table; there is no tz database involved, so a
//! DST variant is simply a different abbreviation.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
    Weekday,
};

use crate::error::{Result, StormError};

/// Priority order matters: only the first abbreviation found is replaced.
pub const ABBREVIATIONS: &[(&str, &str)] = &[
    ("AST", "UTC-4"),
    ("EST", "UTC-5"),
    ("EDT", "UTC-4"),
    ("CST", "UTC-6"),
    ("CDT", "UTC-5"),
    ("MST", "UTC-7"),
    ("MDT", "UTC-6"),
    ("PST", "UTC-8"),
    ("PDT", "UTC-7"),
    ("AKST", "UTC-9"),
    ("AKDT", "UTC-8"),
    ("HST", "UTC-10"),
    ("HAST", "UTC-10"),
    ("HADT", "UTC-9"),
    ("SST", "UTC-11"),
    ("SDT", "UTC-10"),
    ("CHST", "UTC+10"),
];

/// Byte ranges of the alphabetic words in `input`.
fn words(input: &str) -> impl Iterator<Item = (usize, &str)> {
    input
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|w| !w.is_empty())
        .map(move |w| (w.as_ptr() as usize - input.as_ptr() as usize, w))
}

/// Replaces the first known timezone abbreviation with its `UTC±N` token.
///
/// Abbreviations match whole words only, so `HAST` is never mistaken for `AST`. Unknown
/// abbreviations are left untouched.
pub fn normalize_timezone(input: &str) -> String {
    for (abbr, replacement) in ABBREVIATIONS {
        if let Some((start, word)) = words(input).find(|(_, w)| w == abbr) {
            let mut out = String::with_capacity(input.len() + 3);
            out.push_str(&input[..start]);
            out.push_str(replacement);
            out.push_str(&input[start + word.len()..]);
            return out;
        }
    }
    input.to_string()
}

/// Parses a `UTC`, `UTC-4`, `UTC+10`, `GMT` or `Z` token into an offset.
pub fn parse_offset_token(token: &str) -> Option<FixedOffset> {
    let rest = match token {
        "Z" | "UTC" | "GMT" => return FixedOffset::east_opt(0),
        _ => token.strip_prefix("UTC").or_else(|| token.strip_prefix("GMT"))?,
    };
    let (sign, digits) = match rest.split_at_checked(1)? {
        ("+", d) => (1, d),
        ("-", d) => (-1, d),
        _ => return None,
    };
    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h.parse::<i32>().ok()?, m.parse::<i32>().ok()?),
        None => (digits.parse::<i32>().ok()?, 0),
    };
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn weekday(word: &str) -> Option<Weekday> {
    match word.to_ascii_lowercase().as_str() {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tues" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thur" | "thurs" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// `1100` -> `11:00`, `500` -> `5:00`; anything else is returned as-is.
fn colonize_time(token: &str) -> String {
    if (3..=4).contains(&token.len()) && token.bytes().all(|b| b.is_ascii_digit()) {
        let (h, m) = token.split_at(token.len() - 2);
        format!("{h}:{m}")
    } else {
        token.to_string()
    }
}

const DATE_FORMATS: &[&str] = &["%I:%M %p %b %d %Y", "%H:%M %b %d %Y"];
const TIME_FORMATS: &[&str] = &["%I:%M %p", "%H:%M"];

/// Parses advisory-style local timestamps into UTC.
///
/// Accepts strings like `11:00 PM EDT Tue Jul 01 2014`, `1100 AM AST Wed Aug 14 2024`,
/// `11:00 PM EDT Mon` or `5:00 PM CDT`. Missing date parts are taken from `reference`; a bare
/// weekday moves forward from `reference` to the next matching day (same day included). The
/// string must carry a recognizable timezone, otherwise the parse fails.
pub fn parse_local_timestamp(input: &str, reference: NaiveDate) -> Result<DateTime<Utc>> {
    let fail = || StormError::timestamp(input);
    let normalized = normalize_timezone(input);

    let mut offset = None;
    let mut day_of_week = None;
    let mut rest = Vec::new();
    for token in normalized.split_whitespace() {
        let bare = token.trim_matches(|c: char| c == ',' || c == '.');
        if offset.is_none() {
            if let Some(o) = parse_offset_token(bare) {
                offset = Some(o);
                continue;
            }
        }
        if day_of_week.is_none() {
            if let Some(w) = weekday(bare) {
                day_of_week = Some(w);
                continue;
            }
        }
        // Only the leading token can be a compact `HHMM` time; later numbers are days and years.
        if rest.is_empty() {
            rest.push(colonize_time(bare));
        } else {
            rest.push(bare.to_string());
        }
    }
    let offset = offset.ok_or_else(fail)?;
    let rest = rest.join(" ");

    let naive = parse_with_date(&rest, reference)
        .or_else(|| {
            let time = TIME_FORMATS
                .iter()
                .find_map(|f| NaiveTime::parse_from_str(&rest, f).ok())?;
            let date = match day_of_week {
                Some(w) => next_weekday(reference, w),
                None => reference,
            };
            Some(date.and_time(time))
        })
        .ok_or_else(fail)?;

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(fail)
}

fn parse_with_date(rest: &str, reference: NaiveDate) -> Option<NaiveDateTime> {
    let with_year = format!("{rest} {}", reference.year());
    DATE_FORMATS.iter().find_map(|f| {
        NaiveDateTime::parse_from_str(rest, f)
            .or_else(|_| NaiveDateTime::parse_from_str(&with_year, f))
            .ok()
    })
}

fn next_weekday(from: NaiveDate, target: Weekday) -> NaiveDate {
    let ahead = (7 + target.num_days_from_monday() as i64
        - from.weekday().num_days_from_monday() as i64)
        % 7;
    from + Duration::days(ahead)
}

/// Parses the `YYMMDD/HHMM TZ` advisory stamp used by forecast-track placemarks.
pub fn parse_advisory_timestamp(input: &str) -> Result<DateTime<Utc>> {
    let fail = || StormError::timestamp(input);
    let normalized = normalize_timezone(input.trim());
    let (stamp, zone) = normalized.split_once(char::is_whitespace).ok_or_else(fail)?;

    let offset = parse_offset_token(zone.trim()).ok_or_else(fail)?;
    let naive = NaiveDateTime::parse_from_str(stamp, "%y%m%d/%H%M").map_err(|_| fail())?;

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(fail)
}
