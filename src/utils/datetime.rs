use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};

/// Both scraped sites publish in Moscow time (UTC+3).
pub fn moscow() -> FixedOffset {
    FixedOffset::east_opt(3 * 3600).unwrap_or_else(|| Utc.fix())
}

const RU_MONTHS: [&str; 12] = [
    "января", "февраля", "марта", "апреля", "мая", "июня",
    "июля", "августа", "сентября", "октября", "ноября", "декабря",
];

/// Parses dates like `5 апреля 2025, 23:22` as Moscow time.
pub fn parse_russian_datetime(input: &str) -> Option<DateTime<Utc>> {
    let (date_part, time_part) = input.trim().split_once(',')?;
    let mut parts = date_part.split_whitespace();
    let day: u32 = parts.next()?.parse().ok()?;
    let month_name = parts.next()?.to_lowercase();
    let year: i32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let month = RU_MONTHS.iter().position(|m| *m == month_name)? as u32 + 1;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::parse_from_str(time_part.trim(), "%H:%M").ok()?;
    localize_moscow(date.and_time(time))
}

/// Parses ISO-8601 timestamps as they appear in page metadata.
///
/// Accepts a trailing `Z`, a trailing `MSK`, and the `2025-04-0523:22:00+03:00`
/// form with the `T` separator missing. Timestamps without an offset are
/// taken as Moscow time.
pub fn parse_iso_lenient(input: &str) -> Option<DateTime<Utc>> {
    let mut value = input.trim().trim_end_matches("MSK").trim().to_string();
    if value.len() > 10 && value.is_char_boundary(10) && !value.contains('T') && !value.contains(' ') {
        value.insert(10, 'T');
    }
    let value = value.replacen(' ', "T", 1);

    if let Ok(dt) = DateTime::parse_from_rfc3339(&value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(&value, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&value, fmt) {
            return localize_moscow(naive);
        }
    }
    None
}

fn localize_moscow(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    moscow()
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Short form used in channel posts, in Moscow time.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&moscow()).format("%d.%m.%Y %H:%M").to_string()
}
