//! Date rendering for the `id-ID` locale in the Asia/Jakarta timezone.

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};

// WIB has no daylight saving, a fixed offset is exact.
const JAKARTA_OFFSET_SECS: i32 = 7 * 3600;

const MONTHS_LONG: [&str; 12] = [
    "Januari", "Februari", "Maret", "April", "Mei", "Juni",
    "Juli", "Agustus", "September", "Oktober", "November", "Desember",
];

const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun",
    "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

fn jakarta() -> FixedOffset {
    FixedOffset::east_opt(JAKARTA_OFFSET_SECS).expect("UTC+7 is a valid offset")
}

/// Medium date, short time: `18 Okt 2026, 14.05`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    let local = at.with_timezone(&jakarta());
    format!(
        "{} {} {}, {:02}.{:02}",
        local.day(),
        MONTHS_SHORT[local.month0() as usize],
        local.year(),
        local.hour(),
        local.minute(),
    )
}

/// Long form used on the receipt: `08 Oktober 2026 pukul 14.05.09`.
pub fn format_tanggal(at: DateTime<Utc>) -> String {
    let local = at.with_timezone(&jakarta());
    format!(
        "{:02} {} {} pukul {:02}.{:02}.{:02}",
        local.day(),
        MONTHS_LONG[local.month0() as usize],
        local.year(),
        local.hour(),
        local.minute(),
        local.second(),
    )
}

/// Formats an RFC 3339 timestamp from the backend, passing anything else through.
pub fn format_record_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => format_tanggal(parsed.with_timezone(&Utc)),
        Err(_) => raw.to_string(),
    }
}
