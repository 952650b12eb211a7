//! Wall-clock dose times.
//!
//! Dose times carry no date and repeat every day. The backend stores them
//! as free text, and older records hold whatever the time picker produced
//! ("8:00 a.m.", "10:00 AM", "21:30"), so parsing is lenient while
//! serialization is always `HH:MM`.

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serializer};

const FORMATS_24H: &[&str] = &["%H:%M", "%H:%M:%S"];
const FORMATS_12H: &[&str] = &["%I:%M %p", "%I:%M:%S %p"];

/// Parse a clock time in any of the formats seen on the wire.
pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in FORMATS_24H {
        if let Ok(t) = NaiveTime::parse_from_str(trimmed, fmt) {
            return Some(t);
        }
    }

    let normalized = normalize_meridiem(trimmed)?;
    FORMATS_12H
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&normalized, fmt).ok())
}

/// "8:00 a. m." / "8:00\u{a0}p.\u{a0}m." / "8:00PM" → "8:00 AM|PM".
fn normalize_meridiem(raw: &str) -> Option<String> {
    let upper = raw.to_uppercase();
    let split = upper.find(['A', 'P'])?;
    let (time, marker) = upper.split_at(split);
    let marker: String = marker
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect();
    Some(format!("{} {marker}", time.trim()))
}

pub fn format_clock(time: &NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// serde adapter for `hora_dosis`.
pub mod clock_time {
    use super::*;

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_clock(time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse_clock(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognised dose time: {raw:?}")))
    }
}
