//! Codec for the `dateTime.iso8601` scalar.
//!
//! The canonical form is the compact ISO 8601 form `yyyyMMddTHH:mm:ss` without
//! any timezone. Many servers deviate from it, so with the lenient policy the
//! parser also accepts:
//!
//! - a hyphenated date part: `2002-07-06T11:25:37`;
//! - a time part without colons: `20020706T112537`;
//! - a trailing `Z`: `20020706T11:25:37Z`;
//! - a numeric UTC offset `+hh`, `-hh`, `+hhmm` or `+hh:mm`, which is applied
//!   so that the result is always in UTC: `20020706T12:55:37+01:30` is
//!   `2002-07-06T11:25:37`.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Format of the canonical form, in `chrono` syntax
const FORMAT: &str = "%Y%m%dT%H:%M:%S";

/// Returns the sentinel `0001-01-01T00:00:00` that empty and all-zero dates
/// are mapped to under the corresponding [`NonStandard`] flags.
///
/// [`NonStandard`]: crate::NonStandard
pub fn min_value() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .unwrap_or_default()
        .and_time(NaiveTime::default())
}

/// Formats `value` in the canonical compact form, `20020706T11:25:37`.
///
/// The output does not depend on any policy.
pub fn format(value: &NaiveDateTime) -> String {
    value.format(FORMAT).to_string()
}

/// Parses `text` as a UTC date and time.
///
/// When `lenient` is `false`, only the canonical form `yyyyMMddTHH:mm:ss` is
/// accepted. Returns `None` when the text is not a valid date.
pub fn parse(text: &str, lenient: bool) -> Option<NaiveDateTime> {
    let mut cursor = Cursor(text.as_bytes());

    let year = cursor.digits(4)?;
    let hyphenated = lenient && cursor.eat(b'-');
    let month = cursor.digits(2)?;
    if hyphenated && !cursor.eat(b'-') {
        return None;
    }
    let day = cursor.digits(2)?;

    if !cursor.eat(b'T') {
        return None;
    }

    let hour = cursor.digits(2)?;
    let colons = cursor.eat(b':');
    if !colons && !lenient {
        return None;
    }
    let minute = cursor.digits(2)?;
    if colons && !cursor.eat(b':') {
        return None;
    }
    let second = cursor.digits(2)?;

    let offset = if lenient { cursor.offset()? } else { 0 };
    if !cursor.0.is_empty() {
        return None;
    }

    let date = NaiveDate::from_ymd_opt(year as i32, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;
    date.and_time(time)
        .checked_sub_signed(Duration::minutes(offset))
}

/// Returns `true` if `text` is one of the all-zero placeholders that some
/// servers send instead of a missing date.
pub fn is_zero_date(text: &str) -> bool {
    matches!(
        text,
        "00000000T00:00:00" | "00000000T00:00:00Z" | "0000-00-00T00:00:00" | "0000-00-00T00:00:00Z"
    )
}

/// A forward-only view of the unparsed part of the input
struct Cursor<'a>(&'a [u8]);

impl<'a> Cursor<'a> {
    /// Consumes `byte` if the input starts with it
    fn eat(&mut self, byte: u8) -> bool {
        match self.0.split_first() {
            Some((b, rest)) if *b == byte => {
                self.0 = rest;
                true
            }
            _ => false,
        }
    }

    /// Consumes exactly `count` ASCII digits and returns their value
    fn digits(&mut self, count: usize) -> Option<u32> {
        if self.0.len() < count {
            return None;
        }
        let (digits, rest) = self.0.split_at(count);
        let mut value = 0;
        for b in digits {
            if !b.is_ascii_digit() {
                return None;
            }
            value = value * 10 + u32::from(b - b'0');
        }
        self.0 = rest;
        Some(value)
    }

    /// Consumes the optional timezone suffix and returns the offset from UTC
    /// in minutes
    fn offset(&mut self) -> Option<i64> {
        let sign = match self.0.first() {
            None => return Some(0),
            Some(b'Z') => {
                self.0 = &self.0[1..];
                return Some(0);
            }
            Some(b'+') => 1,
            Some(b'-') => -1,
            Some(_) => return None,
        };
        self.0 = &self.0[1..];

        let hours = i64::from(self.digits(2)?);
        let minutes = if self.0.is_empty() {
            0
        } else {
            self.eat(b':');
            i64::from(self.digits(2)?)
        };
        if hours > 23 || minutes >= 60 {
            return None;
        }
        Some(sign * (hours * 60 + minutes))
    }
}
