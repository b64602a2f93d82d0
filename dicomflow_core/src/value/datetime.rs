//! Work with the DICOM `DT` (DateTime) value representation.

use regex::Regex;

use crate::data_error::DataError;
use crate::value::date::StructuredDate;
use crate::value::time::StructuredTime;

/// A structured date/time decoded from, or to be encoded as, a `DateTime`
/// value. `time` and `offset` (in minutes from UTC) are optional.
///
#[derive(Clone, Debug, PartialEq)]
pub struct StructuredDateTime {
  pub date: StructuredDate,
  pub time: Option<StructuredTime>,
  pub offset_minutes: Option<i32>,
}

const PARSE_DATETIME_REGEX: &str =
  r"^(\d{4})(\d\d)?(\d\d)?(?:(\d\d)(\d\d)?(\d\d)?(?:\.(\d{1,6}))?)?([+-]\d{4})?$";

impl StructuredDateTime {
  /// Decodes a `DateTime` value's raw bytes into a structured date/time.
  ///
  pub fn from_bytes(bytes: &[u8]) -> Result<Self, DataError> {
    let s = std::str::from_utf8(bytes)
      .map_err(|_| DataError::new_value_invalid("DateTime is invalid UTF-8".to_string()))?;

    let s = s.trim_matches('\0').trim();

    let caps = Regex::new(PARSE_DATETIME_REGEX)
      .unwrap()
      .captures(s)
      .ok_or_else(|| DataError::new_value_invalid(format!("DateTime is invalid: '{s}'")))?;

    let year: u16 = caps[1].parse().unwrap();
    let month: u8 = caps.get(2).map(|m| m.as_str().parse().unwrap()).unwrap_or(1);
    let day: u8 = caps.get(3).map(|m| m.as_str().parse().unwrap()).unwrap_or(1);

    let time = caps.get(4).map(|hour| StructuredTime {
      hour: hour.as_str().parse().unwrap(),
      minute: caps.get(5).map(|m| m.as_str().parse().unwrap()),
      second: caps.get(6).map(|m| m.as_str().parse().unwrap()),
      fraction: caps.get(7).map(|m| {
        let digits = m.as_str();
        let micros: u32 = digits.parse().unwrap();
        micros * 10u32.pow(6 - digits.len() as u32)
      }),
    });

    let offset_minutes = caps.get(8).map(|m| {
      let s = m.as_str();
      let sign = if s.starts_with('-') { -1 } else { 1 };
      let hours: i32 = s[1..3].parse().unwrap();
      let minutes: i32 = s[3..5].parse().unwrap();
      sign * (hours * 60 + minutes)
    });

    Ok(Self { date: StructuredDate { year, month, day }, time, offset_minutes })
  }

  /// Formats this structured date/time as ISO 8601, e.g.
  /// `"2024-07-02T14:30:05+05:00"`.
  ///
  pub fn to_iso8601(&self) -> String {
    let mut s = self.date.to_iso8601();

    if let Some(time) = &self.time {
      s.push('T');
      s.push_str(&time.to_iso8601());
    }

    if let Some(offset_minutes) = self.offset_minutes {
      let sign = if offset_minutes < 0 { '-' } else { '+' };
      let abs = offset_minutes.unsigned_abs();
      s.push_str(&format!("{sign}{:02}:{:02}", abs / 60, abs % 60));
    }

    s
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn from_bytes_test() {
    let dt = StructuredDateTime::from_bytes(b"20240702143005+0500").unwrap();

    assert_eq!(dt.date, StructuredDate { year: 2024, month: 7, day: 2 });
    assert_eq!(dt.offset_minutes, Some(300));
  }

  #[test]
  fn year_only_test() {
    let dt = StructuredDateTime::from_bytes(b"2024").unwrap();
    assert_eq!(dt.date, StructuredDate { year: 2024, month: 1, day: 1 });
    assert!(dt.time.is_none());
  }

  #[test]
  fn to_iso8601_test() {
    let dt = StructuredDateTime::from_bytes(b"20240702143005+0500").unwrap();
    assert_eq!(dt.to_iso8601(), "2024-07-02T14:30:05+05:00");
  }
}
