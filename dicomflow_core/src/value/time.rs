//! Work with the DICOM `TM` (Time) value representation.

use regex::Regex;

use crate::data_error::DataError;

/// A structured time decoded from, or to be encoded as, a `Time` value.
/// Hour is required; minute, second, and fractional second are optional but
/// each requires all components to its left to be present.
///
#[derive(Clone, Debug, PartialEq)]
pub struct StructuredTime {
  pub hour: u8,
  pub minute: Option<u8>,
  pub second: Option<u8>,
  pub fraction: Option<u32>,
}

const PARSE_TIME_REGEX: &str =
  r"^(\d\d)(?:(\d\d)(?:(\d\d)(?:\.(\d{1,6}))?)?)?$";

impl StructuredTime {
  /// Decodes a `Time` value's raw bytes into a structured time.
  ///
  pub fn from_bytes(bytes: &[u8]) -> Result<Self, DataError> {
    let s = std::str::from_utf8(bytes)
      .map_err(|_| DataError::new_value_invalid("Time is invalid UTF-8".to_string()))?;

    let s = s.trim_matches('\0').trim();

    match Regex::new(PARSE_TIME_REGEX).unwrap().captures(s) {
      Some(caps) => Ok(Self {
        hour: caps[1].parse().unwrap(),
        minute: caps.get(2).map(|m| m.as_str().parse().unwrap()),
        second: caps.get(3).map(|m| m.as_str().parse().unwrap()),
        fraction: caps.get(4).map(|m| {
          let digits = m.as_str();
          let micros: u32 = digits.parse().unwrap();
          micros * 10u32.pow(6 - digits.len() as u32)
        }),
      }),

      None => Err(DataError::new_value_invalid(format!("Time is invalid: '{s}'"))),
    }
  }

  /// Formats this structured time as an ISO 8601 time, e.g. `"14:30:05.5"`.
  ///
  pub fn to_iso8601(&self) -> String {
    let mut s = format!("{:02}", self.hour);

    if let Some(minute) = self.minute {
      s.push_str(&format!(":{minute:02}"));
    }
    if let Some(second) = self.second {
      s.push_str(&format!(":{second:02}"));
    }
    if let Some(fraction) = self.fraction {
      s.push_str(&format!(".{:06}", fraction).trim_end_matches('0').to_string());
    }

    s
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn from_bytes_test() {
    assert_eq!(
      StructuredTime::from_bytes(b"143005"),
      Ok(StructuredTime { hour: 14, minute: Some(30), second: Some(5), fraction: None })
    );

    assert_eq!(
      StructuredTime::from_bytes(b"14"),
      Ok(StructuredTime { hour: 14, minute: None, second: None, fraction: None })
    );

    assert!(StructuredTime::from_bytes(b"xx").is_err());
  }

  #[test]
  fn to_iso8601_test() {
    assert_eq!(
      StructuredTime { hour: 14, minute: Some(30), second: Some(5), fraction: None }
        .to_iso8601(),
      "14:30:05"
    );
  }
}
