//! Work with the DICOM `DA` (Date) value representation.

use regex::Regex;

use crate::data_error::DataError;

/// A structured date decoded from, or to be encoded as, a `Date` value.
///
#[derive(Clone, Debug, PartialEq)]
pub struct StructuredDate {
  pub year: u16,
  pub month: u8,
  pub day: u8,
}

const PARSE_DATE_REGEX: &str = r"^(\d{4})(\d\d)(\d\d)$";

impl StructuredDate {
  /// Decodes a `Date` value's raw bytes into a structured date.
  ///
  pub fn from_bytes(bytes: &[u8]) -> Result<Self, DataError> {
    let date_string = std::str::from_utf8(bytes)
      .map_err(|_| DataError::new_value_invalid("Date is invalid UTF-8".to_string()))?;

    let date_string = date_string.trim_matches('\0').trim();

    match Regex::new(PARSE_DATE_REGEX).unwrap().captures(date_string) {
      Some(caps) => Ok(Self {
        year: caps[1].parse().unwrap(),
        month: caps[2].parse().unwrap(),
        day: caps[3].parse().unwrap(),
      }),

      None => Err(DataError::new_value_invalid(format!(
        "Date is invalid: '{date_string}'"
      ))),
    }
  }

  /// Encodes this structured date as `Date` value bytes.
  ///
  pub fn to_bytes(&self) -> Result<Vec<u8>, DataError> {
    if self.year > 9999 {
      return Err(DataError::new_value_invalid(format!(
        "Date's year is invalid: {}",
        self.year
      )));
    }

    if !(1..=12).contains(&self.month) {
      return Err(DataError::new_value_invalid(format!(
        "Date's month is invalid: {}",
        self.month
      )));
    }

    if !(1..=31).contains(&self.day) {
      return Err(DataError::new_value_invalid(format!(
        "Date's day is invalid: {}",
        self.day
      )));
    }

    Ok(format!("{:04}{:02}{:02}", self.year, self.month, self.day).into_bytes())
  }

  /// Formats this structured date as an ISO 8601 date, e.g. `"2024-07-02"`.
  ///
  pub fn to_iso8601(&self) -> String {
    format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
  }
}
