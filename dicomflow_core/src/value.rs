//! A DICOM data element value: raw bytes tagged with a [`ValueRepresentation`],
//! decoded into a more specific type only on request.

use byteorder::{ByteOrder, LittleEndian};

use crate::bytes::SharedBytes;
use crate::data_error::DataError;
use crate::value::date::StructuredDate;
use crate::value::datetime::StructuredDateTime;
use crate::value::person_name::StructuredPersonName;
use crate::value::time::StructuredTime;
use crate::vr::{ValueKind, ValueRepresentation};

pub mod date;
pub mod datetime;
pub mod person_name;
pub mod time;

/// A data element's value: the VR that governs how its bytes are
/// interpreted, plus the raw bytes themselves (always stored little
/// endian and, for string VRs, always already decoded to UTF-8).
///
/// Decoding into a structured type only happens when a caller asks for one,
/// so values that are never inspected never pay a parsing cost, and values
/// that don't conform exactly to the standard can still be carried through
/// unmodified.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Value {
  vr: ValueRepresentation,
  bytes: SharedBytes,
}

impl Value {
  /// Creates a new value from raw bytes for the given VR. The bytes must
  /// already be little endian and, for encoded-string VRs, already decoded
  /// to UTF-8.
  ///
  pub fn new(vr: ValueRepresentation, bytes: SharedBytes) -> Self {
    Self { vr, bytes }
  }

  /// Creates a new value from an owned byte vector.
  ///
  pub fn from_bytes(vr: ValueRepresentation, bytes: Vec<u8>) -> Self {
    Self::new(vr, SharedBytes::from_vec(bytes))
  }

  pub fn vr(&self) -> ValueRepresentation {
    self.vr
  }

  /// Returns this value's raw bytes, unpadded trailing padding byte removed
  /// if present.
  ///
  pub fn bytes(&self) -> &[u8] {
    let bytes: &[u8] = &self.bytes;

    match bytes.last() {
      Some(&last) if last == self.vr.padding_byte() && bytes.len() % 2 == 0 => {
        &bytes[..bytes.len() - 1]
      }
      _ => bytes,
    }
  }

  /// Returns the raw, un-trimmed bytes as stored, including any padding
  /// byte used to make the value's length even.
  ///
  pub fn raw_bytes(&self) -> &SharedBytes {
    &self.bytes
  }

  /// Pads `bytes` to an even length for the given VR by appending the VR's
  /// padding byte if needed.
  ///
  pub fn pad(vr: ValueRepresentation, mut bytes: Vec<u8>) -> Vec<u8> {
    if bytes.len() % 2 != 0 {
      bytes.push(vr.padding_byte());
    }

    bytes
  }

  fn as_str(&self) -> Result<&str, DataError> {
    std::str::from_utf8(self.bytes())
      .map_err(|_| DataError::new_value_invalid("Value is invalid UTF-8".to_string()))
  }

  /// Decodes a multi-valued string VR into its `\`-separated components.
  ///
  pub fn strings(&self) -> Result<Vec<String>, DataError> {
    if self.vr.value_kind() != ValueKind::String {
      return Err(DataError::new_value_not_present());
    }

    let s = self.as_str()?;

    if s.is_empty() {
      return Ok(Vec::new());
    }

    Ok(s.split('\\').map(|s| s.trim_end_matches('\0').to_string()).collect())
  }

  /// Decodes a single-valued string VR.
  ///
  pub fn string(&self) -> Result<String, DataError> {
    let mut values = self.strings()?;

    if values.len() != 1 {
      return Err(DataError::new_multiplicity_mismatch());
    }

    Ok(values.remove(0))
  }

  /// Decodes a `DS`/`IS` numeric-string VR into floating point values.
  ///
  pub fn floats(&self) -> Result<Vec<f64>, DataError> {
    self
      .strings()?
      .iter()
      .map(|s| {
        s.trim().parse::<f64>().map_err(|_| {
          DataError::new_value_invalid(format!("Invalid decimal value: '{s}'"))
        })
      })
      .collect()
  }

  /// Decodes a fixed-width signed/unsigned integer binary VR into `i64`
  /// values.
  ///
  pub fn ints(&self) -> Result<Vec<i64>, DataError> {
    let width = self.vr.fixed_value_size().ok_or_else(DataError::new_value_not_present)?;
    let bytes = self.bytes();

    if bytes.len() % width != 0 {
      return Err(DataError::new_value_invalid(
        "Value length is not a multiple of the element width".to_string(),
      ));
    }

    Ok(
      bytes
        .chunks_exact(width)
        .map(|chunk| match (self.vr, width) {
          (ValueRepresentation::SignedShort, 2) => i64::from(LittleEndian::read_i16(chunk)),
          (ValueRepresentation::SignedLong, 4) => i64::from(LittleEndian::read_i32(chunk)),
          (ValueRepresentation::SignedVeryLong, 8) => LittleEndian::read_i64(chunk),
          (ValueRepresentation::UnsignedShort, 2) => i64::from(LittleEndian::read_u16(chunk)),
          (ValueRepresentation::UnsignedLong, 4) => i64::from(LittleEndian::read_u32(chunk)),
          (ValueRepresentation::UnsignedVeryLong, 8) => LittleEndian::read_u64(chunk) as i64,
          _ => 0,
        })
        .collect(),
    )
  }

  /// Decodes an `AT` (`AttributeTag`) value into `(group, element)` pairs.
  ///
  pub fn attribute_tags(&self) -> Result<Vec<(u16, u16)>, DataError> {
    if self.vr != ValueRepresentation::AttributeTag {
      return Err(DataError::new_value_not_present());
    }

    let bytes = self.bytes();
    if bytes.len() % 4 != 0 {
      return Err(DataError::new_value_invalid(
        "AttributeTag value length must be a multiple of 4".to_string(),
      ));
    }

    Ok(
      bytes
        .chunks_exact(4)
        .map(|c| (LittleEndian::read_u16(&c[0..2]), LittleEndian::read_u16(&c[2..4])))
        .collect(),
    )
  }

  /// Decodes a `DA` value.
  ///
  pub fn date(&self) -> Result<StructuredDate, DataError> {
    if self.vr != ValueRepresentation::Date {
      return Err(DataError::new_value_not_present());
    }

    StructuredDate::from_bytes(self.bytes())
  }

  /// Decodes a `TM` value.
  ///
  pub fn time(&self) -> Result<StructuredTime, DataError> {
    if self.vr != ValueRepresentation::Time {
      return Err(DataError::new_value_not_present());
    }

    StructuredTime::from_bytes(self.bytes())
  }

  /// Decodes a `DT` value.
  ///
  pub fn datetime(&self) -> Result<StructuredDateTime, DataError> {
    if self.vr != ValueRepresentation::DateTime {
      return Err(DataError::new_value_not_present());
    }

    StructuredDateTime::from_bytes(self.bytes())
  }

  /// Decodes a `PN` value's first (and usually only) person name.
  ///
  pub fn person_name(&self) -> Result<StructuredPersonName, DataError> {
    if self.vr != ValueRepresentation::PersonName {
      return Err(DataError::new_value_not_present());
    }

    let s = self.string()?;

    StructuredPersonName::from_str(&s)
  }

  /// Formats this value as a single line of human-readable text, truncated
  /// to `output_width` characters.
  ///
  pub fn to_display_string(&self, output_width: usize) -> String {
    let formatted = match self.vr {
      ValueRepresentation::Date => self
        .date()
        .map(|d| d.to_iso8601())
        .unwrap_or_else(|_| format!("{:?}", self.as_str().unwrap_or(""))),

      ValueRepresentation::Time => self
        .time()
        .map(|t| t.to_iso8601())
        .unwrap_or_else(|_| format!("{:?}", self.as_str().unwrap_or(""))),

      ValueRepresentation::DateTime => self
        .datetime()
        .map(|dt| dt.to_iso8601())
        .unwrap_or_else(|_| format!("{:?}", self.as_str().unwrap_or(""))),

      ValueRepresentation::PersonName => self
        .person_name()
        .map(|pn| pn.to_string())
        .unwrap_or_else(|_| format!("{:?}", self.as_str().unwrap_or(""))),

      _ if self.vr.value_kind() == ValueKind::String => self
        .strings()
        .map(|values| values.join(", "))
        .unwrap_or_else(|_| "<invalid>".to_string()),

      _ => crate::utils::inspect_u8_slice(self.bytes(), output_width / 3),
    };

    if formatted.chars().count() > output_width {
      format!("{}…", formatted.chars().take(output_width - 1).collect::<String>())
    } else {
      formatted
    }
  }
}
