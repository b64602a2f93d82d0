//! A leading-bytes sniffer that confirms a stream looks like DICOM P10 data
//! before its bytes are handed to [`crate::reader::Reader`].
//!
//! Grounded on the teacher's own `is_valid_bytes` (`bytes.len() >= 132 &&
//! bytes[128..132] == "DICM"`), generalized into an incremental form that
//! can be fed arbitrarily small byte chunks.

use crate::error::ValidationError;

const PREAMBLE_AND_PREFIX_LENGTH: usize = 132;
const PREFIX_OFFSET: usize = 128;
const PREFIX: &[u8; 4] = b"DICM";

/// Checks a complete buffer of at least 132 leading bytes for the DICOM
/// preamble/prefix combination.
///
pub fn is_dicom_bytes(bytes: &[u8]) -> bool {
  bytes.len() >= PREAMBLE_AND_PREFIX_LENGTH && &bytes[PREFIX_OFFSET..PREAMBLE_AND_PREFIX_LENGTH] == PREFIX
}

/// Incrementally sniffs a stream's leading bytes for the DICOM preamble and
/// `"DICM"` prefix.
///
/// With `drain_on_fail` set, a failed sniff doesn't raise immediately from
/// `write_bytes`: it's recorded, and `write_bytes` keeps silently accepting
/// (and discarding) further bytes so an upstream producer isn't blocked
/// waiting on the error to be read. The failure is only raised once the
/// caller calls `finish`.
///
pub struct Validator {
  drain_on_fail: bool,
  buffer: Vec<u8>,
  validated: Option<bool>,
}

impl Validator {
  pub fn new(drain_on_fail: bool) -> Self {
    Self { drain_on_fail, buffer: Vec::new(), validated: None }
  }

  /// Feeds more leading bytes. Returns `Ok(true)` once the stream has been
  /// confirmed to be DICOM P10 data and bytes may be passed on to the
  /// reader; `Ok(false)` if more bytes are still needed (or, with
  /// `drain_on_fail`, after a confirmed failure). Returns `Err` on a
  /// confirmed failure when `drain_on_fail` is not set.
  ///
  pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<bool, ValidationError> {
    if self.validated == Some(true) {
      return Ok(true);
    }

    if self.validated == Some(false) {
      return Ok(false);
    }

    if self.buffer.len() < PREAMBLE_AND_PREFIX_LENGTH {
      let needed = PREAMBLE_AND_PREFIX_LENGTH - self.buffer.len();
      let take = needed.min(bytes.len());
      self.buffer.extend_from_slice(&bytes[..take]);
    }

    if self.buffer.len() < PREAMBLE_AND_PREFIX_LENGTH {
      return Ok(false);
    }

    if is_dicom_bytes(&self.buffer) {
      self.validated = Some(true);
      return Ok(true);
    }

    self.validated = Some(false);

    if self.drain_on_fail { Ok(false) } else { Err(Self::failure()) }
  }

  /// Returns the final validation result. Only meaningful to call once the
  /// stream has ended; raises the failure deferred by `drain_on_fail`.
  ///
  pub fn finish(&self) -> Result<(), ValidationError> {
    match self.validated {
      Some(false) => Err(Self::failure()),
      _ => Ok(()),
    }
  }

  fn failure() -> ValidationError {
    ValidationError::NotDicom { details: "missing 'DICM' prefix at offset 128".to_string() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn valid_leading_bytes() -> Vec<u8> {
    let mut bytes = vec![0u8; 128];
    bytes.extend_from_slice(b"DICM");
    bytes
  }

  #[test]
  fn accepts_valid_prefix_test() {
    let mut validator = Validator::new(false);
    assert_eq!(validator.write_bytes(&valid_leading_bytes()), Ok(true));
  }

  #[test]
  fn needs_more_bytes_test() {
    let mut validator = Validator::new(false);
    assert_eq!(validator.write_bytes(&[0u8; 10]), Ok(false));
  }

  #[test]
  fn rejects_invalid_prefix_immediately_test() {
    let mut validator = Validator::new(false);
    let mut bytes = vec![0u8; 128];
    bytes.extend_from_slice(b"NOPE");

    assert!(validator.write_bytes(&bytes).is_err());
  }

  #[test]
  fn defers_failure_with_drain_on_fail_test() {
    let mut validator = Validator::new(true);
    let mut bytes = vec![0u8; 128];
    bytes.extend_from_slice(b"NOPE");

    assert_eq!(validator.write_bytes(&bytes), Ok(false));
    assert_eq!(validator.write_bytes(&[1, 2, 3]), Ok(false));
    assert!(validator.finish().is_err());
  }
}
