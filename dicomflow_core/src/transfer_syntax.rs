//! DICOM transfer syntaxes: the combination of VR serialization mode,
//! byte order, and (optionally) deflate compression used to encode a data
//! set's bytes.

/// Byte order used when encoding multi-byte binary values.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Endianness {
  LittleEndian,
  BigEndian,
}

/// Whether data element headers carry an explicit VR code, or whether the VR
/// must be inferred from a dictionary.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VrSerialization {
  Explicit,
  Implicit,
}

/// A DICOM transfer syntax, identified by a UID, that determines how a data
/// set's bytes are laid out on the wire.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TransferSyntax {
  pub uid: &'static str,
  pub name: &'static str,
  pub endianness: Endianness,
  pub vr_serialization: VrSerialization,
  pub is_deflated: bool,
}

impl TransferSyntax {
  pub const IMPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = TransferSyntax {
    uid: "1.2.840.10008.1.2",
    name: "Implicit VR Little Endian",
    endianness: Endianness::LittleEndian,
    vr_serialization: VrSerialization::Implicit,
    is_deflated: false,
  };

  pub const EXPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = TransferSyntax {
    uid: "1.2.840.10008.1.2.1",
    name: "Explicit VR Little Endian",
    endianness: Endianness::LittleEndian,
    vr_serialization: VrSerialization::Explicit,
    is_deflated: false,
  };

  pub const DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = TransferSyntax {
    uid: "1.2.840.10008.1.2.1.99",
    name: "Deflated Explicit VR Little Endian",
    endianness: Endianness::LittleEndian,
    vr_serialization: VrSerialization::Explicit,
    is_deflated: true,
  };

  pub const EXPLICIT_VR_BIG_ENDIAN: TransferSyntax = TransferSyntax {
    uid: "1.2.840.10008.1.2.2",
    name: "Explicit VR Big Endian (Retired)",
    endianness: Endianness::BigEndian,
    vr_serialization: VrSerialization::Explicit,
    is_deflated: false,
  };

  /// JPIP Referenced Deflate, used only as an example of a deflated transfer
  /// syntax with a non-zlib-standard UID suffix in this port's test fixtures.
  ///
  pub const JPIP_REFERENCED_DEFLATE: TransferSyntax = TransferSyntax {
    uid: "1.2.840.10008.1.2.4.95",
    name: "JPIP Referenced Deflate Transfer Syntax",
    endianness: Endianness::LittleEndian,
    vr_serialization: VrSerialization::Explicit,
    is_deflated: true,
  };

  const ALL: &'static [TransferSyntax] = &[
    Self::IMPLICIT_VR_LITTLE_ENDIAN,
    Self::EXPLICIT_VR_LITTLE_ENDIAN,
    Self::DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN,
    Self::EXPLICIT_VR_BIG_ENDIAN,
    Self::JPIP_REFERENCED_DEFLATE,
  ];

  /// Looks up a transfer syntax by its UID. Trailing NUL padding bytes and
  /// whitespace, as commonly found in a `(0002,0010)` value, are trimmed
  /// before comparison.
  ///
  pub fn from_uid(uid: &str) -> Option<&'static TransferSyntax> {
    let uid = uid.trim_matches(|c: char| c == '\0' || c.is_whitespace());

    Self::ALL.iter().find(|ts| ts.uid == uid)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn from_uid_trims_padding_test() {
    assert_eq!(
      TransferSyntax::from_uid("1.2.840.10008.1.2.1\0"),
      Some(&TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN)
    );
  }

  #[test]
  fn from_uid_unknown_test() {
    assert_eq!(TransferSyntax::from_uid("9.9.9"), None);
  }
}
