//! DICOM Value Representations (VRs), as defined by PS3.5 Section 6.2.

/// The length of a data element's value length field when serialized in the
/// DICOM P10 format: either a 16-bit or a 32-bit unsigned integer.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueLengthSize {
  U16,
  U32,
}

impl ValueLengthSize {
  /// The largest value length representable by this size. For `U32` this is
  /// one less than `0xFFFFFFFF`, which is reserved to mean "indeterminate
  /// length".
  ///
  pub fn max_length(&self) -> u32 {
    match self {
      Self::U16 => 0xFFFF,
      Self::U32 => 0xFFFF_FFFE,
    }
  }
}

/// Broad classification of the kind of data held by a VR's value, used by
/// the streaming parser and flow behaviors to decide how to synthesize
/// delimitation and chunk events.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueKind {
  /// A textual or numeric-as-text value, decoded through the active
  /// character set.
  String,

  /// A binary value: raw bytes, or fixed-width numbers.
  Binary,

  /// A sequence of items, each of which is itself a nested data set.
  Sequence,
}

/// A DICOM Value Representation. Every data element other than sequence and
/// item delimiters carries exactly one VR, either read explicitly from the
/// stream or inferred from a dictionary when the transfer syntax is Implicit
/// VR Little Endian.
///
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ValueRepresentation {
  AgeString,
  ApplicationEntity,
  AttributeTag,
  CodeString,
  Date,
  DateTime,
  DecimalString,
  FloatingPointDouble,
  FloatingPointSingle,
  IntegerString,
  LongString,
  LongText,
  OtherByteString,
  OtherDoubleString,
  OtherFloatString,
  OtherLongString,
  OtherVeryLongString,
  OtherWordString,
  PersonName,
  Sequence,
  ShortString,
  ShortText,
  SignedLong,
  SignedShort,
  SignedVeryLong,
  Time,
  UniqueIdentifier,
  UniversalResourceIdentifier,
  Unknown,
  UnlimitedCharacters,
  UnlimitedText,
  UnsignedLong,
  UnsignedShort,
  UnsignedVeryLong,
}

impl ValueRepresentation {
  /// Returns the two-letter code used to identify this VR in the DICOM wire
  /// format, e.g. `"DA"` for `Date`.
  ///
  pub fn code(&self) -> &'static str {
    match self {
      Self::AgeString => "AS",
      Self::ApplicationEntity => "AE",
      Self::AttributeTag => "AT",
      Self::CodeString => "CS",
      Self::Date => "DA",
      Self::DateTime => "DT",
      Self::DecimalString => "DS",
      Self::FloatingPointDouble => "FD",
      Self::FloatingPointSingle => "FL",
      Self::IntegerString => "IS",
      Self::LongString => "LO",
      Self::LongText => "LT",
      Self::OtherByteString => "OB",
      Self::OtherDoubleString => "OD",
      Self::OtherFloatString => "OF",
      Self::OtherLongString => "OL",
      Self::OtherVeryLongString => "OV",
      Self::OtherWordString => "OW",
      Self::PersonName => "PN",
      Self::Sequence => "SQ",
      Self::ShortString => "SH",
      Self::ShortText => "ST",
      Self::SignedLong => "SL",
      Self::SignedShort => "SS",
      Self::SignedVeryLong => "SV",
      Self::Time => "TM",
      Self::UniqueIdentifier => "UI",
      Self::UniversalResourceIdentifier => "UR",
      Self::Unknown => "UN",
      Self::UnlimitedCharacters => "UC",
      Self::UnlimitedText => "UT",
      Self::UnsignedLong => "UL",
      Self::UnsignedShort => "US",
      Self::UnsignedVeryLong => "UV",
    }
  }

  /// Looks up a VR from its two-letter wire-format code.
  ///
  pub fn from_code(code: &str) -> Option<Self> {
    Some(match code {
      "AS" => Self::AgeString,
      "AE" => Self::ApplicationEntity,
      "AT" => Self::AttributeTag,
      "CS" => Self::CodeString,
      "DA" => Self::Date,
      "DT" => Self::DateTime,
      "DS" => Self::DecimalString,
      "FD" => Self::FloatingPointDouble,
      "FL" => Self::FloatingPointSingle,
      "IS" => Self::IntegerString,
      "LO" => Self::LongString,
      "LT" => Self::LongText,
      "OB" => Self::OtherByteString,
      "OD" => Self::OtherDoubleString,
      "OF" => Self::OtherFloatString,
      "OL" => Self::OtherLongString,
      "OV" => Self::OtherVeryLongString,
      "OW" => Self::OtherWordString,
      "PN" => Self::PersonName,
      "SQ" => Self::Sequence,
      "SH" => Self::ShortString,
      "ST" => Self::ShortText,
      "SL" => Self::SignedLong,
      "SS" => Self::SignedShort,
      "SV" => Self::SignedVeryLong,
      "TM" => Self::Time,
      "UI" => Self::UniqueIdentifier,
      "UR" => Self::UniversalResourceIdentifier,
      "UN" => Self::Unknown,
      "UC" => Self::UnlimitedCharacters,
      "UT" => Self::UnlimitedText,
      "UL" => Self::UnsignedLong,
      "US" => Self::UnsignedShort,
      "UV" => Self::UnsignedVeryLong,
      _ => return None,
    })
  }

  /// Returns the size of the value length field used to serialize this VR in
  /// the DICOM P10 format. VRs with a two-byte length field have an 8-byte
  /// header; VRs with a four-byte length field (and two reserved bytes) have
  /// a 12-byte header.
  ///
  pub fn value_length_size(&self) -> ValueLengthSize {
    match self {
      Self::AgeString
      | Self::ApplicationEntity
      | Self::AttributeTag
      | Self::CodeString
      | Self::Date
      | Self::DateTime
      | Self::DecimalString
      | Self::FloatingPointDouble
      | Self::FloatingPointSingle
      | Self::IntegerString
      | Self::LongString
      | Self::LongText
      | Self::PersonName
      | Self::ShortString
      | Self::ShortText
      | Self::SignedLong
      | Self::SignedShort
      | Self::Time
      | Self::UniqueIdentifier
      | Self::UnsignedLong
      | Self::UnsignedShort => ValueLengthSize::U16,

      Self::OtherByteString
      | Self::OtherDoubleString
      | Self::OtherFloatString
      | Self::OtherLongString
      | Self::OtherVeryLongString
      | Self::OtherWordString
      | Self::Sequence
      | Self::SignedVeryLong
      | Self::UniversalResourceIdentifier
      | Self::Unknown
      | Self::UnlimitedCharacters
      | Self::UnlimitedText
      | Self::UnsignedVeryLong => ValueLengthSize::U32,
    }
  }

  /// Returns the broad value-kind classification for this VR, used to decide
  /// streaming and chunking behavior.
  ///
  pub fn value_kind(&self) -> ValueKind {
    match self {
      Self::Sequence => ValueKind::Sequence,

      Self::AgeString
      | Self::ApplicationEntity
      | Self::CodeString
      | Self::Date
      | Self::DateTime
      | Self::DecimalString
      | Self::IntegerString
      | Self::LongString
      | Self::LongText
      | Self::PersonName
      | Self::ShortString
      | Self::ShortText
      | Self::Time
      | Self::UniqueIdentifier
      | Self::UniversalResourceIdentifier
      | Self::UnlimitedCharacters
      | Self::UnlimitedText => ValueKind::String,

      _ => ValueKind::Binary,
    }
  }

  /// Returns whether this VR's value uses the active character set when
  /// decoding to text.
  ///
  pub fn is_encoded_string(&self) -> bool {
    matches!(
      self,
      Self::LongString
        | Self::LongText
        | Self::PersonName
        | Self::ShortString
        | Self::ShortText
        | Self::UnlimitedCharacters
        | Self::UnlimitedText
    )
  }

  /// Returns whether this VR may be split into fragments when its length is
  /// indeterminate (Encapsulated Pixel Data and Encapsulated Waveform Data
  /// use `OB`/`OW` with indeterminate length for this purpose).
  ///
  pub fn supports_encapsulated_fragments(&self) -> bool {
    matches!(self, Self::OtherByteString | Self::OtherWordString)
  }

  /// Returns the padding byte used to pad this VR's value to an even length:
  /// `0x20` (space) for textual VRs, `0x00` for everything else.
  ///
  pub fn padding_byte(&self) -> u8 {
    match self.value_kind() {
      ValueKind::String => 0x20,
      _ => 0x00,
    }
  }

  /// Returns the fixed size in bytes of a single value in a multi-valued
  /// binary VR, if fixed. Returns `None` for string and sequence VRs, whose
  /// values don't have a fixed per-item width.
  ///
  pub fn fixed_value_size(&self) -> Option<usize> {
    match self {
      Self::AttributeTag => Some(4),
      Self::FloatingPointDouble => Some(8),
      Self::FloatingPointSingle => Some(4),
      Self::SignedLong => Some(4),
      Self::SignedShort => Some(2),
      Self::SignedVeryLong => Some(8),
      Self::UnsignedLong => Some(4),
      Self::UnsignedShort => Some(2),
      Self::UnsignedVeryLong => Some(8),
      Self::OtherDoubleString => Some(8),
      Self::OtherFloatString => Some(4),
      Self::OtherLongString => Some(4),
      Self::OtherVeryLongString => Some(8),
      Self::OtherWordString => Some(2),
      _ => None,
    }
  }
}

impl std::fmt::Display for ValueRepresentation {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "{}", self.code())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn code_round_trip_test() {
    for vr in [
      ValueRepresentation::AgeString,
      ValueRepresentation::OtherByteString,
      ValueRepresentation::Sequence,
      ValueRepresentation::UnsignedVeryLong,
    ] {
      assert_eq!(ValueRepresentation::from_code(vr.code()), Some(vr));
    }
  }

  #[test]
  fn value_length_size_test() {
    assert_eq!(
      ValueRepresentation::Date.value_length_size(),
      ValueLengthSize::U16
    );
    assert_eq!(
      ValueRepresentation::OtherByteString.value_length_size(),
      ValueLengthSize::U32
    );
    assert_eq!(
      ValueRepresentation::Sequence.value_length_size(),
      ValueLengthSize::U32
    );
  }

  #[test]
  fn padding_byte_test() {
    assert_eq!(ValueRepresentation::ShortString.padding_byte(), 0x20);
    assert_eq!(ValueRepresentation::OtherByteString.padding_byte(), 0x00);
  }

  #[test]
  fn supports_encapsulated_fragments_test() {
    assert!(ValueRepresentation::OtherByteString.supports_encapsulated_fragments());
    assert!(!ValueRepresentation::ShortString.supports_encapsulated_fragments());
  }
}
