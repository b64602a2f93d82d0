//! Wire-level encode/decode of a single data element header: tag, VR, and
//! length, in either the 8-byte implicit/short-explicit form or the 12-byte
//! long-explicit form.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use dicomflow_core::tag::Tag;
use dicomflow_core::vr::{ValueLengthSize, ValueRepresentation};

/// Indeterminate length, as it appears on the wire.
///
pub const INDETERMINATE_LENGTH: u32 = 0xFFFF_FFFF;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Header {
  pub tag: Tag,
  pub vr: Option<ValueRepresentation>,
  pub length: u32,
}

impl Header {
  /// The number of header bytes this would occupy on the wire, given
  /// whether it's explicit VR and which length-field size its VR implies.
  ///
  pub fn byte_size(explicit_vr: bool, vr: Option<ValueRepresentation>) -> usize {
    if !explicit_vr {
      return 8;
    }

    match vr.map(|vr| vr.value_length_size()) {
      Some(ValueLengthSize::U32) => 12,
      _ => 8,
    }
  }

  /// Decodes the 2-byte VR code at the given offset of `bytes`, honoring
  /// endianness (the VR code is itself ASCII so endianness only matters for
  /// matching byte order against the dictionary-derived implicit case).
  ///
  pub fn decode_tag(bytes: &[u8], big_endian: bool) -> Tag {
    let (group, element) = if big_endian {
      (BigEndian::read_u16(&bytes[0..2]), BigEndian::read_u16(&bytes[2..4]))
    } else {
      (LittleEndian::read_u16(&bytes[0..2]), LittleEndian::read_u16(&bytes[2..4]))
    };

    Tag::new(group, element)
  }

  pub fn encode_tag(tag: Tag, big_endian: bool, out: &mut Vec<u8>) {
    if big_endian {
      out.extend_from_slice(&tag.group.to_be_bytes());
      out.extend_from_slice(&tag.element.to_be_bytes());
    } else {
      out.extend_from_slice(&tag.group.to_le_bytes());
      out.extend_from_slice(&tag.element.to_le_bytes());
    }
  }

  pub fn read_u32(bytes: &[u8], big_endian: bool) -> u32 {
    if big_endian { BigEndian::read_u32(bytes) } else { LittleEndian::read_u32(bytes) }
  }

  pub fn read_u16(bytes: &[u8], big_endian: bool) -> u16 {
    if big_endian { BigEndian::read_u16(bytes) } else { LittleEndian::read_u16(bytes) }
  }

  pub fn write_u32(value: u32, big_endian: bool, out: &mut Vec<u8>) {
    let mut buf = [0u8; 4];
    if big_endian { BigEndian::write_u32(&mut buf, value) } else { LittleEndian::write_u32(&mut buf, value) }
    out.extend_from_slice(&buf);
  }

  pub fn write_u16(value: u16, big_endian: bool, out: &mut Vec<u8>) {
    let mut buf = [0u8; 2];
    if big_endian { BigEndian::write_u16(&mut buf, value) } else { LittleEndian::write_u16(&mut buf, value) }
    out.extend_from_slice(&buf);
  }

  /// Serializes an explicit-VR header (short or long form depending on the
  /// VR's length-field size) to bytes.
  ///
  pub fn to_explicit_vr_bytes(tag: Tag, vr: ValueRepresentation, length: u32, big_endian: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(12);
    Self::encode_tag(tag, big_endian, &mut out);
    out.extend_from_slice(vr.code().as_bytes());

    match vr.value_length_size() {
      ValueLengthSize::U16 => Self::write_u16(length as u16, big_endian, &mut out),
      ValueLengthSize::U32 => {
        out.extend_from_slice(&[0, 0]);
        Self::write_u32(length, big_endian, &mut out);
      }
    }

    out
  }

  /// Serializes an implicit-VR header (always 8 bytes: tag + u32 length).
  ///
  pub fn to_implicit_vr_bytes(tag: Tag, length: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(8);
    Self::encode_tag(tag, false, &mut out);
    Self::write_u32(length, false, &mut out);
    out
  }

  /// Serializes the 8-byte tag+length header used by item and delimitation
  /// markers, which carry no VR.
  ///
  pub fn to_item_bytes(tag: Tag, length: u32, big_endian: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(8);
    Self::encode_tag(tag, big_endian, &mut out);
    Self::write_u32(length, big_endian, &mut out);
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn explicit_vr_short_form_roundtrip_test() {
    let bytes = Header::to_explicit_vr_bytes(Tag::new(0x0010, 0x0010), ValueRepresentation::PersonName, 8, false);
    assert_eq!(bytes.len(), 8);
    assert_eq!(Header::decode_tag(&bytes, false), Tag::new(0x0010, 0x0010));
  }

  #[test]
  fn explicit_vr_long_form_has_12_bytes_test() {
    let bytes = Header::to_explicit_vr_bytes(Tag::new(0x7FE0, 0x0010), ValueRepresentation::OtherByteString, 0, false);
    assert_eq!(bytes.len(), 12);
  }

  #[test]
  fn implicit_vr_is_8_bytes_test() {
    let bytes = Header::to_implicit_vr_bytes(Tag::new(0x0008, 0x0020), 8);
    assert_eq!(bytes.len(), 8);
  }
}
