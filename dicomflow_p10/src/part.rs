//! [`Part`]: the tagged-union stream alphabet produced by the streaming
//! reader and consumed by the flow framework, transforms, and writer.

use dicomflow_core::bytes::SharedBytes;
use dicomflow_core::tag::Tag;
use dicomflow_core::vr::ValueRepresentation;

use crate::internal::header::Header;

/// A single structurally typed unit of a DICOM P10 byte stream.
///
/// `marker` fields on the delimitation variants distinguish a delimiter
/// synthesized by a flow behavior from one read directly off the wire; see
/// `dicomflow_p10::flow`.
///
#[derive(Clone, Debug, PartialEq)]
pub enum Part {
  /// The 128-byte File Preamble plus the `"DICM"` prefix.
  Preamble { bytes: SharedBytes },

  /// The start of a data element, either in the File Meta Information or the
  /// main data set. Always followed by one or more `ValueChunk` parts.
  Header { tag: Tag, vr: ValueRepresentation, length: Option<u32> },

  /// A chunk of a data element's value bytes. `last` marks the final chunk
  /// for the current element.
  ValueChunk { bytes: SharedBytes, last: bool },

  /// The start of a sequence.
  Sequence { tag: Tag, vr: ValueRepresentation, length: Option<u32> },

  /// The start of an item, inside a sequence or a fragments value.
  Item { index: usize, length: Option<u32> },

  /// The end of an item.
  ItemDelimitation { index: usize, marker: bool },

  /// The end of a sequence.
  SequenceDelimitation { tag: Tag, marker: bool },

  /// The start of an encapsulated pixel/waveform data fragments value.
  Fragments { tag: Tag, vr: ValueRepresentation },

  /// Raw bytes belonging to a deflated-transfer-syntax data stream, emitted
  /// before they're routed through the inflater.
  DeflatedChunk { bytes: SharedBytes },

  /// A part that couldn't be interpreted at the current location; carried
  /// through rather than aborting the stream.
  Unknown { tag: Tag, bytes: SharedBytes },
}

impl Part {
  /// Returns the tag this part pertains to, if it carries one directly.
  /// Items, item delimiters, and value chunks belong to the nearest
  /// enclosing sequence/fragments/header and have none of their own.
  ///
  pub fn tag(&self) -> Option<Tag> {
    match self {
      Self::Header { tag, .. }
      | Self::Sequence { tag, .. }
      | Self::SequenceDelimitation { tag, .. }
      | Self::Fragments { tag, .. }
      | Self::Unknown { tag, .. } => Some(*tag),
      _ => None,
    }
  }

  /// Returns whether this part is a delimiter synthesized by a flow
  /// behavior rather than read directly from the input stream.
  ///
  pub fn is_marker(&self) -> bool {
    matches!(
      self,
      Self::ItemDelimitation { marker: true, .. }
        | Self::SequenceDelimitation { marker: true, .. }
    )
  }

  /// The count of wire bytes this part occupies, used by the
  /// delimitation-synthesis flow behavior to track how many bytes remain
  /// before a determinate-length sequence/item closes. Every emitted part
  /// contributes: value/deflated chunks their payload, headers and
  /// sequence/fragments starts their explicit-VR header encoding (8 bytes,
  /// or 12 for a VR with a 4-byte length field), and items and
  /// delimitations the fixed 8-byte tag+length marker. Explicit VR is
  /// assumed for header sizing since this accounting only applies to part
  /// streams rebuilt away from the original wire bytes (see
  /// `GuaranteedDelimitationEvents`); a marker delimiter contributes zero,
  /// since it was synthesized rather than read.
  ///
  pub fn byte_length(&self) -> u64 {
    match self {
      Self::ValueChunk { bytes, .. } | Self::DeflatedChunk { bytes } => bytes.len() as u64,
      Self::Preamble { bytes } | Self::Unknown { bytes, .. } => bytes.len() as u64,
      Self::Header { vr, .. } => Header::byte_size(true, Some(*vr)) as u64,
      Self::Sequence { vr, .. } => Header::byte_size(true, Some(*vr)) as u64,
      Self::Fragments { vr, .. } => Header::byte_size(true, Some(*vr)) as u64,
      Self::Item { .. } => 8,
      Self::ItemDelimitation { marker: false, .. } | Self::SequenceDelimitation { marker: false, .. } => 8,
      Self::ItemDelimitation { marker: true, .. } | Self::SequenceDelimitation { marker: true, .. } => 0,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tag_test() {
    let part = Part::Header { tag: Tag::new(0x0010, 0x0010), vr: ValueRepresentation::PersonName, length: Some(8) };
    assert_eq!(part.tag(), Some(Tag::new(0x0010, 0x0010)));

    let chunk = Part::ValueChunk { bytes: SharedBytes::from_vec(vec![1]), last: true };
    assert_eq!(chunk.tag(), None);
  }

  #[test]
  fn byte_length_accounts_for_headers_and_markers_test() {
    let short_form = Part::Header { tag: Tag::new(0x0010, 0x0010), vr: ValueRepresentation::PersonName, length: Some(8) };
    assert_eq!(short_form.byte_length(), 8);

    let long_form = Part::Header { tag: Tag::new(0x7FE0, 0x0010), vr: ValueRepresentation::OtherByteString, length: Some(0) };
    assert_eq!(long_form.byte_length(), 12);

    let item = Part::Item { index: 1, length: Some(4) };
    assert_eq!(item.byte_length(), 8);

    let real_delimiter = Part::ItemDelimitation { index: 1, marker: false };
    assert_eq!(real_delimiter.byte_length(), 8);

    let synthetic_delimiter = Part::ItemDelimitation { index: 1, marker: true };
    assert_eq!(synthetic_delimiter.byte_length(), 0);
  }

  #[test]
  fn is_marker_test() {
    let tag = Tag::new(0x0008, 0x1115);
    assert!(!Part::SequenceDelimitation { tag, marker: false }.is_marker());
    assert!(Part::SequenceDelimitation { tag, marker: true }.is_marker());
  }
}
