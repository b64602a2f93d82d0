//! [`Element`]: the tagged union used to represent a single semantic unit of
//! a DICOM data set as it streams through the flow framework and into the
//! dataset aggregator.
//!
//! `Element` is richer than [`crate::dataset::ElementSet`], the type
//! actually stored in an assembled [`crate::dataset::Elements`] tree: it
//! also carries the transient item/sequence/fragment delimiter events that
//! occur while a data set is being streamed, each of which may be either
//! read directly off the wire or synthesized by a flow behavior (see
//! `marker`).

use crate::bytes::SharedBytes;
use crate::tag::Tag;
use crate::value::Value;
use crate::vr::ValueRepresentation;

/// A single semantic unit of a streamed DICOM data set.
///
/// The `marker` flag on several variants distinguishes an event that was
/// synthesized by a flow behavior (e.g. a delimiter event synthesized for a
/// determinate-length sequence that has no delimiter on the wire) from one
/// that was read directly from the stream. Flow behaviors that stack must
/// check this flag to avoid re-synthesizing an event that a lower layer
/// already produced.
///
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
  /// The 128-byte DICOM file preamble.
  Preamble { bytes: SharedBytes },

  /// A complete, non-sequence data element value.
  ValueElement { tag: Tag, value: Value },

  /// The start of a sequence.
  SequenceElement { tag: Tag, vr: ValueRepresentation, marker: bool },

  /// The end of a sequence.
  SequenceDelimitationElement { tag: Tag, marker: bool },

  /// The start of an item, inside either a sequence or an encapsulated
  /// pixel/waveform data fragments value.
  ItemElement { index: usize, marker: bool },

  /// The end of an item.
  ItemDelimitationElement { index: usize, marker: bool },

  /// The start of an encapsulated pixel/waveform data fragments value.
  FragmentsElement { tag: Tag, vr: ValueRepresentation },

  /// A single fragment's bytes, inside a `FragmentsElement`.
  FragmentElement { index: usize, bytes: SharedBytes },
}

impl Element {
  /// Returns whether this element is a marker synthesized by a flow
  /// behavior rather than read directly from the input stream.
  ///
  pub fn is_marker(&self) -> bool {
    match self {
      Self::SequenceElement { marker, .. }
      | Self::SequenceDelimitationElement { marker, .. }
      | Self::ItemElement { marker, .. }
      | Self::ItemDelimitationElement { marker, .. } => *marker,
      _ => false,
    }
  }

  /// Returns the tag this element pertains to, if any. Item and fragment
  /// events have no tag of their own: they belong to the nearest enclosing
  /// sequence or fragments element.
  ///
  pub fn tag(&self) -> Option<Tag> {
    match self {
      Self::ValueElement { tag, .. }
      | Self::SequenceElement { tag, .. }
      | Self::SequenceDelimitationElement { tag, .. }
      | Self::FragmentsElement { tag, .. } => Some(*tag),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn is_marker_test() {
    let wire_event = Element::SequenceDelimitationElement {
      tag: Tag::new(0x0008, 0x1115),
      marker: false,
    };
    let synthesized_event = Element::SequenceDelimitationElement {
      tag: Tag::new(0x0008, 0x1115),
      marker: true,
    };

    assert!(!wire_event.is_marker());
    assert!(synthesized_event.is_marker());
  }
}
