use dicomflow_core::bytes::SharedBytes;

use crate::flow::Flow;
use crate::flow::behaviors::in_fragments::FragmentsTracker;
use crate::part::Part;

/// Guarantees that every data element and every fragment item is followed
/// by at least one `ValueChunk`, synthesizing an empty one for zero-length
/// elements and zero-length fragment items so downstream consumers never
/// need to special-case "no value bytes at all".
///
pub struct GuaranteedValueEvent<F: Flow> {
  inner: F,
  fragments: FragmentsTracker,
}

impl<F: Flow> GuaranteedValueEvent<F> {
  pub fn new(inner: F) -> Self {
    Self { inner, fragments: FragmentsTracker::new() }
  }
}

impl<F: Flow> Flow for GuaranteedValueEvent<F> {
  fn handle(&mut self, part: Part) -> Vec<Part> {
    let needs_synthetic_chunk = match &part {
      Part::Header { length: Some(0), .. } => true,
      Part::Item { length: Some(0), .. } => self.fragments.in_fragments(),
      _ => false,
    };

    self.fragments.observe(&part);

    let mut out = self.inner.handle(part);

    if needs_synthetic_chunk {
      out.extend(self.inner.handle(Part::ValueChunk { bytes: SharedBytes::empty(), last: true }));
    }

    out
  }

  fn finish(&mut self) -> Vec<Part> {
    self.inner.finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use dicomflow_core::tag::Tag;
  use dicomflow_core::vr::ValueRepresentation;

  struct PassThrough;
  impl Flow for PassThrough {
    fn handle(&mut self, part: Part) -> Vec<Part> {
      vec![part]
    }
  }

  #[test]
  fn synthesizes_chunk_for_zero_length_element_test() {
    let mut flow = GuaranteedValueEvent::new(PassThrough);

    let out = flow.handle(Part::Header {
      tag: Tag::new(0x0008, 0x0050),
      vr: ValueRepresentation::ShortString,
      length: Some(0),
    });

    assert_eq!(out.len(), 2);
    assert!(matches!(out[1], Part::ValueChunk { last: true, .. }));
  }

  #[test]
  fn no_synthetic_chunk_for_nonzero_length_test() {
    let mut flow = GuaranteedValueEvent::new(PassThrough);

    let out = flow.handle(Part::Header {
      tag: Tag::new(0x0008, 0x0050),
      vr: ValueRepresentation::ShortString,
      length: Some(4),
    });

    assert_eq!(out.len(), 1);
  }

  #[test]
  fn synthesizes_chunk_for_zero_length_fragment_item_test() {
    let mut flow = GuaranteedValueEvent::new(PassThrough);

    flow.handle(Part::Fragments { tag: Tag::PIXEL_DATA, vr: ValueRepresentation::OtherByteString });
    let out = flow.handle(Part::Item { index: 0, length: Some(0) });

    assert_eq!(out.len(), 2);
  }
}
