use crate::flow::Flow;
use crate::part::Part;

/// Tracks whether the part stream is currently inside an encapsulated
/// fragments value, for behaviors that need to tell a fragment item apart
/// from a sequence item.
///
#[derive(Debug, Default, Clone, Copy)]
pub struct FragmentsTracker {
  in_fragments: bool,
}

impl FragmentsTracker {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn in_fragments(&self) -> bool {
    self.in_fragments
  }

  pub fn observe(&mut self, part: &Part) {
    match part {
      Part::Fragments { .. } => self.in_fragments = true,
      Part::SequenceDelimitation { .. } => self.in_fragments = false,
      _ => {}
    }
  }
}

/// A [`Flow`] decorator exposing [`FragmentsTracker`] state alongside an
/// inner flow, for pipelines that only need this one bit.
///
pub struct InFragments<F: Flow> {
  inner: F,
  tracker: FragmentsTracker,
}

impl<F: Flow> InFragments<F> {
  pub fn new(inner: F) -> Self {
    Self { inner, tracker: FragmentsTracker::new() }
  }

  pub fn in_fragments(&self) -> bool {
    self.tracker.in_fragments()
  }
}

impl<F: Flow> Flow for InFragments<F> {
  fn handle(&mut self, part: Part) -> Vec<Part> {
    self.tracker.observe(&part);
    self.inner.handle(part)
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
  fn tracks_fragments_boundaries_test() {
    let mut flow = InFragments::new(PassThrough);
    assert!(!flow.in_fragments());

    flow.handle(Part::Fragments { tag: Tag::PIXEL_DATA, vr: ValueRepresentation::OtherByteString });
    assert!(flow.in_fragments());

    flow.handle(Part::SequenceDelimitation { tag: Tag::PIXEL_DATA, marker: false });
    assert!(!flow.in_fragments());
  }
}
