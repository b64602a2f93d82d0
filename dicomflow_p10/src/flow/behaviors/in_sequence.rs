use crate::flow::Flow;
use crate::part::Part;

/// Tracks sequence nesting depth: incremented on `Sequence`, decremented on
/// `SequenceDelimitation`. Requires a delimitation-events behavior upstream
/// (or a reader that already guarantees them) so every `Sequence` is
/// eventually matched by a `SequenceDelimitation`.
///
#[derive(Debug, Default, Clone, Copy)]
pub struct SequenceDepthTracker {
  depth: u32,
}

impl SequenceDepthTracker {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn depth(&self) -> u32 {
    self.depth
  }

  pub fn in_sequence(&self) -> bool {
    self.depth > 0
  }

  pub fn observe(&mut self, part: &Part) {
    match part {
      Part::Sequence { .. } => self.depth += 1,
      Part::SequenceDelimitation { .. } => self.depth = self.depth.saturating_sub(1),
      _ => {}
    }
  }
}

pub struct InSequence<F: Flow> {
  inner: F,
  tracker: SequenceDepthTracker,
}

impl<F: Flow> InSequence<F> {
  pub fn new(inner: F) -> Self {
    Self { inner, tracker: SequenceDepthTracker::new() }
  }

  pub fn depth(&self) -> u32 {
    self.tracker.depth()
  }

  pub fn in_sequence(&self) -> bool {
    self.tracker.in_sequence()
  }
}

impl<F: Flow> Flow for InSequence<F> {
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
  fn tracks_nested_depth_test() {
    let mut flow = InSequence::new(PassThrough);
    let tag = Tag::new(0x0008, 0x1115);

    flow.handle(Part::Sequence { tag, vr: ValueRepresentation::Sequence, length: None });
    flow.handle(Part::Sequence { tag, vr: ValueRepresentation::Sequence, length: None });
    assert_eq!(flow.depth(), 2);

    flow.handle(Part::SequenceDelimitation { tag, marker: false });
    assert_eq!(flow.depth(), 1);
    assert!(flow.in_sequence());
  }
}
