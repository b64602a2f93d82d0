use dicomflow_core::tag::Tag;
use dicomflow_core::tag_path::{TagPath, TagPathNode};

use crate::flow::Flow;
use crate::flow::behaviors::in_fragments::FragmentsTracker;
use crate::part::Part;

/// The reusable core of tag path tracking, kept independent of [`Flow`] so
/// that transforms which need to test a part's path against a filter can
/// embed it directly rather than going through a decorator.
///
/// Updates per part kind:
///
/// - `Header`/`Fragments`: replaces the trunk's current tag (if any) with
///   the new one, or appends it under the current item/sequence.
/// - `Sequence`: appends a `Sequence` node.
/// - `SequenceDelimitation` (outside fragments): replaces the trunk's
///   `Sequence` node with the transient `SequenceEnd` form for this part,
///   then steps back to the parent the next time a part is observed.
/// - `Item` (outside fragments): appends an `Item` node.
/// - `ItemDelimitation`: replaces the trunk's `Item` node with the
///   transient `ItemEnd` form for this part, then steps back to the
///   parent the next time a part is observed.
///
/// The transient `SequenceEnd`/`ItemEnd` path is visible through [`Self::path`]
/// only for the single `observe` call that closes the sequence/item; it is
/// resolved back to the parent path at the start of the following call.
///
/// Requires a guaranteed-delimitation-events and guaranteed-value-event
/// behavior upstream so every open sequence/item/fragments value is
/// eventually closed.
///
#[derive(Debug, Default, Clone)]
pub struct PathTracker {
  path: TagPath,
  fragments: FragmentsTracker,
}

impl PathTracker {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn path(&self) -> &TagPath {
    &self.path
  }

  fn replace_trunk_tag(&self, tag: Tag) -> TagPath {
    match self.path.nodes().last() {
      Some(TagPathNode::Tag(_)) => self.path.pop().unwrap().with_tag(tag),
      _ => self.path.with_tag(tag),
    }
  }

  /// Pops the transient `SequenceEnd`/`ItemEnd` node left on the path by
  /// the previous `observe` call, if any, back to the real parent path.
  ///
  fn resolve_transient_end(&mut self) {
    match self.path.nodes().last() {
      Some(TagPathNode::SequenceEnd(_)) | Some(TagPathNode::ItemEnd(_)) => {
        self.path = self.path.pop().unwrap();
      }
      _ => {}
    }
  }

  pub fn observe(&mut self, part: &Part) {
    self.resolve_transient_end();

    match part {
      Part::Header { tag, .. } => {
        self.path = self.replace_trunk_tag(*tag);
      }

      Part::Fragments { tag, .. } => {
        self.path = self.replace_trunk_tag(*tag);
      }

      Part::Sequence { tag, .. } => {
        let trunk = match self.path.nodes().last() {
          Some(TagPathNode::Tag(_)) => self.path.pop().unwrap(),
          _ => self.path.clone(),
        };
        self.path = trunk.with_sequence(*tag);
      }

      Part::SequenceDelimitation { .. } => {
        if !self.fragments.in_fragments() {
          let trunk = match self.path.nodes().last() {
            Some(TagPathNode::Item(_)) => self.path.pop().unwrap(),
            _ => self.path.clone(),
          };

          self.path = match trunk.sequence_end() {
            Some(end_path) => end_path,
            None => trunk,
          };
        }
      }

      Part::Item { index, .. } => {
        if !self.fragments.in_fragments() {
          let trunk = match self.path.nodes().last() {
            Some(TagPathNode::Item(_)) => self.path.pop().unwrap(),
            _ => self.path.clone(),
          };
          self.path = trunk.with_item(*index);
        }
      }

      Part::ItemDelimitation { .. } => {
        let trunk = match self.path.nodes().last() {
          Some(TagPathNode::Tag(_)) => self.path.pop().unwrap(),
          _ => self.path.clone(),
        };

        self.path = match trunk.item_end() {
          Some(end_path) => end_path,
          None if !trunk.is_root() => trunk.pop().unwrap(),
          None => trunk,
        };
      }

      _ => {}
    }

    self.fragments.observe(part);
  }
}

/// A [`Flow`] decorator exposing [`PathTracker`] state alongside an inner
/// flow.
///
pub struct TagPathTracking<F: Flow> {
  inner: F,
  tracker: PathTracker,
}

impl<F: Flow> TagPathTracking<F> {
  pub fn new(inner: F) -> Self {
    Self { inner, tracker: PathTracker::new() }
  }

  pub fn path(&self) -> &TagPath {
    self.tracker.path()
  }
}

impl<F: Flow> Flow for TagPathTracking<F> {
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
  use dicomflow_core::vr::ValueRepresentation;

  struct PassThrough;
  impl Flow for PassThrough {
    fn handle(&mut self, part: Part) -> Vec<Part> {
      vec![part]
    }
  }

  #[test]
  fn tracks_plain_element_test() {
    let mut flow = TagPathTracking::new(PassThrough);
    let tag = Tag::new(0x0010, 0x0010);

    flow.handle(Part::Header { tag, vr: ValueRepresentation::PersonName, length: Some(0) });
    assert_eq!(flow.path().to_string(), "00100010");
  }

  #[test]
  fn tracks_sequence_and_item_nesting_test() {
    let mut flow = TagPathTracking::new(PassThrough);
    let seq_tag = Tag::new(0x0008, 0x1115);
    let child_tag = Tag::new(0x0008, 0x0100);

    flow.handle(Part::Sequence { tag: seq_tag, vr: ValueRepresentation::Sequence, length: None });
    flow.handle(Part::Item { index: 0, length: None });
    flow.handle(Part::Header { tag: child_tag, vr: ValueRepresentation::ShortString, length: Some(0) });

    assert_eq!(flow.path().to_string(), "00081115/[0]/00080100");

    flow.handle(Part::ItemDelimitation { index: 0, marker: true });
    assert_eq!(flow.path().to_string(), "00081115/[0]/end");

    flow.handle(Part::SequenceDelimitation { tag: seq_tag, marker: true });
    assert_eq!(flow.path().to_string(), "00081115/end");
  }

  #[test]
  fn surfaces_transient_end_path_for_one_step_test() {
    let mut flow = TagPathTracking::new(PassThrough);
    let seq_tag = Tag::new(0x0008, 0x1115);
    let sibling_tag = Tag::new(0x0010, 0x0010);

    flow.handle(Part::Sequence { tag: seq_tag, vr: ValueRepresentation::Sequence, length: None });
    flow.handle(Part::Item { index: 0, length: None });
    flow.handle(Part::ItemDelimitation { index: 0, marker: true });
    assert_eq!(flow.path().to_string(), "00081115/[0]/end");

    flow.handle(Part::SequenceDelimitation { tag: seq_tag, marker: true });
    assert_eq!(flow.path().to_string(), "00081115/end");

    // The next part observed resolves the transient `SequenceEnd` back to
    // the parent path before being applied.
    flow.handle(Part::Header { tag: sibling_tag, vr: ValueRepresentation::PersonName, length: Some(0) });
    assert_eq!(flow.path().to_string(), "00100010");
  }
}
