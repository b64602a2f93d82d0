use dicomflow_core::tag_path::TagPath;

use crate::flow::Flow;
use crate::flow::behaviors::PathTracker;
use crate::part::Part;

/// Tracks whether the part stream is currently inside a subtree that a
/// tag-path-prefix filter has decided to suppress, dropping every part in
/// that subtree until the path backs out of it.
///
struct Suppressor {
  tracker: PathTracker,
  suppressing_at_depth: Option<usize>,
}

impl Suppressor {
  fn new() -> Self {
    Self { tracker: PathTracker::new(), suppressing_at_depth: None }
  }

  /// Observes `part`, updating the path, and returns whether it should be
  /// suppressed. `should_start_suppressing` is evaluated against the
  /// updated path only when not already inside a suppressed subtree.
  ///
  fn observe(&mut self, part: &Part, should_start_suppressing: impl Fn(&TagPath) -> bool) -> bool {
    self.tracker.observe(part);
    let path = self.tracker.path();

    if let Some(depth) = self.suppressing_at_depth {
      if path.len() < depth {
        self.suppressing_at_depth = None;
      }
    }

    if self.suppressing_at_depth.is_none() && should_start_suppressing(path) {
      self.suppressing_at_depth = Some(path.len());
    }

    self.suppressing_at_depth.is_some()
  }
}

/// Keeps only the data elements (and their enclosing sequences/items) whose
/// tag path matches one of the configured prefixes; everything else is
/// dropped.
///
pub struct Whitelist<F: Flow> {
  inner: F,
  prefixes: Vec<TagPath>,
  suppressor: Suppressor,
}

impl<F: Flow> Whitelist<F> {
  pub fn new(inner: F, prefixes: Vec<TagPath>) -> Self {
    Self { inner, prefixes, suppressor: Suppressor::new() }
  }
}

impl<F: Flow> Flow for Whitelist<F> {
  fn handle(&mut self, part: Part) -> Vec<Part> {
    let prefixes = &self.prefixes;
    let suppress = self.suppressor.observe(&part, |path| {
      !prefixes.iter().any(|prefix| prefix.is_prefix_of(path) || path.is_prefix_of(prefix))
    });

    if suppress { vec![] } else { self.inner.handle(part) }
  }

  fn finish(&mut self) -> Vec<Part> {
    self.inner.finish()
  }
}

/// Drops every data element (and its enclosing sequences/items) whose tag
/// path matches one of the configured prefixes; everything else passes
/// through.
///
pub struct Blacklist<F: Flow> {
  inner: F,
  prefixes: Vec<TagPath>,
  suppressor: Suppressor,
}

impl<F: Flow> Blacklist<F> {
  pub fn new(inner: F, prefixes: Vec<TagPath>) -> Self {
    Self { inner, prefixes, suppressor: Suppressor::new() }
  }
}

impl<F: Flow> Flow for Blacklist<F> {
  fn handle(&mut self, part: Part) -> Vec<Part> {
    let prefixes = &self.prefixes;
    let suppress = self.suppressor.observe(&part, |path| prefixes.iter().any(|prefix| prefix.is_prefix_of(path)));

    if suppress { vec![] } else { self.inner.handle(part) }
  }

  fn finish(&mut self) -> Vec<Part> {
    self.inner.finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use dicomflow_core::bytes::SharedBytes;
  use dicomflow_core::tag::Tag;
  use dicomflow_core::vr::ValueRepresentation;

  struct Collector(Vec<Part>);
  impl Flow for Collector {
    fn handle(&mut self, part: Part) -> Vec<Part> {
      self.0.push(part.clone());
      vec![part]
    }
  }

  #[test]
  fn blacklist_drops_matching_subtree_test() {
    let dropped_tag = Tag::new(0x7FE0, 0x0010);
    let kept_tag = Tag::new(0x0010, 0x0010);

    let mut flow = Blacklist::new(Collector(Vec::new()), vec![TagPath::new().with_tag(dropped_tag)]);

    let out1 = flow.handle(Part::Header { tag: kept_tag, vr: ValueRepresentation::PersonName, length: Some(0) });
    assert_eq!(out1.len(), 1);

    let out2 = flow.handle(Part::Header { tag: dropped_tag, vr: ValueRepresentation::OtherByteString, length: Some(4) });
    assert!(out2.is_empty());

    let out3 = flow.handle(Part::ValueChunk { bytes: SharedBytes::from_vec(vec![1, 2, 3, 4]), last: true });
    assert!(out3.is_empty());
  }

  #[test]
  fn whitelist_keeps_only_matching_test() {
    let kept_tag = Tag::new(0x0010, 0x0010);
    let other_tag = Tag::new(0x0010, 0x0020);

    let mut flow = Whitelist::new(Collector(Vec::new()), vec![TagPath::new().with_tag(kept_tag)]);

    let out1 = flow.handle(Part::Header { tag: kept_tag, vr: ValueRepresentation::PersonName, length: Some(0) });
    assert_eq!(out1.len(), 1);

    let out2 = flow.handle(Part::Header { tag: other_tag, vr: ValueRepresentation::LongString, length: Some(0) });
    assert!(out2.is_empty());
  }
}
