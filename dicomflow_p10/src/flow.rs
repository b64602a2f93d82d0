//! Composable processors over a [`Part`] stream.
//!
//! A flow is anything that turns one incoming part into zero or more
//! outgoing parts. The [`behaviors`] module supplies decorators that each add
//! one invariant (fragment/sequence tracking, guaranteed value and
//! delimitation events, tag path tracking) on top of an inner flow; filters
//! and other transforms in [`crate::transform`] implement [`Flow`] directly.

pub mod behaviors;

use crate::part::Part;

/// A processor over a part stream. `handle` is called once per incoming
/// part and returns the parts that should continue downstream in its place
/// (zero, one, or several).
///
pub trait Flow {
  fn handle(&mut self, part: Part) -> Vec<Part>;

  /// Called once after the last part of the stream has been handled, for
  /// flows that need to emit something at end-of-stream (e.g. a final
  /// guaranteed event). The default does nothing.
  ///
  fn finish(&mut self) -> Vec<Part> {
    vec![]
  }
}

/// Runs a fixed sequence of flows over a part stream, feeding each flow's
/// output as the next flow's input.
///
pub struct Pipeline {
  stages: Vec<Box<dyn Flow>>,
}

impl Pipeline {
  pub fn new() -> Self {
    Self { stages: Vec::new() }
  }

  pub fn push(mut self, flow: Box<dyn Flow>) -> Self {
    self.stages.push(flow);
    self
  }

  /// Feeds a single part through every stage in order, returning whatever
  /// parts emerge from the last stage.
  ///
  pub fn process(&mut self, part: Part) -> Vec<Part> {
    let mut current = vec![part];

    for stage in self.stages.iter_mut() {
      let mut next = Vec::with_capacity(current.len());
      for part in current {
        next.extend(stage.handle(part));
      }
      current = next;
    }

    current
  }

  /// Feeds a batch of parts through the pipeline, in order.
  ///
  pub fn process_all(&mut self, parts: Vec<Part>) -> Vec<Part> {
    let mut out = Vec::with_capacity(parts.len());
    for part in parts {
      out.extend(self.process(part));
    }
    out
  }

  /// Flushes every stage's end-of-stream events, in order.
  ///
  pub fn finish(&mut self) -> Vec<Part> {
    let mut out = Vec::new();
    for stage in self.stages.iter_mut() {
      out.extend(stage.finish());
    }
    out
  }
}

impl Default for Pipeline {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use dicomflow_core::bytes::SharedBytes;

  struct Drop7fe0;

  impl Flow for Drop7fe0 {
    fn handle(&mut self, part: Part) -> Vec<Part> {
      if part.tag().map(|t| t.group) == Some(0x7FE0) { vec![] } else { vec![part] }
    }
  }

  #[test]
  fn pipeline_runs_stages_in_order_test() {
    let mut pipeline = Pipeline::new().push(Box::new(Drop7fe0));

    let kept = pipeline.process(Part::Header {
      tag: dicomflow_core::tag::Tag::new(0x0010, 0x0010),
      vr: dicomflow_core::vr::ValueRepresentation::PersonName,
      length: Some(0),
    });
    assert_eq!(kept.len(), 1);

    let dropped = pipeline.process(Part::Fragments {
      tag: dicomflow_core::tag::Tag::PIXEL_DATA,
      vr: dicomflow_core::vr::ValueRepresentation::OtherByteString,
    });
    assert!(dropped.is_empty());

    let _ = SharedBytes::empty();
  }
}
