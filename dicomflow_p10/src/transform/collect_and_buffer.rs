use dicomflow_core::bytes::SharedBytes;
use dicomflow_core::tag::Tag;
use dicomflow_core::vr::ValueRepresentation;

use crate::error::TransformError;
use crate::flow::Flow;
use crate::flow::behaviors::PathTracker;
use crate::part::Part;

struct Pending {
  tag: Tag,
  vr: ValueRepresentation,
  bytes: Vec<u8>,
}

/// Accumulates all of a single element's (or fragment's) `ValueChunk`s into
/// one contiguous buffer, re-emitting it as a single chunk once the value
/// is complete.
///
/// Exceeding `max_buffer_size` for one element's value raises
/// `TransformError::BufferOverflow` rather than growing unboundedly.
/// Grounded on the `PendingDataElement` accumulation pattern used by the
/// dataset aggregator.
///
pub struct CollectAndBuffer<F: Flow> {
  inner: F,
  tracker: PathTracker,
  max_buffer_size: usize,
  pending: Option<Pending>,
  error: Option<TransformError>,
}

impl<F: Flow> CollectAndBuffer<F> {
  pub fn new(inner: F, max_buffer_size: usize) -> Self {
    Self { inner, tracker: PathTracker::new(), max_buffer_size, pending: None, error: None }
  }

  /// Returns the error raised by the most recent call to `handle`, if any.
  /// Once set, the flow stops passing value bytes through and only
  /// forwards structural parts.
  ///
  pub fn error(&self) -> Option<&TransformError> {
    self.error.as_ref()
  }

  fn flush(&mut self) -> Vec<Part> {
    let Pending { tag, vr, bytes } = self.pending.take().unwrap();

    let mut out = self.inner.handle(Part::Header { tag, vr, length: Some(bytes.len() as u32) });
    out.extend(self.inner.handle(Part::ValueChunk { bytes: SharedBytes::from_vec(bytes), last: true }));
    out
  }
}

impl<F: Flow> Flow for CollectAndBuffer<F> {
  fn handle(&mut self, part: Part) -> Vec<Part> {
    self.tracker.observe(&part);

    match part {
      Part::Header { tag, vr, .. } => {
        self.pending = Some(Pending { tag, vr, bytes: Vec::new() });
        vec![]
      }

      Part::ValueChunk { bytes, last } if self.pending.is_some() => {
        let pending = self.pending.as_mut().unwrap();

        if pending.bytes.len() + bytes.len() > self.max_buffer_size {
          self.error = Some(TransformError::BufferOverflow { path: self.tracker.path().clone(), max_buffer_size: self.max_buffer_size });
          self.pending = None;
          return vec![];
        }

        pending.bytes.extend_from_slice(&bytes);

        if last { self.flush() } else { vec![] }
      }

      other => self.inner.handle(other),
    }
  }

  fn finish(&mut self) -> Vec<Part> {
    self.inner.finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Collector(Vec<Part>);
  impl Flow for Collector {
    fn handle(&mut self, part: Part) -> Vec<Part> {
      self.0.push(part.clone());
      vec![part]
    }
  }

  #[test]
  fn combines_chunks_into_one_test() {
    let mut flow = CollectAndBuffer::new(Collector(Vec::new()), 1024);

    let tag = Tag::new(0x0010, 0x0010);
    flow.handle(Part::Header { tag, vr: ValueRepresentation::PersonName, length: None });
    flow.handle(Part::ValueChunk { bytes: SharedBytes::from_vec(vec![1, 2]), last: false });
    let out = flow.handle(Part::ValueChunk { bytes: SharedBytes::from_vec(vec![3, 4]), last: true });

    match &out[1] {
      Part::ValueChunk { bytes, last } => {
        assert_eq!(&**bytes, &[1, 2, 3, 4]);
        assert!(*last);
      }
      _ => panic!("expected ValueChunk"),
    }
  }

  #[test]
  fn raises_buffer_overflow_test() {
    let mut flow = CollectAndBuffer::new(Collector(Vec::new()), 2);

    let tag = Tag::new(0x0010, 0x0010);
    flow.handle(Part::Header { tag, vr: ValueRepresentation::PersonName, length: None });
    flow.handle(Part::ValueChunk { bytes: SharedBytes::from_vec(vec![1, 2, 3]), last: true });

    assert!(matches!(flow.error(), Some(TransformError::BufferOverflow { .. })));
  }
}
