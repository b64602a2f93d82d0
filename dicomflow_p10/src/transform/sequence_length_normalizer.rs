use dicomflow_core::tag::Tag;

use crate::flow::Flow;
use crate::flow::behaviors::FragmentsTracker;
use crate::part::Part;

#[derive(Debug, Clone, Copy)]
enum FrameKind {
  Sequence(Tag),
  Item(usize),
}

#[derive(Debug)]
struct Frame {
  kind: FrameKind,
  bytes_left: u64,
}

/// Rewrites every determinate-length `Sequence`/`Item` to an
/// indeterminate-length one followed eventually by a synthetic delimiter,
/// so downstream consumers only ever see one encoding style. Encapsulated
/// fragments values are left untouched: they're always indeterminate-length
/// already.
///
pub struct SequenceLengthNormalizer<F: Flow> {
  inner: F,
  fragments: FragmentsTracker,
  stack: Vec<Frame>,
}

impl<F: Flow> SequenceLengthNormalizer<F> {
  pub fn new(inner: F) -> Self {
    Self { inner, fragments: FragmentsTracker::new(), stack: Vec::new() }
  }

  fn consume(&mut self, bytes: u64) {
    for frame in self.stack.iter_mut() {
      frame.bytes_left = frame.bytes_left.saturating_sub(bytes);
    }
  }

  fn drain_closed_frames(&mut self) -> Vec<Part> {
    let mut out = Vec::new();

    while let Some(frame) = self.stack.last() {
      if frame.bytes_left != 0 {
        break;
      }

      let frame = self.stack.pop().unwrap();
      out.push(match frame.kind {
        FrameKind::Sequence(tag) => Part::SequenceDelimitation { tag, marker: true },
        FrameKind::Item(index) => Part::ItemDelimitation { index, marker: true },
      });
    }

    out
  }
}

impl<F: Flow> Flow for SequenceLengthNormalizer<F> {
  fn handle(&mut self, part: Part) -> Vec<Part> {
    self.fragments.observe(&part);

    let mut out = match part {
      Part::Sequence { tag, vr, length: Some(n) } => {
        let mut out = self.inner.handle(Part::Sequence { tag, vr, length: None });
        self.stack.push(Frame { kind: FrameKind::Sequence(tag), bytes_left: u64::from(n) });
        out.extend(self.drain_closed_frames().into_iter().flat_map(|p| self.inner.handle(p)));
        return out;
      }

      Part::Item { index, length: Some(n) } if !self.fragments.in_fragments() => {
        let mut out = self.inner.handle(Part::Item { index, length: None });
        self.stack.push(Frame { kind: FrameKind::Item(index), bytes_left: u64::from(n) });
        out.extend(self.drain_closed_frames().into_iter().flat_map(|p| self.inner.handle(p)));
        return out;
      }

      Part::SequenceDelimitation { marker: false, .. } => {
        if matches!(self.stack.last(), Some(Frame { kind: FrameKind::Sequence(_), .. })) {
          self.stack.pop();
          return vec![];
        }
        self.inner.handle(part)
      }

      Part::ItemDelimitation { marker: false, .. } => {
        if matches!(self.stack.last(), Some(Frame { kind: FrameKind::Item(_), .. })) {
          self.stack.pop();
          return vec![];
        }
        self.inner.handle(part)
      }

      Part::ValueChunk { .. } | Part::DeflatedChunk { .. } => {
        self.consume(part.byte_length());
        self.inner.handle(part)
      }

      _ => self.inner.handle(part),
    };

    out.extend(self.drain_closed_frames().into_iter().flat_map(|p| self.inner.handle(p)));
    out
  }

  fn finish(&mut self) -> Vec<Part> {
    self.inner.finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use dicomflow_core::bytes::SharedBytes;
  use dicomflow_core::vr::ValueRepresentation;

  struct Collector(Vec<Part>);
  impl Flow for Collector {
    fn handle(&mut self, part: Part) -> Vec<Part> {
      self.0.push(part.clone());
      vec![part]
    }
  }

  #[test]
  fn normalizes_determinate_sequence_test() {
    let tag = Tag::new(0x0008, 0x1115);
    let mut flow = SequenceLengthNormalizer::new(Collector(Vec::new()));

    let out = flow.handle(Part::Sequence { tag, vr: ValueRepresentation::Sequence, length: Some(4) });
    assert!(matches!(out[0], Part::Sequence { length: None, .. }));

    let out = flow.handle(Part::ValueChunk { bytes: SharedBytes::from_vec(vec![1, 2, 3, 4]), last: true });
    assert!(out.iter().any(|p| matches!(p, Part::SequenceDelimitation { marker: true, .. })));
  }
}
