use crate::flow::Flow;
use crate::part::Part;

#[derive(Debug, Clone, Copy)]
enum FrameKind {
  Sequence(dicomflow_core::tag::Tag),
  Item(usize),
}

#[derive(Debug)]
struct Frame {
  kind: FrameKind,
  bytes_left: u64,
}

/// Guarantees that every determinate-length sequence and item is followed
/// by a `SequenceDelimitation`/`ItemDelimitation`, synthesizing one
/// (`marker: true`) once the declared length's worth of value bytes has
/// passed, so downstream consumers can treat determinate- and
/// indeterminate-length containers uniformly.
///
/// Byte accounting is driven by [`Part::byte_length`], applied to every
/// emitted part (header, value chunk, fragments, item, sequence,
/// delimitation); it assumes a `Sequence`/`Item` length expresses the total
/// size of everything nested beneath it, wire bytes included, which holds
/// for streams rebuilt from an aggregated data set. A reader that already
/// synthesizes delimiters itself (as this crate's does) makes this behavior
/// redundant for its own output, but it stays useful for other part
/// sources.
///
pub struct GuaranteedDelimitationEvents<F: Flow> {
  inner: F,
  stack: Vec<Frame>,
}

impl<F: Flow> GuaranteedDelimitationEvents<F> {
  pub fn new(inner: F) -> Self {
    Self { inner, stack: Vec::new() }
  }

  fn consume(&mut self, bytes: u64) {
    for frame in self.stack.iter_mut() {
      frame.bytes_left = frame.bytes_left.saturating_sub(bytes);
    }
  }

  fn drain_closed_frames(&mut self) -> Vec<Part> {
    let mut synthesized = Vec::new();

    while let Some(frame) = self.stack.last() {
      if frame.bytes_left != 0 {
        break;
      }

      let frame = self.stack.pop().unwrap();
      synthesized.push(match frame.kind {
        FrameKind::Sequence(tag) => Part::SequenceDelimitation { tag, marker: true },
        FrameKind::Item(index) => Part::ItemDelimitation { index, marker: true },
      });
    }

    synthesized
  }
}

impl<F: Flow> Flow for GuaranteedDelimitationEvents<F> {
  fn handle(&mut self, part: Part) -> Vec<Part> {
    match &part {
      Part::Sequence { tag, length: Some(n), .. } => {
        self.consume(part.byte_length());
        let mut out = self.inner.handle(part.clone());
        self.stack.push(Frame { kind: FrameKind::Sequence(*tag), bytes_left: u64::from(*n) });
        out.extend(self.drain_closed_frames().into_iter().flat_map(|p| self.inner.handle(p)));
        return out;
      }

      Part::Item { index, length: Some(n) } => {
        self.consume(part.byte_length());
        let mut out = self.inner.handle(part.clone());
        self.stack.push(Frame { kind: FrameKind::Item(*index), bytes_left: u64::from(*n) });
        out.extend(self.drain_closed_frames().into_iter().flat_map(|p| self.inner.handle(p)));
        return out;
      }

      Part::SequenceDelimitation { marker: false, .. } => {
        if matches!(self.stack.last(), Some(Frame { kind: FrameKind::Sequence(_), .. })) {
          self.stack.pop();
        }
        self.consume(part.byte_length());
      }

      Part::ItemDelimitation { marker: false, .. } => {
        if matches!(self.stack.last(), Some(Frame { kind: FrameKind::Item(_), .. })) {
          self.stack.pop();
        }
        self.consume(part.byte_length());
      }

      _ => {
        self.consume(part.byte_length());
      }
    }

    let mut out = self.inner.handle(part);
    let synthesized = self.drain_closed_frames();
    out.extend(synthesized.into_iter().flat_map(|p| self.inner.handle(p)));
    out
  }

  fn finish(&mut self) -> Vec<Part> {
    self.inner.finish()
  }
}
