use crate::flow::Flow;
use crate::part::Part;

/// Drops the entire File Meta Information group (tag group `0002`),
/// including the preamble, leaving only the main data set.
///
pub struct FmiFilter<F: Flow> {
  inner: F,
  dropping: bool,
}

impl<F: Flow> FmiFilter<F> {
  pub fn new(inner: F) -> Self {
    Self { inner, dropping: false }
  }
}

impl<F: Flow> Flow for FmiFilter<F> {
  fn handle(&mut self, part: Part) -> Vec<Part> {
    match &part {
      Part::Preamble { .. } => vec![],

      Part::Header { tag, .. } => {
        self.dropping = tag.group == 0x0002;
        if self.dropping { vec![] } else { self.inner.handle(part) }
      }

      Part::ValueChunk { .. } => {
        if self.dropping { vec![] } else { self.inner.handle(part) }
      }

      _ => {
        self.dropping = false;
        self.inner.handle(part)
      }
    }
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
  fn drops_preamble_and_fmi_test() {
    let mut flow = FmiFilter::new(Collector(Vec::new()));

    assert!(flow.handle(Part::Preamble { bytes: SharedBytes::empty() }).is_empty());
    assert!(
      flow
        .handle(Part::Header { tag: Tag::new(0x0002, 0x0010), vr: ValueRepresentation::UniqueIdentifier, length: Some(0) })
        .is_empty()
    );

    let out =
      flow.handle(Part::Header { tag: Tag::new(0x0010, 0x0010), vr: ValueRepresentation::PersonName, length: Some(0) });
    assert_eq!(out.len(), 1);
  }
}
