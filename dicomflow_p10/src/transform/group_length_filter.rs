use dicomflow_core::tag::Tag;

use crate::flow::Flow;
use crate::part::Part;

/// Drops group-length elements (element number `0000`), except
/// `(0002,0000) FileMetaInformationGroupLength`, which the File Meta
/// Information always needs.
///
/// Group-length elements other than the FMI one are a retired PS3.5
/// concept; most modern writers omit them, and this filter removes any that
/// show up anyway.
///
pub struct GroupLengthFilter<F: Flow> {
  inner: F,
  dropping: bool,
}

impl<F: Flow> GroupLengthFilter<F> {
  pub fn new(inner: F) -> Self {
    Self { inner, dropping: false }
  }

  fn is_group_length(tag: Tag) -> bool {
    tag.element == 0x0000 && tag != Tag::new(0x0002, 0x0000)
  }
}

impl<F: Flow> Flow for GroupLengthFilter<F> {
  fn handle(&mut self, part: Part) -> Vec<Part> {
    match &part {
      Part::Header { tag, .. } => {
        self.dropping = Self::is_group_length(*tag);
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
  use dicomflow_core::vr::ValueRepresentation;

  struct Collector(Vec<Part>);
  impl Flow for Collector {
    fn handle(&mut self, part: Part) -> Vec<Part> {
      self.0.push(part.clone());
      vec![part]
    }
  }

  #[test]
  fn drops_ordinary_group_length_test() {
    let mut flow = GroupLengthFilter::new(Collector(Vec::new()));

    let out = flow.handle(Part::Header { tag: Tag::new(0x0008, 0x0000), vr: ValueRepresentation::UnsignedLong, length: Some(4) });
    assert!(out.is_empty());

    let out = flow.handle(Part::ValueChunk { bytes: SharedBytes::from_vec(vec![1, 2, 3, 4]), last: true });
    assert!(out.is_empty());
  }

  #[test]
  fn keeps_fmi_group_length_test() {
    let mut flow = GroupLengthFilter::new(Collector(Vec::new()));

    let out = flow.handle(Part::Header { tag: Tag::new(0x0002, 0x0000), vr: ValueRepresentation::UnsignedLong, length: Some(4) });
    assert_eq!(out.len(), 1);
  }
}
