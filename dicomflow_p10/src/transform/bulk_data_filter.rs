use dicomflow_core::tag::Tag;
use dicomflow_core::tag_path::TagPathNode;

use crate::flow::Flow;
use crate::flow::behaviors::PathTracker;
use crate::part::Part;

const PIXEL_DATA: Tag = Tag::PIXEL_DATA;
const WAVEFORM_SEQUENCE: Tag = Tag::new(0x5400, 0x0100);
const WAVEFORM_DATA: Tag = Tag::new(0x5400, 0x1010);
const PIXEL_DATA_PROVIDER_URL: Tag = Tag::new(0x0028, 0x7FE0);
const ENCAPSULATED_DOCUMENT: Tag = Tag::new(0x0042, 0x0011);
const FLOAT_PIXEL_DATA: Tag = Tag::new(0x7FE0, 0x0008);
const DOUBLE_FLOAT_PIXEL_DATA: Tag = Tag::new(0x7FE0, 0x0009);

fn is_curve_data_group(tag: Tag) -> bool {
  (0x5000..=0x50FF).contains(&tag.group)
}

fn is_overlay_data_group(tag: Tag) -> bool {
  (0x6000..=0x60FF).contains(&tag.group)
}

fn is_waveform_data_under_sequence(tag: Tag, tracker: &PathTracker) -> bool {
  if tag != WAVEFORM_DATA {
    return false;
  }

  let nodes = tracker.path().nodes();
  matches!(
    nodes,
    [TagPathNode::Sequence(seq), TagPathNode::Item(_), TagPathNode::Tag(_)] if *seq == WAVEFORM_SEQUENCE
  )
}

/// Drops bulk pixel/waveform/curve/overlay data that's typically large and
/// not needed for metadata-only processing:
///
/// - `PixelData` at the root of the data set.
/// - `WaveformData`, but only directly inside a `WaveformSequence` item.
/// - `PixelDataProviderURL`, `EncapsulatedDocument`, `FloatPixelData`,
///   `DoubleFloatPixelData`, and any element in the retired Curve Data
///   (`5000`-`50FF`) or Overlay Data (`6000`-`60FF`) repeating groups,
///   unconditionally.
///
pub struct BulkDataFilter<F: Flow> {
  inner: F,
  tracker: PathTracker,
  dropping: bool,
}

impl<F: Flow> BulkDataFilter<F> {
  pub fn new(inner: F) -> Self {
    Self { inner, tracker: PathTracker::new(), dropping: false }
  }

  fn should_drop(&self, tag: Tag) -> bool {
    let at_root = self.tracker.path().is_empty() || self.tracker.path().len() == 1;

    (tag == PIXEL_DATA && at_root)
      || is_waveform_data_under_sequence(tag, &self.tracker)
      || tag == PIXEL_DATA_PROVIDER_URL
      || tag == ENCAPSULATED_DOCUMENT
      || tag == FLOAT_PIXEL_DATA
      || tag == DOUBLE_FLOAT_PIXEL_DATA
      || is_curve_data_group(tag)
      || is_overlay_data_group(tag)
  }
}

impl<F: Flow> Flow for BulkDataFilter<F> {
  fn handle(&mut self, part: Part) -> Vec<Part> {
    self.tracker.observe(&part);

    match &part {
      Part::Header { tag, .. } | Part::Fragments { tag, .. } => {
        self.dropping = self.should_drop(*tag);
        if self.dropping { vec![] } else { self.inner.handle(part) }
      }

      Part::ValueChunk { .. } | Part::Item { .. } | Part::ItemDelimitation { .. } => {
        if self.dropping { vec![] } else { self.inner.handle(part) }
      }

      Part::SequenceDelimitation { .. } => {
        let was_dropping = self.dropping;
        self.dropping = false;
        if was_dropping { vec![] } else { self.inner.handle(part) }
      }

      _ => self.inner.handle(part),
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
  fn drops_root_pixel_data_test() {
    let mut flow = BulkDataFilter::new(Collector(Vec::new()));

    let out = flow.handle(Part::Fragments { tag: PIXEL_DATA, vr: ValueRepresentation::OtherByteString });
    assert!(out.is_empty());

    let out = flow.handle(Part::Item { index: 0, length: Some(4) });
    assert!(out.is_empty());
  }

  #[test]
  fn keeps_waveform_data_outside_waveform_sequence_test() {
    let mut flow = BulkDataFilter::new(Collector(Vec::new()));

    let out = flow.handle(Part::Header { tag: WAVEFORM_DATA, vr: ValueRepresentation::OtherWordString, length: Some(0) });
    assert_eq!(out.len(), 1);
  }

  #[test]
  fn drops_waveform_data_inside_waveform_sequence_test() {
    let mut flow = BulkDataFilter::new(Collector(Vec::new()));

    flow.handle(Part::Sequence { tag: WAVEFORM_SEQUENCE, vr: ValueRepresentation::Sequence, length: None });
    flow.handle(Part::Item { index: 0, length: None });
    let out = flow.handle(Part::Header { tag: WAVEFORM_DATA, vr: ValueRepresentation::OtherWordString, length: Some(0) });
    assert!(out.is_empty());
  }

  #[test]
  fn drops_curve_data_group_test() {
    let mut flow = BulkDataFilter::new(Collector(Vec::new()));

    let out = flow.handle(Part::Header { tag: Tag::new(0x5000, 0x3000), vr: ValueRepresentation::OtherByteString, length: Some(0) });
    assert!(out.is_empty());

    let _ = SharedBytes::empty();
  }
}
