use dicomflow_core::tag::Tag;
use dicomflow_core::transfer_syntax::TransferSyntax;
use dicomflow_core::vr::ValueRepresentation;

use crate::flow::Flow;
use crate::part::Part;
use crate::write_config::WriteConfig;
use crate::writer::Writer;

const FILE_META_INFORMATION_GROUP_LENGTH: Tag = Tag::new(0x0002, 0x0000);

/// Recomputes `(0002,0000) FileMetaInformationGroupLength` from the FMI
/// elements actually present on the stream, dropping any incoming value for
/// that tag and synthesizing a correct one instead.
///
/// Buffers every part belonging to group `0x0002` (other than the group
/// length element itself) until the first dataset part arrives, at which
/// point it emits a freshly computed group length header followed by the
/// buffered FMI and then the triggering part.
///
pub struct FmiGroupLengthRecompute<F: Flow> {
  inner: F,
  encoder: Writer,
  buffered: Vec<Part>,
  buffered_byte_length: u32,
  dropping_group_length: bool,
  flushed: bool,
}

impl<F: Flow> FmiGroupLengthRecompute<F> {
  pub fn new(inner: F) -> Self {
    Self {
      inner,
      encoder: Writer::new(&TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN, WriteConfig::default()),
      buffered: Vec::new(),
      buffered_byte_length: 0,
      dropping_group_length: false,
      flushed: false,
    }
  }

  fn flush(&mut self) -> Vec<Part> {
    self.flushed = true;

    let mut out = self.inner.handle(Part::Header {
      tag: FILE_META_INFORMATION_GROUP_LENGTH,
      vr: ValueRepresentation::UnsignedLong,
      length: Some(4),
    });

    out.extend(self.inner.handle(Part::ValueChunk {
      bytes: dicomflow_core::bytes::SharedBytes::from_vec(self.buffered_byte_length.to_le_bytes().to_vec()),
      last: true,
    }));

    for part in self.buffered.drain(..) {
      out.extend(self.inner.handle(part));
    }

    out
  }
}

impl<F: Flow> Flow for FmiGroupLengthRecompute<F> {
  fn handle(&mut self, part: Part) -> Vec<Part> {
    if self.flushed {
      return self.inner.handle(part);
    }

    if matches!(part, Part::Preamble { .. }) {
      return self.inner.handle(part);
    }

    let is_fmi = part.tag().is_some_and(|tag| tag.group == 0x0002) || matches!(part, Part::ValueChunk { .. });

    if !is_fmi {
      let mut out = self.flush();
      out.extend(self.inner.handle(part));
      return out;
    }

    if let Part::Header { tag, .. } = &part {
      self.dropping_group_length = *tag == FILE_META_INFORMATION_GROUP_LENGTH;
    }

    if !self.dropping_group_length {
      let raw = self.encoder.encode_part(&part).unwrap_or_default();
      self.buffered_byte_length += raw.len() as u32;
      self.buffered.push(part);
    }

    vec![]
  }

  fn finish(&mut self) -> Vec<Part> {
    let mut out = if self.flushed { vec![] } else { self.flush() };
    out.extend(self.inner.finish());
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use dicomflow_core::bytes::SharedBytes;

  struct Collector(Vec<Part>);
  impl Flow for Collector {
    fn handle(&mut self, part: Part) -> Vec<Part> {
      self.0.push(part.clone());
      vec![part]
    }
  }

  #[test]
  fn recomputes_group_length_from_buffered_fmi_test() {
    let mut flow = FmiGroupLengthRecompute::new(Collector(Vec::new()));

    let ts_tag = Tag::new(0x0002, 0x0010);
    flow.handle(Part::Header { tag: ts_tag, vr: ValueRepresentation::UniqueIdentifier, length: Some(18) });
    flow.handle(Part::ValueChunk { bytes: SharedBytes::from_vec(b"1.2.840.10008.1.2\0".to_vec()), last: true });

    let out = flow.handle(Part::Header { tag: Tag::new(0x0010, 0x0010), vr: ValueRepresentation::PersonName, length: Some(0) });

    assert!(matches!(out[0], Part::Header { tag, .. } if tag == FILE_META_INFORMATION_GROUP_LENGTH));
  }
}
