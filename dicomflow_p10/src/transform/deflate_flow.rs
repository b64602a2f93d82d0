use dicomflow_core::bytes::SharedBytes;
use dicomflow_core::transfer_syntax::TransferSyntax;

use crate::flow::Flow;
use crate::part::Part;
use crate::write_config::WriteConfig;
use crate::writer::Writer;

/// Compresses every part of the data set that follows the File Meta
/// Information, re-emitting it as a stream of `DeflatedChunk` parts. The FMI
/// itself, which is never deflated on the wire, passes through unchanged.
///
/// Each part is first serialized to its Explicit VR Little Endian wire
/// bytes (deflated transfer syntaxes always pair with that VR
/// serialization) and fed through a raw `flate2::Compress` stream, mirroring
/// how `Writer` deflates its own output.
///
pub struct DeflateFlow<F: Flow> {
  inner: F,
  encoder: Writer,
  compress: flate2::Compress,
  past_fmi: bool,
}

impl<F: Flow> DeflateFlow<F> {
  pub fn new(inner: F, zlib_compression_level: u32) -> Self {
    let config = WriteConfig::default().zlib_compression_level(zlib_compression_level);

    Self {
      inner,
      encoder: Writer::new(&TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN, config),
      compress: flate2::Compress::new(flate2::Compression::new(zlib_compression_level), false),
      past_fmi: false,
    }
  }

  fn is_fmi_part(&self, part: &Part) -> bool {
    matches!(part, Part::Preamble { .. }) || part.tag().is_some_and(|tag| tag.group == 0x0002)
  }

  fn compress_chunk(&mut self, bytes: &[u8], flush: flate2::FlushCompress) -> Vec<u8> {
    if bytes.is_empty() && flush == flate2::FlushCompress::None {
      return vec![];
    }

    let mut out = Vec::with_capacity(bytes.len());
    let mut chunk = vec![0u8; std::cmp::max(bytes.len(), 256)];
    let mut input_offset = 0usize;

    loop {
      let before_in = self.compress.total_in();
      let before_out = self.compress.total_out();

      let status = self.compress.compress(&bytes[input_offset..], &mut chunk, flush).expect("deflate never fails on valid input");

      let consumed = (self.compress.total_in() - before_in) as usize;
      let produced = (self.compress.total_out() - before_out) as usize;

      input_offset += consumed;
      out.extend_from_slice(&chunk[..produced]);

      if status == flate2::Status::StreamEnd {
        break;
      }

      if input_offset >= bytes.len() && produced == 0 {
        break;
      }
    }

    out
  }
}

impl<F: Flow> Flow for DeflateFlow<F> {
  fn handle(&mut self, part: Part) -> Vec<Part> {
    if self.is_fmi_part(&part) {
      return self.inner.handle(part);
    }

    self.past_fmi = true;

    let raw = self.encoder.encode_part(&part).unwrap_or_default();
    let compressed = self.compress_chunk(&raw, flate2::FlushCompress::None);

    if compressed.is_empty() { vec![] } else { self.inner.handle(Part::DeflatedChunk { bytes: SharedBytes::from_vec(compressed) }) }
  }

  fn finish(&mut self) -> Vec<Part> {
    let mut out = Vec::new();

    if self.past_fmi {
      let tail = self.compress_chunk(&[], flate2::FlushCompress::Finish);
      if !tail.is_empty() {
        out.extend(self.inner.handle(Part::DeflatedChunk { bytes: SharedBytes::from_vec(tail) }));
      }
    }

    out.extend(self.inner.finish());
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;
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
  fn fmi_parts_pass_through_uncompressed_test() {
    let mut flow = DeflateFlow::new(Collector(Vec::new()), 6);

    let tag = Tag::new(0x0002, 0x0010);
    let out = flow.handle(Part::Header { tag, vr: ValueRepresentation::UniqueIdentifier, length: Some(0) });
    assert!(matches!(out[0], Part::Header { .. }));
  }

  #[test]
  fn dataset_parts_become_deflated_chunks_test() {
    let mut flow = DeflateFlow::new(Collector(Vec::new()), 6);

    let tag = Tag::new(0x0010, 0x0010);
    let out = flow.handle(Part::Header { tag, vr: ValueRepresentation::PersonName, length: Some(4) });

    assert!(out.iter().all(|p| matches!(p, Part::DeflatedChunk { .. })) || out.is_empty());

    let finished = flow.finish();
    assert!(finished.iter().all(|p| matches!(p, Part::DeflatedChunk { .. })));
  }
}
