use dicomflow_core::bytes::SharedBytes;
use dicomflow_core::tag::Tag;
use dicomflow_core::vr::ValueRepresentation;

use crate::flow::Flow;
use crate::part::Part;

/// Transfer syntax UID for Explicit VR Little Endian, written into any
/// `TransferSyntaxUID` element this normalizer passes through.
pub const EXPLICIT_VR_LITTLE_ENDIAN_UID: &str = "1.2.840.10008.1.2.1";

fn byte_swap_width(vr: ValueRepresentation) -> Option<usize> {
  match vr {
    ValueRepresentation::UnsignedShort | ValueRepresentation::SignedShort | ValueRepresentation::OtherWordString => Some(2),
    ValueRepresentation::AttributeTag => Some(2), // two 2-byte fields, swapped independently
    ValueRepresentation::UnsignedLong
    | ValueRepresentation::SignedLong
    | ValueRepresentation::FloatingPointSingle
    | ValueRepresentation::OtherLongString => Some(4),
    ValueRepresentation::FloatingPointDouble | ValueRepresentation::OtherDoubleString => Some(8),
    _ => None,
  }
}

fn swap_bytes(bytes: &[u8], width: usize) -> Vec<u8> {
  let mut out = Vec::with_capacity(bytes.len());
  for chunk in bytes.chunks(width) {
    out.extend(chunk.iter().rev());
  }
  out
}

struct Buffering {
  tag: Tag,
  vr: ValueRepresentation,
  bytes: Vec<u8>,
}

/// Normalizes a data set read under any supported transfer syntax to
/// Explicit VR Little Endian semantics: rewrites `TransferSyntaxUID` to
/// `1.2.840.10008.1.2.1`, and if the source was big endian, byte-swaps
/// every binary-VR value (`US`/`SS`/`OW`/`AT`/`UL`/`SL`/`FL`/`OD`/`FD`) to
/// little endian. String and `OB`/`UN` values are untouched either way.
///
/// The writer that ultimately serializes the output still needs to be
/// constructed with `TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN`; this
/// transform only fixes up the value bytes and the UID element.
///
pub struct ExplicitVrLeNormalizer<F: Flow> {
  inner: F,
  source_big_endian: bool,
  buffering: Option<Buffering>,
}

impl<F: Flow> ExplicitVrLeNormalizer<F> {
  pub fn new(inner: F, source_big_endian: bool) -> Self {
    Self { inner, source_big_endian, buffering: None }
  }

  fn needs_buffering(&self, tag: Tag, vr: ValueRepresentation) -> bool {
    tag == Tag::new(0x0002, 0x0010) || (self.source_big_endian && byte_swap_width(vr).is_some())
  }

  fn flush(&mut self) -> Vec<Part> {
    let Buffering { tag, vr, bytes } = self.buffering.take().unwrap();

    if tag == Tag::new(0x0002, 0x0010) {
      let mut uid = EXPLICIT_VR_LITTLE_ENDIAN_UID.as_bytes().to_vec();
      if uid.len() % 2 != 0 {
        uid.push(0);
      }

      let mut out = self.inner.handle(Part::Header { tag, vr, length: Some(uid.len() as u32) });
      out.extend(self.inner.handle(Part::ValueChunk { bytes: SharedBytes::from_vec(uid), last: true }));
      return out;
    }

    let width = byte_swap_width(vr).unwrap_or(1);
    let swapped = swap_bytes(&bytes, width);

    let mut out = self.inner.handle(Part::Header { tag, vr, length: Some(swapped.len() as u32) });
    out.extend(self.inner.handle(Part::ValueChunk { bytes: SharedBytes::from_vec(swapped), last: true }));
    out
  }
}

impl<F: Flow> Flow for ExplicitVrLeNormalizer<F> {
  fn handle(&mut self, part: Part) -> Vec<Part> {
    match part {
      Part::Header { tag, vr, length } if self.needs_buffering(tag, vr) => {
        self.buffering = Some(Buffering { tag, vr, bytes: Vec::new() });
        let _ = length;
        vec![]
      }

      Part::ValueChunk { bytes, last } if self.buffering.is_some() => {
        self.buffering.as_mut().unwrap().bytes.extend_from_slice(&bytes);
        if last { self.flush() } else { vec![] }
      }

      other => self.inner.handle(other),
    }
  }

  fn finish(&mut self) -> Vec<Part> {
    self.inner.finish()
  }
}
