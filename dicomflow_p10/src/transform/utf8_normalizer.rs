use dicomflow_core::bytes::SharedBytes;
use dicomflow_core::tag::Tag;
use dicomflow_core::value::Value;
use dicomflow_core::vr::ValueRepresentation;

use crate::flow::Flow;
use crate::part::Part;

const NORMALIZED_CHARACTER_SET: &str = "ISO_IR 192";

fn is_affected_by_character_set(vr: ValueRepresentation) -> bool {
  matches!(
    vr,
    ValueRepresentation::LongString
      | ValueRepresentation::LongText
      | ValueRepresentation::PersonName
      | ValueRepresentation::ShortString
      | ValueRepresentation::ShortText
      | ValueRepresentation::UnlimitedText
      | ValueRepresentation::UnlimitedCharacters
  )
}

struct Buffering {
  tag: Tag,
  vr: ValueRepresentation,
  length: Option<u32>,
  bytes: Vec<u8>,
}

/// Re-encodes every string element whose decoding depends on the active
/// specific character set (`LO`, `LT`, `PN`, `SH`, `ST`, `UT`, `UC`) as
/// UTF-8, and rewrites `(0008,0005) SpecificCharacterSet` to `"ISO_IR 192"`
/// to match.
///
/// Buffers one element's value at a time (only for the affected VRs and for
/// `SpecificCharacterSet` itself); every other part passes straight
/// through unbuffered.
///
pub struct Utf8Normalizer<F: Flow> {
  inner: F,
  active: dicomflow_charset::CharacterSets,
  buffering: Option<Buffering>,
}

impl<F: Flow> Utf8Normalizer<F> {
  pub fn new(inner: F) -> Self {
    Self { inner, active: dicomflow_charset::CharacterSets::default(), buffering: None }
  }

  fn flush(&mut self) -> Vec<Part> {
    let Buffering { tag, vr, length: _, bytes } = self.buffering.take().unwrap();

    if tag == Tag::SPECIFIC_CHARACTER_SET {
      let new_value = Value::from_bytes(vr, Value::pad(vr, NORMALIZED_CHARACTER_SET.as_bytes().to_vec()));
      let (active, _warnings) = dicomflow_charset::CharacterSets::from_code_strings(&[NORMALIZED_CHARACTER_SET.to_string()]);
      self.active = active;

      let mut out = self.inner.handle(Part::Header { tag, vr, length: Some(new_value.raw_bytes().len() as u32) });
      out.extend(self.inner.handle(Part::ValueChunk { bytes: new_value.raw_bytes().clone(), last: true }));
      return out;
    }

    let decoded = self.active.decode(&bytes);
    let new_bytes = Value::pad(vr, decoded.into_bytes());
    let shared = SharedBytes::from_vec(new_bytes);

    let mut out = self.inner.handle(Part::Header { tag, vr, length: Some(shared.len() as u32) });
    out.extend(self.inner.handle(Part::ValueChunk { bytes: shared, last: true }));
    out
  }
}

impl<F: Flow> Flow for Utf8Normalizer<F> {
  fn handle(&mut self, part: Part) -> Vec<Part> {
    match part {
      Part::Header { tag, vr, length } if tag == Tag::SPECIFIC_CHARACTER_SET || is_affected_by_character_set(vr) => {
        self.buffering = Some(Buffering { tag, vr, length, bytes: Vec::new() });
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

#[cfg(test)]
mod tests {
  use super::*;
  use dicomflow_core::tag::Tag;

  struct Collector(Vec<Part>);
  impl Flow for Collector {
    fn handle(&mut self, part: Part) -> Vec<Part> {
      self.0.push(part.clone());
      vec![part]
    }
  }

  #[test]
  fn rewrites_specific_character_set_test() {
    let mut flow = Utf8Normalizer::new(Collector(Vec::new()));

    flow.handle(Part::Header { tag: Tag::SPECIFIC_CHARACTER_SET, vr: ValueRepresentation::CodeString, length: Some(10) });
    let out = flow.handle(Part::ValueChunk { bytes: SharedBytes::from_vec(b"ISO_IR 100".to_vec()), last: true });

    match &out[1] {
      Part::ValueChunk { bytes, .. } => assert_eq!(&**bytes, NORMALIZED_CHARACTER_SET.as_bytes()),
      _ => panic!("expected ValueChunk"),
    }
  }

  #[test]
  fn reencodes_affected_string_vr_test() {
    let mut flow = Utf8Normalizer::new(Collector(Vec::new()));

    let tag = Tag::new(0x0010, 0x0010);
    flow.handle(Part::Header { tag, vr: ValueRepresentation::PersonName, length: Some(4) });
    let out = flow.handle(Part::ValueChunk { bytes: SharedBytes::from_vec(b"Doe\0".to_vec()), last: true });

    match &out[1] {
      Part::ValueChunk { bytes, .. } => assert_eq!(&**bytes, b"Doe\0"),
      _ => panic!("expected ValueChunk"),
    }
  }
}
