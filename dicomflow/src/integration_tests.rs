//! End-to-end tests exercising the reader, the part-stream transforms, the
//! data set builder, and the writer together against literal DICOM P10 byte
//! sequences.

use crate::core::bytes::SharedBytes;
use crate::core::tag::Tag;
use crate::p10::transform::{DeflateFlow, SequenceLengthNormalizer};
use crate::p10::{DatasetBuilder, Flow, Part, ReadConfig, Reader, Validator, WriteConfig, Writer};

fn tag_bytes(group: u16, element: u16) -> [u8; 4] {
  let mut bytes = [0u8; 4];
  bytes[0..2].copy_from_slice(&group.to_le_bytes());
  bytes[2..4].copy_from_slice(&element.to_le_bytes());
  bytes
}

fn push_short_header(out: &mut Vec<u8>, group: u16, element: u16, vr: &str, length: u16) {
  out.extend_from_slice(&tag_bytes(group, element));
  out.extend_from_slice(vr.as_bytes());
  out.extend_from_slice(&length.to_le_bytes());
}

fn push_long_header(out: &mut Vec<u8>, group: u16, element: u16, vr: &str, length: u32) {
  out.extend_from_slice(&tag_bytes(group, element));
  out.extend_from_slice(vr.as_bytes());
  out.extend_from_slice(&[0, 0]);
  out.extend_from_slice(&length.to_le_bytes());
}

fn push_item_header(out: &mut Vec<u8>, length: u32) {
  out.extend_from_slice(&tag_bytes(0xFFFE, 0xE000));
  out.extend_from_slice(&length.to_le_bytes());
}

fn push_item_delimitation(out: &mut Vec<u8>) {
  out.extend_from_slice(&tag_bytes(0xFFFE, 0xE00D));
  out.extend_from_slice(&0u32.to_le_bytes());
}

fn push_sequence_delimitation(out: &mut Vec<u8>) {
  out.extend_from_slice(&tag_bytes(0xFFFE, 0xE0DD));
  out.extend_from_slice(&0u32.to_le_bytes());
}

fn preamble_and_prefix() -> Vec<u8> {
  let mut bytes = vec![0u8; 128];
  bytes.extend_from_slice(b"DICM");
  bytes
}

/// Drives a `Reader` to completion over a single, already-complete buffer
/// of bytes, collecting every part it produces.
fn read_all_parts(bytes: Vec<u8>) -> Vec<Part> {
  let mut reader = Reader::new(ReadConfig::default());
  reader.write_bytes(SharedBytes::from_vec(bytes), true).unwrap();

  let mut parts = Vec::new();
  loop {
    if reader.is_finished() {
      break;
    }

    match reader.read_parts() {
      Ok(p) => parts.extend(p),
      Err(crate::p10::ReadError::NeedsMoreBytes) => break,
      Err(e) => panic!("unexpected read error: {e:?}"),
    }
  }

  parts
}

/// Scenario 1: preamble + File Meta Information + one data set element.
#[test]
fn preamble_fmi_and_one_element_test() {
  let mut bytes = preamble_and_prefix();

  push_short_header(&mut bytes, 0x0002, 0x0000, "UL", 4);
  bytes.extend_from_slice(&28u32.to_le_bytes());

  push_short_header(&mut bytes, 0x0002, 0x0010, "UI", 20);
  bytes.extend_from_slice(b"1.2.840.10008.1.2.1\0");

  push_short_header(&mut bytes, 0x0010, 0x0010, "PN", 8);
  bytes.extend_from_slice(b"John^Doe");

  let parts = read_all_parts(bytes);

  assert!(matches!(parts[0], Part::Preamble { .. }));
  assert!(matches!(parts[1], Part::Header { tag, .. } if tag == Tag::new(0x0002, 0x0000)));
  assert!(matches!(parts[2], Part::ValueChunk { last: true, .. }));
  assert!(matches!(parts[3], Part::Header { tag, .. } if tag == Tag::new(0x0002, 0x0010)));
  assert!(matches!(parts[4], Part::ValueChunk { last: true, .. }));
  assert!(matches!(parts[5], Part::Header { tag, .. } if tag == Tag::new(0x0010, 0x0010)));
  assert!(matches!(parts[6], Part::ValueChunk { last: true, .. }));

  let mut builder = DatasetBuilder::new();
  for part in &parts {
    builder.add_part(part).unwrap();
  }
  let elements = builder.finish().unwrap();
  assert_eq!(elements.value(Tag::new(0x0010, 0x0010)).unwrap().string().unwrap(), "John^Doe");
}

/// Scenario 2: a sequence with two items, the second one empty.
#[test]
fn sequence_with_two_items_test() {
  let seq_tag = Tag::new(0x0008, 0x9215);

  let mut bytes = Vec::new();
  push_long_header(&mut bytes, seq_tag.group, seq_tag.element, "SQ", 0xFFFF_FFFF);

  push_item_header(&mut bytes, 0xFFFF_FFFF);
  push_short_header(&mut bytes, 0x0008, 0x0020, "DA", 8);
  bytes.extend_from_slice(b"19700101");
  push_item_delimitation(&mut bytes);

  push_item_header(&mut bytes, 0);

  push_sequence_delimitation(&mut bytes);

  let parts = read_all_parts(bytes);

  assert!(matches!(parts[0], Part::Sequence { tag, length: None, .. } if tag == seq_tag));
  assert!(matches!(parts[1], Part::Item { index: 1, length: None }));
  assert!(matches!(parts[2], Part::Header { tag, .. } if tag == Tag::new(0x0008, 0x0020)));
  assert!(matches!(parts[3], Part::ValueChunk { last: true, .. }));
  assert!(matches!(parts[4], Part::ItemDelimitation { index: 1, marker: false }));
  assert!(matches!(parts[5], Part::Item { index: 2, length: Some(0) }));
  assert!(matches!(parts[6], Part::ItemDelimitation { index: 2, marker: false }));
  assert!(matches!(parts[7], Part::SequenceDelimitation { tag, marker: false } if tag == seq_tag));

  let mut builder = DatasetBuilder::new();
  for part in &parts {
    builder.add_part(part).unwrap();
  }
  let elements = builder.finish().unwrap();
  let items = elements.sequence(seq_tag).unwrap();
  assert_eq!(items.len(), 2);
  assert!(items[1].0.is_empty());
}

/// Scenario 3: same shape as scenario 2, but with determinate lengths;
/// after `SequenceLengthNormalizer` the sequence and its item come out
/// indeterminate-length, closed by synthetic delimitation parts.
#[test]
fn determinate_sequence_gets_normalized_test() {
  let seq_tag = Tag::new(0x0008, 0x9215);

  let mut bytes = Vec::new();
  push_long_header(&mut bytes, seq_tag.group, seq_tag.element, "SQ", 24);
  push_item_header(&mut bytes, 16);
  push_short_header(&mut bytes, 0x0008, 0x0020, "DA", 8);
  bytes.extend_from_slice(b"19700101");

  let parts = read_all_parts(bytes);

  assert!(matches!(parts[0], Part::Sequence { tag, length: Some(24), .. } if tag == seq_tag));
  assert!(matches!(parts[1], Part::Item { index: 1, length: Some(16) }));

  struct Collector;
  impl Flow for Collector {
    fn handle(&mut self, part: Part) -> Vec<Part> {
      vec![part]
    }
  }

  let mut normalizer = SequenceLengthNormalizer::new(Collector);
  let mut normalized = Vec::new();
  for part in parts {
    normalized.extend(normalizer.handle(part));
  }
  normalized.extend(normalizer.finish());

  let sequence_part = normalized.iter().find(|p| matches!(p, Part::Sequence { .. })).unwrap();
  assert!(matches!(sequence_part, Part::Sequence { length: None, .. }));

  let item_part = normalized.iter().find(|p| matches!(p, Part::Item { .. })).unwrap();
  assert!(matches!(item_part, Part::Item { length: None, .. }));

  assert!(normalized.iter().any(|p| matches!(p, Part::ItemDelimitation { marker: true, .. })));
  assert!(normalized.iter().any(|p| matches!(p, Part::SequenceDelimitation { marker: true, .. })));
}

/// Scenario 4: encapsulated pixel data with a Basic Offset Table and two
/// frames.
#[test]
fn encapsulated_pixel_data_with_offset_table_test() {
  let mut bytes = Vec::new();
  push_long_header(&mut bytes, 0x7FE0, 0x0010, "OW", 0xFFFF_FFFF);

  push_item_header(&mut bytes, 8);
  bytes.extend_from_slice(&0u32.to_le_bytes());
  bytes.extend_from_slice(&8u32.to_le_bytes());

  push_item_header(&mut bytes, 8);
  bytes.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);

  push_item_header(&mut bytes, 8);
  bytes.extend_from_slice(&[11, 12, 13, 14, 15, 16, 17, 18]);

  push_sequence_delimitation(&mut bytes);

  let parts = read_all_parts(bytes);
  assert!(matches!(parts[0], Part::Fragments { tag, .. } if tag == Tag::PIXEL_DATA));

  let mut builder = DatasetBuilder::new();
  for part in &parts {
    builder.add_part(part).unwrap();
  }
  let elements = builder.finish().unwrap();
  let fragments = elements.fragments(Tag::PIXEL_DATA).unwrap();

  assert_eq!(fragments.offset_table(), &[0, 8]);
  assert_eq!(fragments.fragments().len(), 2);

  let frames = fragments.frames();
  assert_eq!(frames.len(), 2);
  assert_eq!(&*frames[0], &[1, 2, 3, 4, 5, 6, 7, 8]);
  assert_eq!(&*frames[1], &[11, 12, 13, 14, 15, 16, 17, 18]);
}

/// Scenario 5: a tag path is tracked correctly through nested sequences.
#[test]
fn tag_path_tracked_through_nested_sequences_test() {
  use crate::core::vr::ValueRepresentation;
  use crate::p10::flow::behaviors::PathTracker;

  let outer_tag = Tag::new(0x0008, 0x1115);
  let inner_tag = Tag::new(0x0008, 0x1140);
  let leaf_tag = Tag::new(0x0008, 0x1150);

  let mut tracker = PathTracker::new();

  tracker.observe(&Part::Sequence { tag: outer_tag, vr: ValueRepresentation::Sequence, length: None });
  assert_eq!(tracker.path().to_string(), "00081115");

  tracker.observe(&Part::Item { index: 0, length: None });
  assert_eq!(tracker.path().to_string(), "00081115/[0]");

  tracker.observe(&Part::Sequence { tag: inner_tag, vr: ValueRepresentation::Sequence, length: Some(24) });
  assert_eq!(tracker.path().to_string(), "00081115/[0]/00081140");

  tracker.observe(&Part::Item { index: 0, length: Some(16) });
  assert_eq!(tracker.path().to_string(), "00081115/[0]/00081140/[0]");

  tracker.observe(&Part::Header { tag: leaf_tag, vr: ValueRepresentation::UniqueIdentifier, length: Some(0) });
  assert_eq!(tracker.path().to_string(), "00081115/[0]/00081140/[0]/00081150");

  tracker.observe(&Part::ValueChunk { bytes: SharedBytes::empty(), last: true });
  tracker.observe(&Part::ItemDelimitation { index: 0, marker: true });
  assert_eq!(tracker.path().to_string(), "00081115/[0]/00081140");

  tracker.observe(&Part::SequenceDelimitation { tag: inner_tag, marker: true });
  assert_eq!(tracker.path().to_string(), "00081115/[0]");

  tracker.observe(&Part::ItemDelimitation { index: 0, marker: true });
  assert_eq!(tracker.path().to_string(), "00081115");

  tracker.observe(&Part::SequenceDelimitation { tag: outer_tag, marker: true });
  assert!(tracker.path().is_root());
}

/// Scenario 6: a deflated transfer syntax round-trips through the reader
/// and the `DeflateFlow` transform.
#[test]
fn deflated_transfer_syntax_round_trips_test() {
  use crate::core::transfer_syntax::TransferSyntax;
  use crate::core::vr::ValueRepresentation;

  let mut dataset_bytes = Vec::new();
  push_short_header(&mut dataset_bytes, 0x0010, 0x0010, "PN", 8);
  dataset_bytes.extend_from_slice(b"John^Doe");

  let mut compress = flate2::Compress::new(flate2::Compression::new(6), false);
  let mut deflated = vec![0u8; dataset_bytes.len() * 2 + 64];
  let status = compress.compress(&dataset_bytes, &mut deflated, flate2::FlushCompress::Finish).unwrap();
  assert_eq!(status, flate2::Status::StreamEnd);
  deflated.truncate(compress.total_out() as usize);

  let ts_uid = "1.2.840.10008.1.2.1.99";
  let mut bytes = Vec::new();
  push_short_header(&mut bytes, 0x0002, 0x0000, "UL", 4);
  bytes.extend_from_slice(&((8 + ts_uid.len() + 1) as u32).to_le_bytes());
  push_short_header(&mut bytes, 0x0002, 0x0010, "UI", (ts_uid.len() + 1) as u16);
  bytes.extend_from_slice(ts_uid.as_bytes());
  bytes.push(0);
  bytes.extend_from_slice(&deflated);

  let parts = read_all_parts(bytes);

  let value_bytes: Vec<u8> = parts
    .iter()
    .skip_while(|p| !matches!(p, Part::Header { tag, .. } if *tag == Tag::new(0x0010, 0x0010)))
    .skip(1)
    .take_while(|p| matches!(p, Part::ValueChunk { .. }))
    .flat_map(|p| match p {
      Part::ValueChunk { bytes, .. } => bytes.to_vec(),
      _ => vec![],
    })
    .collect();
  assert_eq!(value_bytes, b"John^Doe");

  struct Collector(Vec<u8>);
  impl Flow for Collector {
    fn handle(&mut self, part: Part) -> Vec<Part> {
      if let Part::DeflatedChunk { bytes } = &part {
        self.0.extend_from_slice(bytes);
      }
      vec![part]
    }
  }

  let mut flow = DeflateFlow::new(Collector(Vec::new()), 6);
  let mut writer = Writer::new(&TransferSyntax::DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN, WriteConfig::default());

  let header_part = Part::Header { tag: Tag::new(0x0010, 0x0010), vr: ValueRepresentation::PersonName, length: Some(8) };
  let value_part = Part::ValueChunk { bytes: SharedBytes::from_vec(b"John^Doe".to_vec()), last: true };

  for part in [header_part, value_part] {
    for produced in flow.handle(part) {
      writer.write_part(&produced).unwrap();
    }
  }
  for produced in flow.finish() {
    writer.write_part(&produced).unwrap();
  }
}

/// The validator accepts a well-formed preamble/prefix pair and rejects a
/// stream missing the `"DICM"` prefix.
#[test]
fn validator_accepts_and_rejects_leading_bytes_test() {
  let mut validator = Validator::new(false);
  assert_eq!(validator.write_bytes(&preamble_and_prefix()), Ok(true));

  let mut bad_validator = Validator::new(false);
  let mut bad_bytes = vec![0u8; 128];
  bad_bytes.extend_from_slice(b"NOPE");
  assert!(bad_validator.write_bytes(&bad_bytes).is_err());
}
