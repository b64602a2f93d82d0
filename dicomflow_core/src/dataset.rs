//! [`Elements`]: the immutable tree produced by folding a stream of
//! [`crate::element::Element`]s into a complete DICOM data set, plus the
//! types it's built from ([`Item`], [`Fragments`], [`ElementSet`]).

use std::collections::BTreeMap;

use crate::bytes::SharedBytes;
use crate::data_error::DataError;
use crate::tag::Tag;
use crate::tag_path::TagPath;
use crate::value::Value;
use crate::vr::ValueRepresentation;

/// A single item of a sequence: a nested data set.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Item(pub Elements);

/// The fragmented, encapsulated value of a `PixelData`/`WaveformData`
/// element read with indeterminate length: a sequence of raw byte
/// fragments, the first of which may be a Basic Offset Table giving the
/// byte offset of each frame within the concatenation of the remaining
/// fragments.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Fragments {
  vr: ValueRepresentation,
  offset_table: Vec<u32>,
  fragments: Vec<SharedBytes>,
}

impl Fragments {
  /// Creates a new, empty fragments value for the given VR (`OB` or `OW`).
  ///
  pub fn new(vr: ValueRepresentation) -> Self {
    Self { vr, offset_table: Vec::new(), fragments: Vec::new() }
  }

  pub fn vr(&self) -> ValueRepresentation {
    self.vr
  }

  /// Appends a fragment. The first fragment appended is interpreted as the
  /// Basic Offset Table if its length is a multiple of 4 and non-zero;
  /// pass an empty first fragment if there is no offset table.
  ///
  pub fn push_fragment(&mut self, bytes: SharedBytes) {
    if self.fragments.is_empty() && self.offset_table.is_empty() && !bytes.is_empty() {
      self.offset_table = bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes(chunk.try_into().unwrap()))
        .collect();
      return;
    }

    self.fragments.push(bytes);
  }

  /// Returns the raw fragment byte buffers, excluding the offset table.
  ///
  pub fn fragments(&self) -> &[SharedBytes] {
    &self.fragments
  }

  /// Returns the Basic Offset Table, if one was present.
  ///
  pub fn offset_table(&self) -> &[u32] {
    &self.offset_table
  }

  /// Returns the concatenation of all fragment bytes.
  ///
  pub fn concatenated(&self) -> SharedBytes {
    SharedBytes::concat(self.fragments.iter())
  }

  /// Splits the concatenated fragment data into per-frame byte buffers
  /// using the Basic Offset Table. If no offset table is present, each
  /// fragment is assumed to be exactly one frame.
  ///
  pub fn frames(&self) -> Vec<SharedBytes> {
    if self.offset_table.len() <= 1 {
      return self.fragments.clone();
    }

    let concatenated = self.concatenated();
    let mut boundaries: Vec<usize> =
      self.offset_table.iter().map(|o| *o as usize).collect();
    boundaries.push(concatenated.len());

    boundaries
      .windows(2)
      .map(|w| concatenated.slice(w[0], w[1]))
      .collect()
  }
}

/// The value stored against a tag in an assembled [`Elements`] tree: either
/// a plain value, a sequence of nested items, or an encapsulated fragments
/// value. This is a strict subset of [`crate::element::Element`]'s cases:
/// the transient item/sequence delimiter events don't appear here because
/// by the time a data set is assembled, those boundaries are represented
/// structurally instead.
///
#[derive(Clone, Debug, PartialEq)]
pub enum ElementSet {
  Value(Value),
  Sequence(Vec<Item>),
  Fragments(Fragments),
}

/// A complete, or partially-built, DICOM data set: an immutable map from
/// tag to [`ElementSet`], plus the decoding state (active character sets,
/// timezone offset) needed to correctly interpret string and date/time
/// values found within it.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Elements {
  data: BTreeMap<Tag, ElementSet>,
  character_sets: Vec<String>,
  zone_offset_minutes: Option<i32>,
}

impl Elements {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  /// Inserts or replaces the element set stored at `tag`.
  ///
  pub fn insert(&mut self, tag: Tag, element_set: ElementSet) {
    if tag == Tag::SPECIFIC_CHARACTER_SET {
      if let ElementSet::Value(value) = &element_set {
        self.character_sets = value.strings().unwrap_or_default();
      }
    }

    if tag == Tag::TIMEZONE_OFFSET_FROM_UTC {
      if let ElementSet::Value(value) = &element_set {
        if let Ok(s) = value.string() {
          self.zone_offset_minutes = parse_timezone_offset(&s);
        }
      }
    }

    self.data.insert(tag, element_set);
  }

  pub fn get(&self, tag: Tag) -> Option<&ElementSet> {
    self.data.get(&tag)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&Tag, &ElementSet)> {
    self.data.iter()
  }

  /// Returns the currently active specific character sets, as set by the
  /// most recently inserted `(0008,0005) SpecificCharacterSet` element.
  ///
  pub fn character_sets(&self) -> &[String] {
    &self.character_sets
  }

  /// Returns the active timezone offset from UTC, in minutes, as set by the
  /// most recently inserted `(0008,0201) TimezoneOffsetFromUTC` element.
  ///
  pub fn zone_offset_minutes(&self) -> Option<i32> {
    self.zone_offset_minutes
  }

  /// Returns the plain value stored at `tag`.
  ///
  pub fn value(&self, tag: Tag) -> Result<&Value, DataError> {
    match self.data.get(&tag) {
      Some(ElementSet::Value(value)) => Ok(value),
      Some(_) => Err(DataError::new_value_not_present()
        .with_path(&TagPath::new().with_tag(tag))),
      None => Err(DataError::new_tag_not_present()
        .with_path(&TagPath::new().with_tag(tag))),
    }
  }

  /// Returns the sequence items stored at `tag`.
  ///
  pub fn sequence(&self, tag: Tag) -> Result<&[Item], DataError> {
    match self.data.get(&tag) {
      Some(ElementSet::Sequence(items)) => Ok(items),
      Some(_) => Err(DataError::new_value_not_present()
        .with_path(&TagPath::new().with_tag(tag))),
      None => Err(DataError::new_tag_not_present()
        .with_path(&TagPath::new().with_tag(tag))),
    }
  }

  /// Returns the encapsulated fragments value stored at `tag`.
  ///
  pub fn fragments(&self, tag: Tag) -> Result<&Fragments, DataError> {
    match self.data.get(&tag) {
      Some(ElementSet::Fragments(fragments)) => Ok(fragments),
      Some(_) => Err(DataError::new_value_not_present()
        .with_path(&TagPath::new().with_tag(tag))),
      None => Err(DataError::new_tag_not_present()
        .with_path(&TagPath::new().with_tag(tag))),
    }
  }

  /// Merges `other`'s elements into this data set, used to fold the File
  /// Meta Information data set back into the main data set after reading.
  /// On conflict, `other`'s elements win.
  ///
  pub fn merge(&mut self, other: Elements) {
    for (tag, element_set) in other.data {
      self.insert(tag, element_set);
    }
  }
}

fn parse_timezone_offset(s: &str) -> Option<i32> {
  let s = s.trim();
  if s.len() != 5 {
    return None;
  }

  let sign = match &s[0..1] {
    "+" => 1,
    "-" => -1,
    _ => return None,
  };

  let hours: i32 = s[1..3].parse().ok()?;
  let minutes: i32 = s[3..5].parse().ok()?;

  Some(sign * (hours * 60 + minutes))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::vr::ValueRepresentation;

  #[test]
  fn insert_and_get_value_test() {
    let mut elements = Elements::new();
    let tag = Tag::new(0x0010, 0x0010);
    elements.insert(
      tag,
      ElementSet::Value(Value::from_bytes(ValueRepresentation::PersonName, b"Doe^Jane".to_vec())),
    );

    assert_eq!(elements.value(tag).unwrap().string().unwrap(), "Doe^Jane");
  }

  #[test]
  fn character_set_tracking_test() {
    let mut elements = Elements::new();
    elements.insert(
      Tag::SPECIFIC_CHARACTER_SET,
      ElementSet::Value(Value::from_bytes(
        ValueRepresentation::CodeString,
        b"ISO_IR 192".to_vec(),
      )),
    );

    assert_eq!(elements.character_sets(), &["ISO_IR 192".to_string()]);
  }

  #[test]
  fn zone_offset_tracking_test() {
    let mut elements = Elements::new();
    elements.insert(
      Tag::TIMEZONE_OFFSET_FROM_UTC,
      ElementSet::Value(Value::from_bytes(ValueRepresentation::ShortString, b"-0500".to_vec())),
    );

    assert_eq!(elements.zone_offset_minutes(), Some(-300));
  }

  #[test]
  fn fragments_frames_with_offset_table_test() {
    let mut fragments = Fragments::new(ValueRepresentation::OtherByteString);

    let mut offset_table_bytes = Vec::new();
    offset_table_bytes.extend_from_slice(&0u32.to_le_bytes());
    offset_table_bytes.extend_from_slice(&4u32.to_le_bytes());
    fragments.push_fragment(SharedBytes::from_vec(offset_table_bytes));

    fragments.push_fragment(SharedBytes::from_vec(vec![1, 2, 3, 4]));
    fragments.push_fragment(SharedBytes::from_vec(vec![5, 6, 7, 8]));

    let frames = fragments.frames();
    assert_eq!(frames.len(), 2);
    assert_eq!(&*frames[0], &[1, 2, 3, 4]);
    assert_eq!(&*frames[1], &[5, 6, 7, 8]);
  }

  #[test]
  fn fragments_frames_without_offset_table_test() {
    let mut fragments = Fragments::new(ValueRepresentation::OtherByteString);
    fragments.push_fragment(SharedBytes::from_vec(vec![]));
    fragments.push_fragment(SharedBytes::from_vec(vec![1, 2]));
    fragments.push_fragment(SharedBytes::from_vec(vec![3, 4]));

    let frames = fragments.frames();
    assert_eq!(frames.len(), 2);
  }
}
