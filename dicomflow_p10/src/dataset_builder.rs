//! Folds a stream of [`Part`]s into an in-memory [`Elements`] tree.
//!
//! Maintains a stack of builder locations (the root data set, an open
//! sequence, an open sequence item, or an open encapsulated fragments
//! value) plus a single in-progress element whose value bytes haven't all
//! arrived yet. Grounded on the `BuilderLocation`/`PendingDataElement`
//! pattern used by the teacher's own token-based data set builder.

use dicomflow_core::bytes::SharedBytes;
use dicomflow_core::dataset::{Elements, ElementSet, Fragments, Item};
use dicomflow_core::tag::Tag;
use dicomflow_core::value::Value;
use dicomflow_core::vr::ValueRepresentation;

use crate::part::Part;

/// An error raised when a part arrives in a position the aggregator can't
/// make sense of, e.g. a bare `ValueChunk` with no preceding `Header`.
///
#[derive(Clone, Debug, PartialEq)]
pub struct BuilderError {
  pub details: String,
}

#[derive(Debug)]
enum Location {
  Root { elements: Elements },
  Item { elements: Elements },
  Sequence { tag: Tag, items: Vec<Item> },
  Fragments { tag: Tag, fragments: Fragments },
}

struct Pending {
  tag: Tag,
  vr: ValueRepresentation,
  bytes: Vec<u8>,
}

/// Builds an [`Elements`] tree incrementally from a part stream.
///
pub struct DatasetBuilder {
  preamble: Option<SharedBytes>,
  file_meta_information: Elements,
  location: Vec<Location>,
  pending: Option<Pending>,
  pending_fragment: Option<Vec<u8>>,
  is_complete: bool,
}

impl Default for DatasetBuilder {
  fn default() -> Self {
    Self::new()
  }
}

impl DatasetBuilder {
  pub fn new() -> Self {
    Self {
      preamble: None,
      file_meta_information: Elements::new(),
      location: vec![Location::Root { elements: Elements::new() }],
      pending: None,
      pending_fragment: None,
      is_complete: false,
    }
  }

  pub fn is_complete(&self) -> bool {
    self.is_complete
  }

  fn current_elements_mut(&mut self) -> Result<&mut Elements, BuilderError> {
    match self.location.last_mut() {
      Some(Location::Root { elements }) | Some(Location::Item { elements }) => Ok(elements),
      _ => Err(BuilderError { details: "No open data set or item to insert into".to_string() }),
    }
  }

  fn insert(&mut self, tag: Tag, element_set: ElementSet) -> Result<(), BuilderError> {
    if tag.group == 0x0002 {
      self.file_meta_information.insert(tag, element_set);
      return Ok(());
    }

    self.current_elements_mut()?.insert(tag, element_set);
    Ok(())
  }

  /// Feeds a single part into the builder.
  ///
  pub fn add_part(&mut self, part: &Part) -> Result<(), BuilderError> {
    match part {
      Part::Preamble { bytes } => {
        self.preamble = Some(bytes.clone());
        Ok(())
      }

      Part::Header { tag, vr, .. } => {
        self.pending = Some(Pending { tag: *tag, vr: *vr, bytes: Vec::new() });
        Ok(())
      }

      Part::ValueChunk { bytes, last } => {
        if let Some(fragment) = self.pending_fragment.as_mut() {
          fragment.extend_from_slice(bytes);

          if *last {
            let bytes = SharedBytes::from_vec(self.pending_fragment.take().unwrap());
            match self.location.last_mut() {
              Some(Location::Fragments { fragments, .. }) => fragments.push_fragment(bytes),
              _ => return Err(BuilderError { details: "ValueChunk inside fragments with no open fragments".to_string() }),
            }
          }

          return Ok(());
        }

        let pending = self.pending.as_mut().ok_or_else(|| BuilderError { details: "ValueChunk with no preceding Header".to_string() })?;
        pending.bytes.extend_from_slice(bytes);

        if *last {
          let Pending { tag, vr, bytes } = self.pending.take().unwrap();
          self.insert(tag, ElementSet::Value(Value::from_bytes(vr, bytes)))?;
        }

        Ok(())
      }

      Part::Sequence { tag, .. } => {
        self.location.push(Location::Sequence { tag: *tag, items: Vec::new() });
        Ok(())
      }

      Part::Item { .. } => match self.location.last() {
        Some(Location::Sequence { .. }) => {
          self.location.push(Location::Item { elements: Elements::new() });
          Ok(())
        }
        Some(Location::Fragments { .. }) => {
          self.pending_fragment = Some(Vec::new());
          Ok(())
        }
        _ => Err(BuilderError { details: "Item with no open sequence or fragments".to_string() }),
      },

      Part::ItemDelimitation { .. } => match self.location.pop() {
        Some(Location::Item { elements }) => match self.location.last_mut() {
          Some(Location::Sequence { items, .. }) => {
            items.push(Item(elements));
            Ok(())
          }
          _ => Err(BuilderError { details: "ItemDelimitation with no enclosing sequence".to_string() }),
        },
        other => {
          if let Some(location) = other {
            self.location.push(location);
          }
          Err(BuilderError { details: "ItemDelimitation with no open item".to_string() })
        }
      },

      Part::SequenceDelimitation { .. } => match self.location.pop() {
        Some(Location::Sequence { tag, items }) => self.insert(tag, ElementSet::Sequence(items)),
        Some(Location::Fragments { tag, fragments }) => self.insert(tag, ElementSet::Fragments(fragments)),
        other => {
          if let Some(location) = other {
            self.location.push(location);
          }
          Err(BuilderError { details: "SequenceDelimitation with no open sequence or fragments".to_string() })
        }
      },

      Part::Fragments { tag, vr } => {
        self.location.push(Location::Fragments { tag: *tag, fragments: Fragments::new(*vr) });
        Ok(())
      }

      Part::DeflatedChunk { .. } | Part::Unknown { .. } => Ok(()),
    }
  }

  /// Marks the builder complete and returns the final, merged `Elements`
  /// tree (File Meta Information folded into the main data set).
  ///
  pub fn finish(mut self) -> Result<Elements, BuilderError> {
    if self.location.len() != 1 {
      return Err(BuilderError { details: "Part stream ended with an open sequence, item, or fragments".to_string() });
    }

    self.is_complete = true;

    let mut elements = match self.location.pop() {
      Some(Location::Root { elements }) => elements,
      _ => return Err(BuilderError { details: "Part stream did not end at the root data set".to_string() }),
    };

    elements.merge(self.file_meta_information);
    Ok(elements)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use dicomflow_core::tag::Tag;

  #[test]
  fn builds_flat_value_element_test() {
    let mut builder = DatasetBuilder::new();
    let tag = Tag::new(0x0010, 0x0010);

    builder.add_part(&Part::Header { tag, vr: ValueRepresentation::PersonName, length: Some(4) }).unwrap();
    builder.add_part(&Part::ValueChunk { bytes: SharedBytes::from_vec(b"Doe\0".to_vec()), last: true }).unwrap();

    let elements = builder.finish().unwrap();
    assert_eq!(elements.value(tag).unwrap().string().unwrap(), "Doe");
  }

  #[test]
  fn builds_nested_sequence_test() {
    let mut builder = DatasetBuilder::new();
    let seq_tag = Tag::new(0x0008, 0x1115);
    let child_tag = Tag::new(0x0008, 0x1150);

    builder.add_part(&Part::Sequence { tag: seq_tag, vr: ValueRepresentation::Sequence, length: None }).unwrap();
    builder.add_part(&Part::Item { index: 0, length: None }).unwrap();
    builder.add_part(&Part::Header { tag: child_tag, vr: ValueRepresentation::UniqueIdentifier, length: Some(0) }).unwrap();
    builder.add_part(&Part::ValueChunk { bytes: SharedBytes::empty(), last: true }).unwrap();
    builder.add_part(&Part::ItemDelimitation { index: 0, marker: true }).unwrap();
    builder.add_part(&Part::SequenceDelimitation { tag: seq_tag, marker: true }).unwrap();

    let elements = builder.finish().unwrap();
    let items = elements.sequence(seq_tag).unwrap();
    assert_eq!(items.len(), 1);
    assert!(items[0].0.get(child_tag).is_some());
  }

  #[test]
  fn builds_fragments_test() {
    let mut builder = DatasetBuilder::new();
    let tag = Tag::PIXEL_DATA;

    builder.add_part(&Part::Fragments { tag, vr: ValueRepresentation::OtherByteString }).unwrap();
    builder.add_part(&Part::Item { index: 0, length: Some(0) }).unwrap();
    builder.add_part(&Part::ValueChunk { bytes: SharedBytes::empty(), last: true }).unwrap();
    builder.add_part(&Part::Item { index: 1, length: Some(4) }).unwrap();
    builder.add_part(&Part::ValueChunk { bytes: SharedBytes::from_vec(vec![1, 2, 3, 4]), last: true }).unwrap();
    builder.add_part(&Part::SequenceDelimitation { tag, marker: false }).unwrap();

    let elements = builder.finish().unwrap();
    let fragments = elements.fragments(tag).unwrap();
    assert_eq!(fragments.fragments().len(), 1);
  }

  #[test]
  fn fmi_folds_into_main_dataset_test() {
    let mut builder = DatasetBuilder::new();
    let ts_tag = Tag::new(0x0002, 0x0010);

    builder.add_part(&Part::Header { tag: ts_tag, vr: ValueRepresentation::UniqueIdentifier, length: Some(18) }).unwrap();
    builder
      .add_part(&Part::ValueChunk { bytes: SharedBytes::from_vec(b"1.2.840.10008.1.2\0".to_vec()), last: true })
      .unwrap();

    let elements = builder.finish().unwrap();
    assert!(elements.value(ts_tag).is_ok());
  }
}
