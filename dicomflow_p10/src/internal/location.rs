//! Tracks the reader's position in the hierarchy of sequences and items,
//! including the byte offset at which each determinate-length construct
//! ends, so that delimiter parts can be synthesized for it just as they
//! would be read for an indeterminate-length one.

use dicomflow_core::tag::Tag;

#[derive(Debug)]
pub struct Location {
  entries: Vec<Entry>,
}

#[derive(Debug)]
enum Entry {
  Root { last_tag: Tag },
  Sequence { tag: Tag, ends_at: Option<u64>, item_count: usize },
  Item { last_tag: Tag, ends_at: Option<u64>, index: usize },
}

impl Location {
  pub fn new() -> Self {
    Self { entries: vec![Entry::Root { last_tag: Tag::ZERO }] }
  }

  /// Checks that `tag` is greater than the last tag seen at the current
  /// root/item level; sequences don't enforce ordering on their own tag.
  ///
  pub fn check_data_element_ordering(&mut self, tag: Tag) -> bool {
    match self.entries.last_mut() {
      Some(Entry::Root { last_tag }) | Some(Entry::Item { last_tag, .. }) => {
        if tag > *last_tag {
          *last_tag = tag;
          true
        } else {
          false
        }
      }
      _ => true,
    }
  }

  pub fn add_sequence(&mut self, tag: Tag, ends_at: Option<u64>) {
    self.entries.push(Entry::Sequence { tag, ends_at, item_count: 0 });
  }

  pub fn end_sequence(&mut self) -> Option<Tag> {
    match self.entries.last() {
      Some(Entry::Sequence { tag, .. }) => {
        let tag = *tag;
        self.entries.pop();
        Some(tag)
      }
      _ => None,
    }
  }

  /// Adds a new item to the innermost sequence, returning its 1-based
  /// index within that sequence.
  ///
  pub fn add_item(&mut self, ends_at: Option<u64>) -> Option<usize> {
    match self.entries.last_mut() {
      Some(Entry::Sequence { item_count, .. }) => {
        *item_count += 1;
        let index = *item_count;
        self.entries.push(Entry::Item { last_tag: Tag::ZERO, ends_at, index });
        Some(index)
      }
      _ => None,
    }
  }

  /// Closes the innermost item, returning its 1-based index, or `None` if
  /// there was no open item to close.
  ///
  pub fn end_item(&mut self) -> Option<usize> {
    match self.entries.last() {
      Some(Entry::Item { index, .. }) => {
        let index = *index;
        self.entries.pop();
        Some(index)
      }
      _ => None,
    }
  }

  pub fn sequence_depth(&self) -> usize {
    self.entries.iter().filter(|e| matches!(e, Entry::Sequence { .. })).count()
  }

  /// Returns the innermost delimiter that should fire given how many bytes
  /// have now been read, popping it off the location stack.
  ///
  pub fn next_delimiter(&mut self, bytes_read: u64) -> Option<Delimiter> {
    match self.entries.last() {
      Some(Entry::Sequence { tag, ends_at: Some(ends_at), .. }) if *ends_at <= bytes_read => {
        let tag = *tag;
        self.entries.pop();
        Some(Delimiter::Sequence { tag })
      }
      Some(Entry::Item { ends_at: Some(ends_at), index, .. }) if *ends_at <= bytes_read => {
        let index = *index;
        self.entries.pop();
        Some(Delimiter::Item { index })
      }
      _ => None,
    }
  }

  /// Returns the full list of still-open delimiters, innermost first,
  /// regardless of byte offset. Used to flush pending delimiters when the
  /// stream ends early.
  ///
  pub fn pending_delimiters(&self) -> Vec<Delimiter> {
    self
      .entries
      .iter()
      .rev()
      .filter_map(|e| match e {
        Entry::Sequence { tag, .. } => Some(Delimiter::Sequence { tag: *tag }),
        Entry::Item { index, .. } => Some(Delimiter::Item { index: *index }),
        Entry::Root { .. } => None,
      })
      .collect()
  }
}

impl Default for Location {
  fn default() -> Self {
    Self::new()
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delimiter {
  Sequence { tag: Tag },
  Item { index: usize },
}
