//! An immutable, array-based path identifying a location within a DICOM data
//! set: a plain tag, or a nested position inside one or more sequences and
//! items, including the transient "end" positions visited when a sequence
//! or item closes.

use crate::dictionary;
use crate::tag::Tag;

/// A single step in a [`TagPath`].
///
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum TagPathNode {
  /// A plain data element at the current position.
  Tag(Tag),

  /// Inside the sequence identified by `tag`, not yet inside a specific
  /// item.
  Sequence(Tag),

  /// The closing boundary of the sequence identified by `tag`. This node
  /// only ever appears as the final, transient node of a path handed to a
  /// `SequenceDelimiter`/`SequenceEnd` event; it is never left on the
  /// persistent path stack.
  SequenceEnd(Tag),

  /// Inside the item at `index` (0-based) of the nearest enclosing
  /// sequence.
  Item(usize),

  /// The closing boundary of the item at `index`. As with `SequenceEnd`,
  /// only ever the final, transient node of a path handed to an
  /// `ItemDelimiter`/`ItemEnd` event.
  ItemEnd(usize),
}

impl std::fmt::Display for TagPathNode {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    match self {
      Self::Tag(tag) => write!(f, "{tag}"),
      Self::Sequence(tag) => write!(f, "{tag}"),
      Self::SequenceEnd(tag) => write!(f, "{tag}/end"),
      Self::Item(index) => write!(f, "[{index}]"),
      Self::ItemEnd(index) => write!(f, "[{index}]/end"),
    }
  }
}

/// An immutable path into a DICOM data set, made up of a sequence of
/// [`TagPathNode`]s. The empty path (`TagPath::new()`) identifies the root
/// data set itself, matching the "EmptyTagPath" case described in the data
/// model.
///
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct TagPath(Vec<TagPathNode>);

impl TagPath {
  /// Creates a new, empty tag path identifying the root data set.
  ///
  pub fn new() -> Self {
    Self(Vec::new())
  }

  /// Returns the path's nodes.
  ///
  pub fn nodes(&self) -> &[TagPathNode] {
    &self.0
  }

  /// Returns whether this path is empty, i.e. identifies the root data set
  /// with no active sequence or item nesting.
  ///
  pub fn is_root(&self) -> bool {
    self.0.is_empty()
  }

  /// Returns the number of nodes on this path.
  ///
  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// The number of nodes on this path. An alias for [`Self::len`] matching
  /// the depth terminology used by [`Self::take`]/[`Self::drop`].
  ///
  pub fn depth(&self) -> usize {
    self.0.len()
  }

  /// Returns the path truncated to its first `n` nodes (the `n` outermost
  /// steps), or the whole path if `n >= self.depth()`.
  ///
  pub fn take(&self, n: usize) -> Self {
    let n = n.min(self.0.len());
    Self(self.0[..n].to_vec())
  }

  /// Returns the path with its first `n` nodes (the `n` outermost steps)
  /// removed, or the empty path if `n >= self.depth()`.
  ///
  pub fn drop(&self, n: usize) -> Self {
    let n = n.min(self.0.len());
    Self(self.0[n..].to_vec())
  }

  /// Returns whether this path is a prefix of `other`, i.e. `other`
  /// identifies the same location or a location nested underneath this
  /// one. Every path is a prefix of itself.
  ///
  pub fn is_prefix_of(&self, other: &Self) -> bool {
    self.0.len() <= other.0.len() && self.0 == other.0[..self.0.len()]
  }

  /// Returns a new path with `tag` appended as a leaf [`TagPathNode::Tag`].
  ///
  pub fn with_tag(&self, tag: Tag) -> Self {
    let mut nodes = self.0.clone();
    nodes.push(TagPathNode::Tag(tag));
    Self(nodes)
  }

  /// Returns a new path with `tag` pushed as a [`TagPathNode::Sequence`],
  /// descending into that sequence.
  ///
  pub fn with_sequence(&self, tag: Tag) -> Self {
    let mut nodes = self.0.clone();
    nodes.push(TagPathNode::Sequence(tag));
    Self(nodes)
  }

  /// Returns a new path with `index` pushed as a [`TagPathNode::Item`],
  /// descending into that item of the nearest enclosing sequence.
  ///
  pub fn with_item(&self, index: usize) -> Self {
    let mut nodes = self.0.clone();
    nodes.push(TagPathNode::Item(index));
    Self(nodes)
  }

  /// Returns the transient path visited when the sequence at the top of
  /// this path closes: the parent path with its final `Sequence` node
  /// replaced by a `SequenceEnd` node of the same tag.
  ///
  /// Returns `None` if this path's final node is not a `Sequence`.
  ///
  pub fn sequence_end(&self) -> Option<Self> {
    match self.0.last() {
      Some(TagPathNode::Sequence(tag)) => {
        let mut nodes = self.0.clone();
        *nodes.last_mut().unwrap() = TagPathNode::SequenceEnd(*tag);
        Some(Self(nodes))
      }
      _ => None,
    }
  }

  /// Returns the transient path visited when the item at the top of this
  /// path closes: the parent path with its final `Item` node replaced by
  /// an `ItemEnd` node of the same index.
  ///
  /// Returns `None` if this path's final node is not an `Item`.
  ///
  pub fn item_end(&self) -> Option<Self> {
    match self.0.last() {
      Some(TagPathNode::Item(index)) => {
        let mut nodes = self.0.clone();
        *nodes.last_mut().unwrap() = TagPathNode::ItemEnd(*index);
        Some(Self(nodes))
      }
      _ => None,
    }
  }

  /// Returns the path with its final node removed, i.e. the path one level
  /// up from this one.
  ///
  /// Returns an error if this path is already the root path.
  ///
  pub fn pop(&self) -> Result<Self, String> {
    if self.0.is_empty() {
      return Err("Can't pop the root tag path".to_string());
    }

    let mut nodes = self.0.clone();
    nodes.pop();
    Ok(Self(nodes))
  }

  /// Returns the tag of the final `Tag` node on this path, if the path ends
  /// with a plain data element.
  ///
  pub fn final_tag(&self) -> Option<Tag> {
    match self.0.last() {
      Some(TagPathNode::Tag(tag)) => Some(*tag),
      _ => None,
    }
  }

  /// Returns the tag of the innermost currently-open sequence, if any.
  ///
  pub fn innermost_sequence_tag(&self) -> Option<Tag> {
    self.0.iter().rev().find_map(|node| match node {
      TagPathNode::Sequence(tag) => Some(*tag),
      _ => None,
    })
  }

  /// Parses a tag path from its string form, e.g.
  /// `"00081115/[0]/00080100"`.
  ///
  pub fn from_string(s: &str) -> Result<Self, String> {
    let mut path = TagPath::new();

    if s.is_empty() {
      return Ok(path);
    }

    for part in s.split('/') {
      if let Some(index_str) = part.strip_prefix('[').and_then(|p| p.strip_suffix(']')) {
        let index: usize = index_str
          .parse()
          .map_err(|_| format!("Invalid item index: '{part}'"))?;
        path = path.with_item(index);
      } else {
        let tag = Tag::from_hex_string(part)
          .map_err(|_| format!("Invalid tag: '{part}'"))?;
        path = path.with_tag(tag);
      }
    }

    Ok(path)
  }

  /// Converts this path to a human-readable string that includes each
  /// tag's dictionary name, e.g. `"(0008,1115) [0] (0008,0100) TargetSOPClassUID"`.
  ///
  pub fn to_detailed_string(&self) -> String {
    self
      .0
      .iter()
      .map(|node| match node {
        TagPathNode::Tag(tag) | TagPathNode::Sequence(tag) => {
          format!("{} {}", tag, dictionary::tag_name(*tag))
        }
        TagPathNode::SequenceEnd(tag) => {
          format!("{} {} (end)", tag, dictionary::tag_name(*tag))
        }
        TagPathNode::Item(index) => format!("[{index}]"),
        TagPathNode::ItemEnd(index) => format!("[{index}] (end)"),
      })
      .collect::<Vec<_>>()
      .join("/")
  }
}

impl std::fmt::Display for TagPath {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    let s = self
      .0
      .iter()
      .map(|node| match node {
        TagPathNode::Tag(tag) | TagPathNode::Sequence(tag) => tag.to_hex_string(),
        TagPathNode::SequenceEnd(tag) => format!("{}/end", tag.to_hex_string()),
        TagPathNode::Item(index) => format!("[{index}]"),
        TagPathNode::ItemEnd(index) => format!("[{index}]/end"),
      })
      .collect::<Vec<_>>()
      .join("/");

    write!(f, "{s}")
  }
}
