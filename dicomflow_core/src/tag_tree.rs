//! A tree of [`TagPath`] patterns used to match one or more locations within
//! a data set, e.g. for building whitelist/blacklist predicates that should
//! apply inside every item of a sequence rather than just a single one.

use crate::tag::Tag;
use crate::tag_path::{TagPath, TagPathNode};

/// A single step in a [`TagTree`] pattern. Unlike [`TagPathNode`], an item
/// step may match either a specific index or any index via [`Self::AnyItem`].
///
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum TagTreeNode {
  Tag(Tag),
  Sequence(Tag),
  Item(usize),
  AnyItem,
}

/// A tree of tag path patterns. Each path added to the tree shares any
/// common prefix with paths already present, so a tree compactly represents
/// many related patterns, e.g. every occurrence of a private tag nested
/// inside any item of a given sequence.
///
#[derive(Clone, Debug, Default)]
pub struct TagTree {
  children: Vec<(TagTreeNode, TagTree)>,
  is_terminal: bool,
}

impl TagTree {
  /// Creates a new, empty tag tree.
  ///
  pub fn new() -> Self {
    Self { children: Vec::new(), is_terminal: false }
  }

  /// Adds a pattern, expressed as a sequence of [`TagTreeNode`]s, to the
  /// tree.
  ///
  pub fn add_path(&mut self, nodes: &[TagTreeNode]) {
    match nodes.split_first() {
      None => self.is_terminal = true,
      Some((head, rest)) => {
        let child = match self.children.iter_mut().find(|(n, _)| n == head) {
          Some((_, child)) => child,
          None => {
            self.children.push((*head, TagTree::new()));
            &mut self.children.last_mut().unwrap().1
          }
        };

        child.add_path(rest);
      }
    }
  }

  /// Returns whether `path` matches any pattern stored in this tree.
  /// `AnyItem` nodes in the tree match an `Item` node of any index in
  /// `path`.
  ///
  pub fn matches(&self, path: &TagPath) -> bool {
    self.matches_nodes(path.nodes())
  }

  fn matches_nodes(&self, nodes: &[TagPathNode]) -> bool {
    match nodes.split_first() {
      None => self.is_terminal,
      Some((head, rest)) => self.children.iter().any(|(pattern, child)| {
        node_matches(*pattern, *head) && child.matches_nodes(rest)
      }),
    }
  }
}

fn node_matches(pattern: TagTreeNode, node: TagPathNode) -> bool {
  match (pattern, node) {
    (TagTreeNode::Tag(a), TagPathNode::Tag(b)) => a == b,
    (TagTreeNode::Sequence(a), TagPathNode::Sequence(b)) => a == b,
    (TagTreeNode::Item(a), TagPathNode::Item(b)) => a == b,
    (TagTreeNode::AnyItem, TagPathNode::Item(_)) => true,
    _ => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn exact_match_test() {
    let mut tree = TagTree::new();
    tree.add_path(&[TagTreeNode::Tag(Tag::new(8, 0x20))]);

    let path = TagPath::new().with_tag(Tag::new(8, 0x20));
    assert!(tree.matches(&path));

    let other = TagPath::new().with_tag(Tag::new(8, 0x21));
    assert!(!tree.matches(&other));
  }

  #[test]
  fn any_item_wildcard_test() {
    let mut tree = TagTree::new();
    tree.add_path(&[
      TagTreeNode::Sequence(Tag::new(0x0008, 0x1115)),
      TagTreeNode::AnyItem,
      TagTreeNode::Tag(Tag::new(0x0008, 0x0100)),
    ]);

    for index in [0usize, 1, 5] {
      let path = TagPath::new()
        .with_sequence(Tag::new(0x0008, 0x1115))
        .with_item(index)
        .with_tag(Tag::new(0x0008, 0x0100));

      assert!(tree.matches(&path));
    }
  }
}
