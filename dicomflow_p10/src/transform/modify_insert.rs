use dicomflow_core::bytes::SharedBytes;
use dicomflow_core::tag::Tag;
use dicomflow_core::tag_path::{TagPath, TagPathNode};
use dicomflow_core::vr::ValueRepresentation;

use crate::flow::Flow;
use crate::flow::behaviors::PathTracker;
use crate::part::Part;

/// Rewrites a matched element's value in place.
///
pub struct Modification {
  pub matcher: Box<dyn Fn(&TagPath) -> bool>,
  pub transform: Box<dyn Fn(&[u8]) -> Vec<u8>>,
}

/// Splices a new element in at `at` (the path of its parent data set or
/// item) if no element with that tag is already present there. Sequences
/// cannot be inserted this way.
///
pub struct Insertion {
  pub at: TagPath,
  pub tag: Tag,
  pub vr: ValueRepresentation,
  pub bytes: Vec<u8>,
  inserted: bool,
}

impl Insertion {
  pub fn new(at: TagPath, tag: Tag, vr: ValueRepresentation, bytes: Vec<u8>) -> Self {
    Self { at, tag, vr, bytes, inserted: false }
  }
}

fn parent_of(path: &TagPath) -> TagPath {
  match path.nodes().last() {
    Some(TagPathNode::Tag(_)) => path.pop().unwrap_or_else(|_| TagPath::new()),
    _ => path.clone(),
  }
}

struct Buffering {
  tag: Tag,
  vr: ValueRepresentation,
  bytes: Vec<u8>,
}

/// Applies a set of value modifications and element insertions over the
/// part stream. Modifications replace a matched element's value bytes
/// (updating the header's length); insertions splice a new element into
/// the correct sort position of an existing parent data set or item.
///
pub struct ModifyInsert<F: Flow> {
  inner: F,
  tracker: PathTracker,
  modifications: Vec<Modification>,
  insertions: Vec<Insertion>,
  buffering: Option<Buffering>,
}

impl<F: Flow> ModifyInsert<F> {
  pub fn new(inner: F, modifications: Vec<Modification>, insertions: Vec<Insertion>) -> Self {
    Self { inner, tracker: PathTracker::new(), modifications, insertions, buffering: None }
  }

  fn emit_due_insertions(&mut self, at: &TagPath, before_tag: Option<Tag>) -> Vec<Part> {
    let mut due: Vec<usize> = self
      .insertions
      .iter()
      .enumerate()
      .filter(|(_, insertion)| {
        !insertion.inserted && &insertion.at == at && before_tag.is_none_or(|tag| insertion.tag < tag)
      })
      .map(|(i, _)| i)
      .collect();
    due.sort_by_key(|&i| self.insertions[i].tag);

    let mut out = Vec::new();
    for i in due.drain(..) {
      self.insertions[i].inserted = true;
      let tag = self.insertions[i].tag;
      let vr = self.insertions[i].vr;
      let bytes = self.insertions[i].bytes.clone();

      out.extend(self.inner.handle(Part::Header { tag, vr, length: Some(bytes.len() as u32) }));
      out.extend(self.inner.handle(Part::ValueChunk { bytes: SharedBytes::from_vec(bytes), last: true }));
    }

    out
  }

  fn flush_modified(&mut self) -> Vec<Part> {
    let Buffering { tag, vr, bytes } = self.buffering.take().unwrap();

    let matched = self.modifications.iter().find(|m| (m.matcher)(self.tracker.path()));

    let bytes = match matched {
      Some(modification) => (modification.transform)(&bytes),
      None => bytes,
    };

    let mut out = self.inner.handle(Part::Header { tag, vr, length: Some(bytes.len() as u32) });
    out.extend(self.inner.handle(Part::ValueChunk { bytes: SharedBytes::from_vec(bytes), last: true }));
    out
  }
}

impl<F: Flow> Flow for ModifyInsert<F> {
  fn handle(&mut self, part: Part) -> Vec<Part> {
    if let Part::ValueChunk { bytes, last } = &part {
      if let Some(buffering) = self.buffering.as_mut() {
        buffering.bytes.extend_from_slice(bytes);
        return if *last { self.flush_modified() } else { vec![] };
      }
    }

    let current_path = self.tracker.path().clone();
    self.tracker.observe(&part);

    match &part {
      Part::Header { tag, vr, .. } => {
        let mut out = self.emit_due_insertions(&parent_of(&current_path), Some(*tag));
        if self.modifications.iter().any(|m| (m.matcher)(self.tracker.path())) {
          self.buffering = Some(Buffering { tag: *tag, vr: *vr, bytes: Vec::new() });
        } else {
          out.extend(self.inner.handle(part));
        }
        out
      }

      Part::Sequence { tag, .. } | Part::Fragments { tag, .. } => {
        let mut out = self.emit_due_insertions(&parent_of(&current_path), Some(*tag));
        out.extend(self.inner.handle(part));
        out
      }

      Part::SequenceDelimitation { .. } | Part::ItemDelimitation { .. } => {
        let mut out = self.emit_due_insertions(&current_path, None);
        out.extend(self.inner.handle(part));
        out
      }

      _ => self.inner.handle(part),
    }
  }

  fn finish(&mut self) -> Vec<Part> {
    let mut out = self.emit_due_insertions(&TagPath::new(), None);
    out.extend(self.inner.finish());
    out
  }
}
