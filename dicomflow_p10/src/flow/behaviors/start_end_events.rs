use crate::flow::Flow;
use crate::part::Part;

/// Fires a caller-supplied start event exactly once, before the first part
/// reaches the inner flow, and an end event exactly once, when the stream
/// finishes.
///
pub struct StartEndEvents<F: Flow> {
  inner: F,
  on_start: Box<dyn FnMut() -> Vec<Part>>,
  on_end: Box<dyn FnMut() -> Vec<Part>>,
  started: bool,
  ended: bool,
}

/// Placeholder types kept for call sites that want to name the event kind
/// explicitly; the behavior itself is driven by the `on_start`/`on_end`
/// closures passed to [`StartEndEvents::new`].
///
pub struct StartEventMarker;
pub struct EndEventMarker;

impl<F: Flow> StartEndEvents<F> {
  pub fn new(
    inner: F,
    on_start: impl FnMut() -> Vec<Part> + 'static,
    on_end: impl FnMut() -> Vec<Part> + 'static,
  ) -> Self {
    Self { inner, on_start: Box::new(on_start), on_end: Box::new(on_end), started: false, ended: false }
  }
}

impl<F: Flow> Flow for StartEndEvents<F> {
  fn handle(&mut self, part: Part) -> Vec<Part> {
    let mut out = Vec::new();

    if !self.started {
      self.started = true;
      let start_parts = (self.on_start)();
      out.extend(start_parts.into_iter().flat_map(|p| self.inner.handle(p)));
    }

    out.extend(self.inner.handle(part));
    out
  }

  fn finish(&mut self) -> Vec<Part> {
    let mut out = self.inner.finish();

    if !self.ended {
      self.ended = true;
      let end_parts = (self.on_end)();
      out.extend(end_parts.into_iter().flat_map(|p| self.inner.handle(p)));
    }

    out
  }
}
