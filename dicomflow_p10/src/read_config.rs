/// Configuration used when reading DICOM P10 data.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReadConfig {
  pub(crate) chunk_size: u32,
  pub(crate) max_token_size: u32,
  pub(crate) max_sequence_depth: usize,
  pub(crate) require_dicm_prefix: bool,
  pub(crate) stop_tag: Option<dicomflow_core::tag::Tag>,
}

impl Default for ReadConfig {
  fn default() -> Self {
    Self {
      chunk_size: 8192,
      max_token_size: 0xFFFF_FFFE,
      max_sequence_depth: 10_000,
      require_dicm_prefix: false,
      stop_tag: None,
    }
  }
}

impl ReadConfig {
  /// The maximum size in bytes of a single `ValueChunk` part emitted by the
  /// reader. Must be a multiple of 8. Default 8192.
  ///
  pub fn chunk_size(mut self, value: u32) -> Self {
    self.chunk_size = (value / 8).max(1) * 8;
    self
  }

  /// The maximum size in bytes of the File Meta Information, and of any
  /// single data element value, that the reader will accept. Guards memory
  /// usage against malformed or malicious input.
  ///
  pub fn max_token_size(mut self, value: u32) -> Self {
    self.max_token_size = value;
    self
  }

  /// The maximum nesting depth of sequences the reader will accept.
  ///
  pub fn max_sequence_depth(mut self, value: usize) -> Self {
    self.max_sequence_depth = value;
    self
  }

  /// Whether the 128-byte preamble and `"DICM"` prefix are required. When
  /// false (the default), their absence is treated as valid headerless
  /// DICOM rather than an error.
  ///
  pub fn require_dicm_prefix(mut self, value: bool) -> Self {
    self.require_dicm_prefix = value;
    self
  }

  /// When set, the reader stops as soon as a data set header with a tag
  /// greater than or equal to this one is read.
  ///
  pub fn stop_tag(mut self, value: Option<dicomflow_core::tag::Tag>) -> Self {
    self.stop_tag = value;
    self
  }
}
