//! Error types for reading, transforming, validating, and writing DICOM P10
//! data.

use dicomflow_core::error::DcmfxError;
use dicomflow_core::tag_path::TagPath;

use crate::part::Part;

/// An error that occurred while reading DICOM P10 data.
///
#[derive(Clone, Debug, PartialEq)]
pub enum ReadError {
  /// The supplied bytes don't look like DICOM at all: neither a preamble
  /// nor a plausible data element header could be found at the start of
  /// the stream, or an implicit-VR big-endian stream was detected (which
  /// this library treats as disallowed).
  ProtocolViolation { details: String },

  /// More bytes are needed before the next part can be produced. The
  /// caller should call `write_bytes` again and retry.
  NeedsMoreBytes,

  /// The stream ended in the middle of a data element, sequence, or item,
  /// other than cleanly at a value boundary.
  DataEnded { details: String, path: TagPath, offset: u64 },

  /// The `TransferSyntaxUID` named in the File Meta Information isn't one
  /// of the transfer syntaxes this library supports.
  TransferSyntaxNotSupported { transfer_syntax_uid: String },

  /// One of the configured maximums (`max_token_size`, `max_sequence_depth`)
  /// was exceeded.
  MaximumExceeded { details: String, path: TagPath, offset: u64 },

  /// The data is structurally invalid in some other way (bad VR bytes, a
  /// sequence found inside the File Meta Information, and so on).
  DataInvalid { details: String, path: TagPath, offset: u64 },
}

impl std::fmt::Display for ReadError {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "DICOM P10 read error: {}", self.name())
  }
}

impl ReadError {
  pub fn name(&self) -> &str {
    match self {
      Self::ProtocolViolation { .. } => "Protocol violation",
      Self::NeedsMoreBytes => "Needs more bytes",
      Self::DataEnded { .. } => "Unexpected end of data",
      Self::TransferSyntaxNotSupported { .. } => "Transfer syntax not supported",
      Self::MaximumExceeded { .. } => "Maximum exceeded",
      Self::DataInvalid { .. } => "Invalid data",
    }
  }
}

impl DcmfxError for ReadError {
  fn to_lines(&self, task_description: &str) -> Vec<String> {
    let mut lines = vec![format!("DICOM P10 read error {task_description}"), String::new()];

    lines.push(format!("  Error: {}", self.name()));

    match self {
      Self::ProtocolViolation { details } | Self::DataInvalid { details, .. } => {
        lines.push(format!("  Details: {details}"));
      }
      Self::TransferSyntaxNotSupported { transfer_syntax_uid } => {
        lines.push(format!("  Transfer syntax UID: {transfer_syntax_uid}"));
      }
      Self::DataEnded { details, .. } => lines.push(format!("  Details: {details}")),
      Self::MaximumExceeded { details, .. } => lines.push(format!("  Details: {details}")),
      Self::NeedsMoreBytes => (),
    }

    match self {
      Self::DataEnded { path, offset, .. }
      | Self::MaximumExceeded { path, offset, .. }
      | Self::DataInvalid { path, offset, .. } => {
        lines.push(format!("  Path: {}", path.to_detailed_string()));
        lines.push(format!("  Offset: 0x{offset:X}"));
      }
      _ => (),
    }

    lines
  }
}

/// An error that occurred while writing DICOM P10 data.
///
#[derive(Clone, Debug, PartialEq)]
pub enum WriteError {
  /// A part was written that doesn't make sense at the writer's current
  /// position, e.g. a `ValueChunk` with no preceding `Header`.
  PartStreamInvalid { details: String, part: Part },

  /// The transfer syntax selected for output isn't supported for writing.
  TransferSyntaxNotSupported { transfer_syntax_uid: String },

  /// Bytes were written to a writer after its final part had already been
  /// written.
  WriteAfterCompletion,
}

impl std::fmt::Display for WriteError {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "DICOM P10 write error: {}", self.name())
  }
}

impl WriteError {
  pub fn name(&self) -> &str {
    match self {
      Self::PartStreamInvalid { .. } => "Part stream invalid",
      Self::TransferSyntaxNotSupported { .. } => "Transfer syntax not supported",
      Self::WriteAfterCompletion => "Write after completion",
    }
  }
}

impl DcmfxError for WriteError {
  fn to_lines(&self, task_description: &str) -> Vec<String> {
    let mut lines = vec![format!("DICOM P10 write error {task_description}"), String::new()];
    lines.push(format!("  Error: {}", self.name()));

    match self {
      Self::PartStreamInvalid { details, part } => {
        lines.push(format!("  Details: {details}"));
        lines.push(format!("  Part: {part:?}"));
      }
      Self::TransferSyntaxNotSupported { transfer_syntax_uid } => {
        lines.push(format!("  Transfer syntax UID: {transfer_syntax_uid}"));
      }
      Self::WriteAfterCompletion => (),
    }

    lines
  }
}

/// An error raised by one of the transform flows.
///
#[derive(Clone, Debug, PartialEq)]
pub enum TransformError {
  /// The collect-and-buffer transform exceeded its configured maximum
  /// buffer size for a single element's value.
  BufferOverflow { path: TagPath, max_buffer_size: usize },

  /// The modify/insert transform was asked to insert a sequence, or to
  /// insert/modify a tag whose VR can't be determined.
  InvalidModification { details: String, path: TagPath },

  /// The explicit-VR-little-endian normalizer found a value whose byte
  /// count didn't match its header's stated length.
  EncodingMismatch { details: String, path: TagPath },
}

impl std::fmt::Display for TransformError {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "DICOM P10 transform error: {}", self.name())
  }
}

impl TransformError {
  pub fn name(&self) -> &str {
    match self {
      Self::BufferOverflow { .. } => "Buffer overflow",
      Self::InvalidModification { .. } => "Invalid modification",
      Self::EncodingMismatch { .. } => "Encoding mismatch",
    }
  }
}

impl DcmfxError for TransformError {
  fn to_lines(&self, task_description: &str) -> Vec<String> {
    let mut lines = vec![format!("DICOM P10 transform error {task_description}"), String::new()];
    lines.push(format!("  Error: {}", self.name()));

    match self {
      Self::BufferOverflow { path, max_buffer_size } => {
        lines.push(format!("  Max buffer size: {max_buffer_size} bytes"));
        lines.push(format!("  Path: {}", path.to_detailed_string()));
      }
      Self::InvalidModification { details, path } | Self::EncodingMismatch { details, path } => {
        lines.push(format!("  Details: {details}"));
        lines.push(format!("  Path: {}", path.to_detailed_string()));
      }
    }

    lines
  }
}

/// An error raised by the leading-bytes validator.
///
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationError {
  /// The input doesn't look like DICOM P10 data.
  NotDicom { details: String },
}

impl std::fmt::Display for ValidationError {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "DICOM P10 validation error: not DICOM")
  }
}

impl DcmfxError for ValidationError {
  fn to_lines(&self, task_description: &str) -> Vec<String> {
    let Self::NotDicom { details } = self;
    vec![
      format!("DICOM P10 validation error {task_description}"),
      String::new(),
      "  Error: Not DICOM".to_string(),
      format!("  Details: {details}"),
    ]
  }
}
