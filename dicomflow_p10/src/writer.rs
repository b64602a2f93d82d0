//! Serializes a stream of [`Part`]s back into raw DICOM P10 bytes.
//!
//! Like the reader, this is pull-based in reverse: [`Writer::write_part`]
//! hands parts in one at a time, and each call returns the bytes produced so
//! far, ready to append to a file or socket. Deflated transfer syntaxes are
//! compressed incrementally as parts are written.

use dicomflow_core::tag::Tag;
use dicomflow_core::transfer_syntax::{Endianness, TransferSyntax, VrSerialization};
use dicomflow_core::vr::{ValueLengthSize, ValueRepresentation};

use crate::error::WriteError;
use crate::internal::header::{Header, INDETERMINATE_LENGTH};
use crate::part::Part;
use crate::write_config::WriteConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
  AtBeginning,
  InFmi,
  InDataset,
  Finished,
}

/// A streaming DICOM P10 writer, serializing [`Part`]s into wire bytes for a
/// single chosen transfer syntax.
///
#[derive(Debug)]
pub struct Writer {
  config: WriteConfig,
  transfer_syntax: &'static TransferSyntax,
  state: State,
  deflate: Option<flate2::Compress>,
}

impl Writer {
  pub fn new(transfer_syntax: &'static TransferSyntax, config: WriteConfig) -> Self {
    Self { config, transfer_syntax, state: State::AtBeginning, deflate: None }
  }

  pub fn is_finished(&self) -> bool {
    self.state == State::Finished
  }

  /// Serializes a single part, returning the raw bytes that should be
  /// written next. Most parts produce bytes immediately; some (e.g. a
  /// `Preamble` before the File Meta Information has been written) may be
  /// buffered internally until enough context is known.
  ///
  pub fn write_part(&mut self, part: &Part) -> Result<Vec<u8>, WriteError> {
    if self.state == State::Finished {
      return Err(WriteError::WriteAfterCompletion);
    }

    let raw = self.encode_part(part)?;
    self.maybe_deflate(raw)
  }

  pub(crate) fn encode_part(&mut self, part: &Part) -> Result<Vec<u8>, WriteError> {
    match part {
      Part::Preamble { bytes } => {
        self.state = State::InFmi;
        Ok(bytes.to_vec())
      }

      Part::Header { tag, vr, length } => {
        if tag.group == 0x0002 {
          self.state = State::InFmi;
        } else {
          if self.state == State::InFmi {
            self.start_dataset()?;
          }
          self.state = State::InDataset;
        }

        let length = length.unwrap_or(INDETERMINATE_LENGTH);
        Ok(self.encode_header(*tag, *vr, length))
      }

      Part::ValueChunk { bytes, .. } => Ok(bytes.to_vec()),

      Part::Sequence { tag, length, .. } => {
        if self.state == State::InFmi {
          self.start_dataset()?;
        }
        self.state = State::InDataset;

        let length = length.unwrap_or(INDETERMINATE_LENGTH);
        Ok(self.encode_header(*tag, ValueRepresentation::Sequence, length))
      }

      Part::Fragments { tag, vr } => {
        if self.state == State::InFmi {
          self.start_dataset()?;
        }
        self.state = State::InDataset;
        Ok(self.encode_header(*tag, *vr, INDETERMINATE_LENGTH))
      }

      Part::Item { length, .. } => {
        Ok(Header::to_item_bytes(Tag::ITEM, length.unwrap_or(INDETERMINATE_LENGTH), self.big_endian()))
      }

      Part::ItemDelimitation { marker, .. } => {
        if *marker {
          Ok(vec![])
        } else {
          Ok(Header::to_item_bytes(Tag::ITEM_DELIMITATION, 0, self.big_endian()))
        }
      }

      Part::SequenceDelimitation { marker, .. } => {
        if *marker {
          Ok(vec![])
        } else {
          Ok(Header::to_item_bytes(Tag::SEQUENCE_DELIMITATION, 0, self.big_endian()))
        }
      }

      Part::DeflatedChunk { bytes } => Ok(bytes.to_vec()),

      Part::Unknown { bytes, .. } => Ok(bytes.to_vec()),
    }
  }

  fn big_endian(&self) -> bool {
    matches!(self.transfer_syntax.endianness, Endianness::BigEndian)
  }

  fn explicit_vr(&self) -> bool {
    matches!(self.transfer_syntax.vr_serialization, VrSerialization::Explicit)
  }

  fn encode_header(&self, tag: Tag, vr: ValueRepresentation, length: u32) -> Vec<u8> {
    if !self.explicit_vr() {
      return Header::to_implicit_vr_bytes(tag, length);
    }

    let length = match vr.value_length_size() {
      ValueLengthSize::U16 if length != INDETERMINATE_LENGTH => std::cmp::min(length, 0xFFFE),
      _ => length,
    };

    Header::to_explicit_vr_bytes(tag, vr, length, self.big_endian())
  }

  /// Called on the transition out of the File Meta Information group: sets
  /// up deflate compression if the chosen transfer syntax calls for it.
  ///
  fn start_dataset(&mut self) -> Result<(), WriteError> {
    if self.transfer_syntax.is_deflated {
      self.deflate = Some(flate2::Compress::new(flate2::Compression::new(self.config.zlib_compression_level), false));
    }

    Ok(())
  }

  fn maybe_deflate(&mut self, bytes: Vec<u8>) -> Result<Vec<u8>, WriteError> {
    let compress = match self.deflate.as_mut() {
      Some(c) => c,
      None => return Ok(bytes),
    };

    if bytes.is_empty() {
      return Ok(vec![]);
    }

    let mut out = Vec::with_capacity(bytes.len());
    let mut input_offset = 0usize;
    let mut chunk = vec![0u8; std::cmp::max(bytes.len(), 256)];

    while input_offset < bytes.len() {
      let before_in = compress.total_in();
      let before_out = compress.total_out();

      let status = compress
        .compress(&bytes[input_offset..], &mut chunk, flate2::FlushCompress::Sync)
        .map_err(|_| WriteError::TransferSyntaxNotSupported { transfer_syntax_uid: self.transfer_syntax.uid.to_string() })?;

      let consumed = (compress.total_in() - before_in) as usize;
      let produced = (compress.total_out() - before_out) as usize;

      input_offset += consumed;
      out.extend_from_slice(&chunk[..produced]);

      if consumed == 0 && produced == 0 {
        break;
      }

      if status == flate2::Status::StreamEnd {
        break;
      }
    }

    Ok(out)
  }
}
