//! Converts incoming chunks of raw DICOM P10 bytes into a stream of [`Part`]s.
//!
//! Reading is pull-based and non-blocking: [`Reader::write_bytes`] adds raw
//! bytes, and [`Reader::read_parts`] drains as many parts as the
//! currently-available bytes allow. When there isn't enough data to produce
//! the next part, `read_parts` returns [`ReadError::NeedsMoreBytes`] and the
//! caller must write more bytes and call it again.

use byteorder::{ByteOrder, LittleEndian};

use dicomflow_core::bytes::SharedBytes;
use dicomflow_core::tag::Tag;
use dicomflow_core::transfer_syntax::TransferSyntax;
use dicomflow_core::vr::{ValueLengthSize, ValueRepresentation};

use crate::error::ReadError;
use crate::internal::byte_stream::{ByteStream, ByteStreamError};
use crate::internal::header::{Header, INDETERMINATE_LENGTH};
use crate::internal::location::{Delimiter, Location};
use crate::part::Part;
use crate::read_config::ReadConfig;

#[derive(Debug)]
enum State {
  AtBeginning,
  AtHeader,
  InValue { tag: Tag, vr: ValueRepresentation, bytes_remaining: u32 },
  InFragmentHeader { tag: Tag, vr: ValueRepresentation },
  InFragmentValue { index: usize, bytes_remaining: u32 },
  Finished,
}

/// A streaming DICOM P10 reader. Holds all state for an in-progress read;
/// bytes are pushed in, parts are pulled out.
///
#[derive(Debug)]
pub struct Reader {
  config: ReadConfig,
  stream: ByteStream,
  state: State,
  in_fmi: bool,
  fmi_ends_at: Option<u64>,
  style_detected: bool,
  explicit_vr: bool,
  big_endian: bool,
  transfer_syntax: &'static TransferSyntax,
  location: Location,
  warnings: Vec<String>,
  fragments_tag: Tag,
  fragments_vr: ValueRepresentation,
}

impl Reader {
  pub fn new(config: ReadConfig) -> Self {
    Self {
      config,
      stream: ByteStream::new(),
      state: State::AtBeginning,
      in_fmi: false,
      fmi_ends_at: None,
      style_detected: false,
      explicit_vr: true,
      big_endian: false,
      transfer_syntax: &TransferSyntax::IMPLICIT_VR_LITTLE_ENDIAN,
      location: Location::new(),
      warnings: Vec::new(),
      fragments_tag: Tag::PIXEL_DATA,
      fragments_vr: ValueRepresentation::OtherByteString,
    }
  }

  /// Warnings accumulated so far: unexpected parts inside fragments, a
  /// missing transfer syntax in the File Meta Information, an oversize
  /// transfer syntax UID, and the like. Non-fatal.
  ///
  pub fn warnings(&self) -> &[String] {
    &self.warnings
  }

  pub fn transfer_syntax(&self) -> &'static TransferSyntax {
    self.transfer_syntax
  }

  pub fn is_finished(&self) -> bool {
    matches!(self.state, State::Finished)
  }

  /// Adds bytes to be parsed. `done` marks the final chunk of input.
  ///
  pub fn write_bytes(&mut self, bytes: SharedBytes, done: bool) -> Result<(), ReadError> {
    self.stream.write(bytes, done).map_err(|_| ReadError::ProtocolViolation {
      details: "Wrote data after the read was marked complete".to_string(),
    })
  }

  /// Reads as many parts as the currently available bytes allow. Returns
  /// `Err(ReadError::NeedsMoreBytes)` when the next part can't yet be
  /// produced; the caller should write more bytes and call again.
  ///
  pub fn read_parts(&mut self) -> Result<Vec<Part>, ReadError> {
    match self.state {
      State::Finished => Ok(vec![]),
      State::AtBeginning => self.read_preamble(),
      State::AtHeader => self.read_header_part(),
      State::InValue { tag, vr, bytes_remaining } => self.read_value_chunk(tag, vr, bytes_remaining),
      State::InFragmentHeader { tag, vr } => self.read_fragment_header(tag, vr),
      State::InFragmentValue { index, bytes_remaining } => self.read_fragment_chunk(index, bytes_remaining),
    }
  }

  fn map_stream_error(&self, error: ByteStreamError, when: &str) -> ReadError {
    match error {
      ByteStreamError::DataRequired => ReadError::NeedsMoreBytes,
      ByteStreamError::DataEnd => ReadError::DataEnded {
        details: format!("Stream ended unexpectedly while {when}"),
        path: Default::default(),
        offset: self.stream.bytes_read(),
      },
      ByteStreamError::InflateDataError => {
        ReadError::DataInvalid { details: "Invalid deflate data".to_string(), path: Default::default(), offset: self.stream.bytes_read() }
      }
      ByteStreamError::WriteAfterCompletion => {
        ReadError::ProtocolViolation { details: "Wrote data after completion".to_string() }
      }
    }
  }

  fn read_preamble(&mut self) -> Result<Vec<Part>, ReadError> {
    match self.stream.peek(132) {
      Ok(data) if &data[128..132] == b"DICM" => {
        let bytes = self.stream.read(132).map_err(|e| self.map_stream_error(e, "reading the preamble"))?;
        self.in_fmi = true;
        self.state = State::AtHeader;
        Ok(vec![Part::Preamble { bytes }])
      }

      Ok(_) if self.config.require_dicm_prefix => {
        Err(ReadError::ProtocolViolation { details: "'DICM' prefix not present at offset 128".to_string() })
      }

      Ok(_) => {
        self.in_fmi = false;
        self.style_detected = false;
        self.state = State::AtHeader;
        Ok(vec![])
      }

      Err(ByteStreamError::DataEnd) if !self.config.require_dicm_prefix => {
        self.in_fmi = false;
        self.style_detected = false;
        self.state = State::AtHeader;
        Ok(vec![])
      }

      Err(e) => Err(self.map_stream_error(e, "reading the preamble")),
    }
  }

  /// Detects endianness and VR-explicitness from the first 8 bytes of an
  /// element, per the heuristic in `tryReadHeader`.
  ///
  fn detect_header_style(&mut self, data: &[u8]) -> Result<(), ReadError> {
    let tag = Header::decode_tag(data, false);
    let vr_code = std::str::from_utf8(&data[4..6]).ok();
    let dictionary_vr = dicomflow_core::dictionary::vr_of(tag);

    if vr_code == Some(dictionary_vr.code()) {
      self.explicit_vr = true;
      self.big_endian = false;
      return Ok(());
    }

    let length_le = LittleEndian::read_u32(&data[4..8]);
    if (length_le as i32) >= 0 {
      self.explicit_vr = false;
      self.big_endian = false;
      return Ok(());
    }

    let tag_be = Header::decode_tag(data, true);
    let dictionary_vr_be = dicomflow_core::dictionary::vr_of(tag_be);
    let vr_code_be = std::str::from_utf8(&data[4..6]).ok();

    if vr_code_be == Some(dictionary_vr_be.code()) {
      self.explicit_vr = true;
      self.big_endian = true;
      return Ok(());
    }

    Err(ReadError::ProtocolViolation {
      details: "Not a DICOM stream: implicit VR big endian is not supported".to_string(),
    })
  }

  /// Peeks (without consuming) the next data element header, returning it
  /// along with its size in bytes. Splitting peek from consume means a
  /// `NeedsMoreBytes` anywhere in this method, or in any lookahead the
  /// caller does afterwards, leaves the stream position untouched so a
  /// retry after more bytes arrive starts from the same offset.
  ///
  fn peek_header(&mut self) -> Result<(Header, usize), ReadError> {
    let first_8 = self.stream.peek(8).map_err(|e| self.map_stream_error(e, "reading a data element header"))?;

    // Item and delimitation markers never carry a VR and are always 8 bytes,
    // tag(4) + length(4), regardless of explicitness.
    let tag_le = Header::decode_tag(&first_8, false);
    if tag_le == Tag::ITEM || tag_le == Tag::ITEM_DELIMITATION || tag_le == Tag::SEQUENCE_DELIMITATION {
      let length = Header::read_u32(&first_8[4..8], false);
      return Ok((Header { tag: tag_le, vr: None, length }, 8));
    }

    if self.in_fmi {
      self.explicit_vr = true;
      self.big_endian = false;
    } else if !self.style_detected {
      // A headerless stream's first dataset element must be sniffed; every
      // element after that shares the same endianness and VR style.
      self.detect_header_style(&first_8)?;
      self.style_detected = true;
    }

    if self.explicit_vr {
      let vr_code = std::str::from_utf8(&first_8[4..6]).unwrap_or("??");
      let vr = ValueRepresentation::from_code(vr_code).unwrap_or(ValueRepresentation::Unknown);

      match vr.value_length_size() {
        ValueLengthSize::U16 => {
          let length = u32::from(Header::read_u16(&first_8[6..8], self.big_endian));
          Ok((Header { tag: tag_le_or_be(tag_le, &first_8, self.big_endian), vr: Some(vr), length }, 8))
        }
        ValueLengthSize::U32 => {
          let first_12 = self.stream.peek(12).map_err(|e| self.map_stream_error(e, "reading a data element header"))?;
          let length = Header::read_u32(&first_12[8..12], self.big_endian);
          Ok((Header { tag: tag_le_or_be(tag_le, &first_8, self.big_endian), vr: Some(vr), length }, 12))
        }
      }
    } else {
      let tag = tag_le_or_be(tag_le, &first_8, self.big_endian);
      let length = Header::read_u32(&first_8[4..8], self.big_endian);
      let vr = dicomflow_core::dictionary::vr_of(tag);
      Ok((Header { tag, vr: Some(vr), length }, 8))
    }
  }

  /// Sets the decode style (VR explicitness, endianness) from the resolved
  /// transfer syntax, and starts deflate decompression if it calls for it.
  ///
  fn leave_fmi(&mut self) {
    use dicomflow_core::transfer_syntax::{Endianness, VrSerialization};

    self.in_fmi = false;
    self.explicit_vr = matches!(self.transfer_syntax.vr_serialization, VrSerialization::Explicit);
    self.big_endian = matches!(self.transfer_syntax.endianness, Endianness::Big);
    self.style_detected = true;

    if self.transfer_syntax.is_deflated {
      match self.stream.peek(2) {
        Ok(bytes) if bytes.len() == 2 && bytes[0] == 0x78 && bytes[1] == 0x9C => self.stream.start_zlib_inflate(),
        _ => self.stream.start_raw_inflate(),
      }
    }
  }

  fn read_header_part(&mut self) -> Result<Vec<Part>, ReadError> {
    // A determinate-length sequence or item has no delimiter bytes of its
    // own on the wire; this fires a synthetic one the moment its declared
    // length has been consumed.
    if let Some(delimiter) = self.location.next_delimiter(self.stream.bytes_read()) {
      return Ok(vec![self.delimiter_to_part(delimiter, true)]);
    }

    if self.stream.is_fully_consumed() {
      let delimiters = self.location.pending_delimiters();
      self.state = State::Finished;
      return Ok(delimiters.into_iter().map(|d| self.delimiter_to_part(d, true)).collect());
    }

    let (header, header_size) = self.peek_header()?;

    // For File Meta Information elements whose value this reader inspects
    // (FileMetaInformationGroupLength, TransferSyntaxUID), confirm the value
    // bytes are available too before consuming anything, so a short read
    // leaves the stream position untouched for the retry.
    let is_inspected_fmi_element = self.in_fmi
      && header.tag.group == 0x0002
      && (header.tag == Tag::new(0x0002, 0x0000) || header.tag == Tag::new(0x0002, 0x0010))
      && header.length != INDETERMINATE_LENGTH;

    if is_inspected_fmi_element {
      self
        .stream
        .peek(header_size + header.length as usize)
        .map_err(|e| self.map_stream_error(e, "reading a File Meta Information element"))?;
    }

    self.stream.read(header_size).map_err(|e| self.map_stream_error(e, "reading a data element header"))?;

    if self.in_fmi && header.tag.group != 0x0002 {
      // End of FMI reached without an explicit group-length boundary. The
      // header bytes just read were parsed assuming Explicit VR Little
      // Endian, which only produces the right tag when the transfer syntax
      // agrees; this is an accepted limitation for FMI streams omitting
      // FileMetaInformationGroupLength.
      self.leave_fmi();
      return self.process_dataset_header(header);
    }

    if self.in_fmi {
      return self.process_fmi_header(header);
    }

    self.process_dataset_header(header)
  }

  fn process_fmi_header(&mut self, header: Header) -> Result<Vec<Part>, ReadError> {
    let length = header.length as usize;
    let vr = header.vr.unwrap_or(ValueRepresentation::Unknown);

    if header.tag == Tag::new(0x0002, 0x0010) {
      // TransferSyntaxUID: peek ahead to resolve the transfer syntax before
      // emitting this element, so byte-style decisions for what follows are
      // correct without buffering.
      let bytes = self.stream.peek(length).map_err(|e| self.map_stream_error(e, "reading TransferSyntaxUID"))?;
      let uid = std::str::from_utf8(&bytes).unwrap_or("").trim_matches(|c: char| c == '\0' || c.is_whitespace());

      match TransferSyntax::from_uid(uid) {
        Some(ts) => self.transfer_syntax = ts,
        None => {
          return Err(ReadError::TransferSyntaxNotSupported { transfer_syntax_uid: uid.to_string() });
        }
      }
    }

    if header.tag == Tag::new(0x0002, 0x0000) {
      let bytes = self.stream.peek(length).map_err(|e| self.map_stream_error(e, "reading FileMetaInformationGroupLength"))?;
      if bytes.len() == 4 {
        let group_length = LittleEndian::read_u32(&bytes);
        self.fmi_ends_at = Some(self.stream.bytes_read() + u64::from(header.length) + u64::from(group_length));
      }
    }

    self.state = State::InValue { tag: header.tag, vr, bytes_remaining: header.length };

    Ok(vec![Part::Header { tag: header.tag, vr, length: Some(header.length) }])
  }

  fn process_dataset_header(&mut self, header: Header) -> Result<Vec<Part>, ReadError> {
    if let Some(stop_tag) = self.config.stop_tag {
      if header.tag >= stop_tag {
        self.state = State::Finished;
        return Ok(vec![]);
      }
    }

    if !self.location.check_data_element_ordering(header.tag) {
      self.warnings.push(format!(
        "Data elements are not in ascending order: {} follows a higher tag",
        header.tag
      ));
    }

    let vr = header.vr.unwrap_or(ValueRepresentation::Unknown);

    if header.tag == Tag::ITEM_DELIMITATION {
      let closed = self.location.end_item();
      self.state = State::AtHeader;
      return Ok(vec![Part::ItemDelimitation { index: closed.unwrap_or(0), marker: closed.is_none() }]);
    }

    if header.tag == Tag::SEQUENCE_DELIMITATION {
      let tag = self.location.end_sequence().unwrap_or(Tag::ZERO);
      self.state = State::AtHeader;
      return Ok(vec![Part::SequenceDelimitation { tag, marker: false }]);
    }

    if header.tag == Tag::ITEM {
      let ends_at = if header.length == INDETERMINATE_LENGTH { None } else { Some(self.stream.bytes_read() + u64::from(header.length)) };
      let index = self.location.add_item(ends_at);
      self.state = State::AtHeader;
      return Ok(vec![Part::Item { index: index.unwrap_or(0), length: if header.length == INDETERMINATE_LENGTH { None } else { Some(header.length) } }]);
    }

    let is_fragments = header.tag == Tag::PIXEL_DATA
      && matches!(vr, ValueRepresentation::OtherByteString | ValueRepresentation::OtherWordString)
      && header.length == INDETERMINATE_LENGTH;

    if is_fragments {
      self.location.add_sequence(header.tag, None);
      self.fragments_tag = header.tag;
      self.fragments_vr = vr;
      self.state = State::InFragmentHeader { tag: header.tag, vr };
      return Ok(vec![Part::Fragments { tag: header.tag, vr }]);
    }

    let is_sequence = matches!(vr, ValueRepresentation::Sequence)
      || (matches!(vr, ValueRepresentation::Unknown) && header.length == INDETERMINATE_LENGTH);

    if is_sequence {
      if self.location.sequence_depth() >= self.config.max_sequence_depth {
        return Err(ReadError::MaximumExceeded {
          details: "Maximum sequence depth exceeded".to_string(),
          path: Default::default(),
          offset: self.stream.bytes_read(),
        });
      }

      let ends_at = if header.length == INDETERMINATE_LENGTH { None } else { Some(self.stream.bytes_read() + u64::from(header.length)) };
      self.location.add_sequence(header.tag, ends_at);
      self.state = State::AtHeader;
      return Ok(vec![Part::Sequence { tag: header.tag, vr: ValueRepresentation::Sequence, length: if header.length == INDETERMINATE_LENGTH { None } else { Some(header.length) } }]);
    }

    if header.length > self.config.max_token_size && header.length != INDETERMINATE_LENGTH {
      return Err(ReadError::MaximumExceeded {
        details: format!("Value of {header:?} exceeds the configured max token size"),
        path: Default::default(),
        offset: self.stream.bytes_read(),
      });
    }

    self.state = State::InValue { tag: header.tag, vr, bytes_remaining: header.length };
    Ok(vec![Part::Header { tag: header.tag, vr, length: Some(header.length) }])
  }

  fn delimiter_to_part(&self, delimiter: Delimiter, marker: bool) -> Part {
    match delimiter {
      Delimiter::Sequence { tag } => Part::SequenceDelimitation { tag, marker },
      Delimiter::Item { index } => Part::ItemDelimitation { index, marker },
    }
  }

  fn read_value_chunk(&mut self, tag: Tag, vr: ValueRepresentation, bytes_remaining: u32) -> Result<Vec<Part>, ReadError> {
    if bytes_remaining == 0 {
      self.finish_value();
      return Ok(vec![Part::ValueChunk { bytes: SharedBytes::empty(), last: true }]);
    }

    let chunk_size = std::cmp::min(bytes_remaining, self.config.chunk_size) as usize;

    let bytes = match self.stream.read(chunk_size) {
      Ok(bytes) => bytes,
      Err(ByteStreamError::DataEnd) => {
        // Truncation exactly at a value boundary becomes a clean empty
        // terminal chunk rather than an error.
        self.state = State::Finished;
        return Ok(vec![Part::ValueChunk { bytes: SharedBytes::empty(), last: true }]);
      }
      Err(e) => return Err(self.map_stream_error(e, "reading a data element value")),
    };

    let remaining = bytes_remaining - chunk_size as u32;
    let last = remaining == 0;

    if last {
      self.finish_value();
    } else {
      self.state = State::InValue { tag, vr, bytes_remaining: remaining };
    }

    Ok(vec![Part::ValueChunk { bytes, last }])
  }

  /// Called once a value's bytes have been fully consumed: returns to
  /// header-reading state, leaving the File Meta Information group behind
  /// if its declared end offset has now been reached.
  ///
  fn finish_value(&mut self) {
    if self.in_fmi {
      if let Some(ends_at) = self.fmi_ends_at {
        if self.stream.bytes_read() >= ends_at {
          self.leave_fmi();
        }
      }
    }

    self.state = State::AtHeader;
  }

  fn read_fragment_header(&mut self, tag: Tag, vr: ValueRepresentation) -> Result<Vec<Part>, ReadError> {
    let first_8 = self.stream.peek(8).map_err(|e| self.map_stream_error(e, "reading a fragment item header"))?;
    let item_tag = Header::decode_tag(&first_8, self.big_endian);

    if item_tag == Tag::SEQUENCE_DELIMITATION {
      self.stream.read(8).map_err(|e| self.map_stream_error(e, "reading a fragment item header"))?;
      let end_tag = self.location.end_sequence().unwrap_or(tag);
      self.state = State::AtHeader;
      return Ok(vec![Part::SequenceDelimitation { tag: end_tag, marker: false }]);
    }

    if item_tag != Tag::ITEM {
      self.warnings.push(format!("Unexpected part inside fragments for tag {tag}"));
      self.stream.read(8).map_err(|e| self.map_stream_error(e, "reading a fragment item header"))?;
      self.state = State::InFragmentHeader { tag, vr };
      return Ok(vec![Part::Unknown { tag: item_tag, bytes: SharedBytes::empty() }]);
    }

    self.stream.read(8).map_err(|e| self.map_stream_error(e, "reading a fragment item header"))?;
    let length = Header::read_u32(&first_8[4..8], self.big_endian);
    let index = self.location.add_item(None).unwrap_or(0);

    self.state = State::InFragmentValue { index, bytes_remaining: length };

    Ok(vec![Part::Item { index, length: Some(length) }])
  }

  fn read_fragment_chunk(&mut self, index: usize, bytes_remaining: u32) -> Result<Vec<Part>, ReadError> {
    if bytes_remaining == 0 {
      self.location.end_item();
      self.state = State::InFragmentHeader { tag: self.fragments_tag, vr: self.fragments_vr };
      return Ok(vec![Part::ValueChunk { bytes: SharedBytes::empty(), last: true }]);
    }

    let chunk_size = std::cmp::min(bytes_remaining, self.config.chunk_size) as usize;
    let bytes = self.stream.read(chunk_size).map_err(|e| self.map_stream_error(e, "reading a fragment value"))?;
    let remaining = bytes_remaining - chunk_size as u32;
    let last = remaining == 0;

    if last {
      self.location.end_item();
      self.state = State::InFragmentHeader { tag: self.fragments_tag, vr: self.fragments_vr };
    } else {
      self.state = State::InFragmentValue { index, bytes_remaining: remaining };
    }

    Ok(vec![Part::ValueChunk { bytes, last }])
  }
}

fn tag_le_or_be(tag_le: Tag, data: &[u8], big_endian: bool) -> Tag {
  if big_endian { Header::decode_tag(data, true) } else { tag_le }
}
