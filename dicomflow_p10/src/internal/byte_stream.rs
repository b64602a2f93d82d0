use std::collections::VecDeque;

use dicomflow_core::bytes::SharedBytes;

/// A byte stream that takes incoming chunks of binary data of any size and
/// allows the resulting data to be read and peeked as if it were one large
/// contiguous stream.
///
/// Incoming bytes can optionally be passed through zlib inflate, or raw
/// (nowrap) deflate, prior to being made available for reading.
///
#[derive(Debug)]
pub struct ByteStream {
  bytes_queue: VecDeque<SharedBytes>,
  bytes_queue_size: u64,
  bytes_read: u64,
  is_writing_finished: bool,
  inflate_stream: Option<flate2::Decompress>,
  inflate_input_queue: VecDeque<SharedBytes>,
  inflate_complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteStreamError {
  /// The byte stream doesn't have the bytes requested available yet and
  /// needs more bytes written to it before the request can be served.
  DataRequired,

  /// The request would go past the end of the byte stream.
  DataEnd,

  /// Data written while inflate is active wasn't valid deflate data.
  InflateDataError,

  /// Data was written to a byte stream after its final bytes were written.
  WriteAfterCompletion,
}

/// Inflated data is produced in chunks of at most this size, to bound memory
/// use against maliciously crafted deflate bombs.
///
const INFLATE_CHUNK_SIZE: usize = 64 * 1024;

impl ByteStream {
  pub fn new() -> Self {
    Self {
      bytes_queue: VecDeque::new(),
      bytes_queue_size: 0,
      bytes_read: 0,
      is_writing_finished: false,
      inflate_stream: None,
      inflate_input_queue: VecDeque::new(),
      inflate_complete: false,
    }
  }

  pub fn bytes_read(&self) -> u64 {
    self.bytes_read
  }

  pub fn is_fully_consumed(&self) -> bool {
    self.bytes_queue_size == 0
      && self.is_writing_finished
      && (self.inflate_stream.is_none() || self.inflate_complete)
  }

  /// Writes bytes for later reading. `done` marks the final chunk of input;
  /// further writes after that error.
  ///
  pub fn write(&mut self, data: SharedBytes, done: bool) -> Result<(), ByteStreamError> {
    if self.is_writing_finished {
      return Err(ByteStreamError::WriteAfterCompletion);
    }

    self.is_writing_finished = done;

    if data.is_empty() {
      return Ok(());
    }

    if self.inflate_stream.is_some() {
      self.inflate_input_queue.push_back(data);
    } else {
      self.bytes_queue_size += data.len() as u64;
      self.bytes_queue.push_back(data);
    }

    Ok(())
  }

  pub fn read(&mut self, byte_count: usize) -> Result<SharedBytes, ByteStreamError> {
    if byte_count == 0 {
      return Ok(SharedBytes::empty());
    }

    self.inflate_up_to_read_size(byte_count)?;

    if byte_count as u64 > self.bytes_queue_size {
      return Err(if self.is_writing_finished { ByteStreamError::DataEnd } else { ByteStreamError::DataRequired });
    }

    self.bytes_queue_size -= byte_count as u64;
    self.bytes_read += byte_count as u64;

    let front_len = self.bytes_queue.front().unwrap().len();

    match byte_count.cmp(&front_len) {
      std::cmp::Ordering::Less => {
        let result = self.bytes_queue.front().unwrap().slice(0, byte_count);
        let queue_item = self.bytes_queue.front_mut().unwrap();
        *queue_item = queue_item.drop(byte_count);
        Ok(result)
      }

      std::cmp::Ordering::Equal => Ok(self.bytes_queue.pop_front().unwrap()),

      std::cmp::Ordering::Greater => {
        let mut result = Vec::with_capacity(byte_count);

        while result.len() < byte_count {
          let queue_item = self.bytes_queue.front_mut().unwrap();

          let end = std::cmp::min(queue_item.len(), byte_count - result.len());
          result.extend_from_slice(&queue_item[..end]);

          *queue_item = queue_item.drop(end);

          if queue_item.is_empty() {
            self.bytes_queue.pop_front();
          }
        }

        Ok(SharedBytes::from_vec(result))
      }
    }
  }

  pub fn peek(&mut self, byte_count: usize) -> Result<Vec<u8>, ByteStreamError> {
    if byte_count == 0 {
      return Ok(vec![]);
    }

    self.inflate_up_to_read_size(byte_count)?;

    if byte_count as u64 > self.bytes_queue_size {
      return Err(if self.is_writing_finished { ByteStreamError::DataEnd } else { ByteStreamError::DataRequired });
    }

    let mut result = Vec::with_capacity(byte_count);

    for queue_item in self.bytes_queue.iter() {
      let end = std::cmp::min(queue_item.len(), byte_count - result.len());
      result.extend_from_slice(&queue_item[..end]);

      if result.len() >= byte_count {
        break;
      }
    }

    Ok(result)
  }

  /// Starts routing all currently queued and subsequently written bytes
  /// through zlib inflate (expecting a zlib header).
  ///
  pub fn start_zlib_inflate(&mut self) {
    self.inflate_stream = Some(flate2::Decompress::new(true));
    self.inflate_input_queue.append(&mut self.bytes_queue);
    self.bytes_queue_size = 0;
  }

  /// Starts routing bytes through raw ("nowrap") deflate, used for deflated
  /// payloads that lack the standard zlib header.
  ///
  pub fn start_raw_inflate(&mut self) {
    self.inflate_stream = Some(flate2::Decompress::new(false));
    self.inflate_input_queue.append(&mut self.bytes_queue);
    self.bytes_queue_size = 0;
  }

  fn inflate_up_to_read_size(&mut self, read_size: usize) -> Result<(), ByteStreamError> {
    let inflate_stream = match self.inflate_stream.as_mut() {
      Some(s) => s,
      None => return Ok(()),
    };

    while self.bytes_queue_size < read_size as u64 {
      let queue_item = match self.inflate_input_queue.pop_front() {
        Some(item) => item,
        None => return Ok(()),
      };

      let initial_total_in = inflate_stream.total_in();
      let initial_total_out = inflate_stream.total_out();

      let mut output_buffer = vec![0u8; INFLATE_CHUNK_SIZE];

      match inflate_stream.decompress(&queue_item, &mut output_buffer, flate2::FlushDecompress::None) {
        Ok(status) => {
          let bytes_consumed = inflate_stream.total_in() - initial_total_in;
          let bytes_produced = inflate_stream.total_out() - initial_total_out;

          if bytes_consumed < queue_item.len() as u64 {
            self.inflate_input_queue.push_front(queue_item.drop(bytes_consumed as usize));
          }

          if bytes_produced > 0 {
            output_buffer.resize(bytes_produced as usize, 0);
            self.bytes_queue.push_back(output_buffer.into());
            self.bytes_queue_size += bytes_produced;
          }

          if status == flate2::Status::StreamEnd {
            self.inflate_complete = true;
            return Ok(());
          }

          if bytes_produced == 0 {
            break;
          }
        }

        Err(_) => return Err(ByteStreamError::InflateDataError),
      }
    }

    Ok(())
  }
}

impl Default for ByteStream {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn read_spanning_multiple_chunks_test() {
    let mut stream = ByteStream::new();
    stream.write(SharedBytes::from_vec(vec![1, 2]), false).unwrap();
    stream.write(SharedBytes::from_vec(vec![3, 4, 5]), true).unwrap();

    let read = stream.read(4).unwrap();
    assert_eq!(&*read, &[1, 2, 3, 4]);

    assert_eq!(&*stream.read(1).unwrap(), &[5]);
    assert!(stream.is_fully_consumed());
  }

  #[test]
  fn data_required_before_done_test() {
    let mut stream = ByteStream::new();
    stream.write(SharedBytes::from_vec(vec![1]), false).unwrap();
    assert_eq!(stream.read(2), Err(ByteStreamError::DataRequired));
  }

  #[test]
  fn data_end_after_done_test() {
    let mut stream = ByteStream::new();
    stream.write(SharedBytes::from_vec(vec![1]), true).unwrap();
    assert_eq!(stream.read(2), Err(ByteStreamError::DataEnd));
  }
}
