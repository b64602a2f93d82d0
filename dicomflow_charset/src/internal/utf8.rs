use crate::internal::utils;

/// Decodes the next codepoint from the given UTF-8 bytes, returning the
/// decoded character and the remaining unconsumed bytes. Any byte sequence
/// that isn't valid UTF-8 decodes as a single replacement character and
/// advances by one byte, so decoding never gets stuck on malformed data.
///
pub fn decode_next_codepoint(bytes: &[u8]) -> Result<(char, &[u8]), ()> {
  match bytes {
    [byte_0, rest @ ..] if *byte_0 <= 0x7F => {
      let codepoint = u32::from(*byte_0);
      Ok((utils::codepoint_to_char(codepoint), rest))
    }

    [byte_0, byte_1, rest @ ..]
      if (0xC0..=0xDF).contains(byte_0) && (0x80..=0xBF).contains(byte_1) =>
    {
      let codepoint = ((u32::from(*byte_0) & 0x1F) << 6) | (u32::from(*byte_1) & 0x3F);
      Ok((utils::codepoint_to_char(codepoint), rest))
    }

    [byte_0, byte_1, byte_2, rest @ ..]
      if (0xE0..=0xEF).contains(byte_0)
        && (0x80..=0xBF).contains(byte_1)
        && (0x80..=0xBF).contains(byte_2) =>
    {
      let codepoint = ((u32::from(*byte_0) & 0x0F) << 12)
        | ((u32::from(*byte_1) & 0x3F) << 6)
        | (u32::from(*byte_2) & 0x3F);
      Ok((utils::codepoint_to_char(codepoint), rest))
    }

    [byte_0, byte_1, byte_2, byte_3, rest @ ..]
      if (0xF0..=0xF7).contains(byte_0)
        && (0x80..=0xBF).contains(byte_1)
        && (0x80..=0xBF).contains(byte_2)
        && (0x80..=0xBF).contains(byte_3) =>
    {
      let codepoint = ((u32::from(*byte_0) & 0x07) << 18)
        | ((u32::from(*byte_1) & 0x3F) << 12)
        | ((u32::from(*byte_2) & 0x3F) << 6)
        | (u32::from(*byte_3) & 0x3F);
      Ok((utils::codepoint_to_char(codepoint), rest))
    }

    [_, rest @ ..] => Ok((utils::REPLACEMENT_CHARACTER, rest)),

    _ => Err(()),
  }
}

/// Decodes a whole byte slice as UTF-8, lossily substituting the
/// replacement character for any invalid sequence rather than failing.
///
pub fn decode_lossy(mut bytes: &[u8]) -> String {
  let mut s = String::with_capacity(bytes.len());

  while let Ok((c, rest)) = decode_next_codepoint(bytes) {
    s.push(c);
    bytes = rest;
  }

  s
}
