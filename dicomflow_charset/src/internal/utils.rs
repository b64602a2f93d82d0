//! Shared helpers for the character set decoders in this crate.

/// The Unicode replacement character, substituted for any byte sequence
/// that can't be decoded under the active character set.
///
pub const REPLACEMENT_CHARACTER: char = '\u{FFFD}';

/// Converts a raw Unicode codepoint into a `char`, falling back to the
/// replacement character if the codepoint isn't a valid scalar value (e.g.
/// it falls in the UTF-16 surrogate range).
///
pub fn codepoint_to_char(codepoint: u32) -> char {
  char::from_u32(codepoint).unwrap_or(REPLACEMENT_CHARACTER)
}
