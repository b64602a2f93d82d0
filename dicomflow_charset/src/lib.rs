//! Decodes the string-valued elements of a DICOM data set according to the
//! specific character set(s) declared by `(0008,0005) SpecificCharacterSet`.
//!
//! This crate implements direct decoding for the character sets DICOM
//! producers use almost universally in practice: `ISO_IR 6` (the default
//! repertoire, plain ASCII), `ISO_IR 100` (Latin-1), and `ISO_IR 192` (UTF-8,
//! also the fallback when no character set is declared at all). A data set
//! that declares anything else — one of the other single-byte ISO 2022
//! repertoires, or a multi-byte repertoire needing code-extension escape
//! sequences (`ISO 2022 IR 87`, `ISO 2022 IR 159`, and so on) — is decoded as
//! lossy UTF-8 instead of rejected outright, with a warning recorded so the
//! caller can surface that the text may be wrong.

pub mod internal;

use internal::utf8;

/// The character set(s) currently in effect for decoding string-valued
/// elements, as declared by a `SpecificCharacterSet` element.
///
#[derive(Clone, Debug, PartialEq)]
pub struct CharacterSets {
  kind: Kind,
}

#[derive(Clone, Debug, PartialEq)]
enum Kind {
  Ascii,
  Latin1,
  Utf8,
  LossyFallback,
}

impl Default for CharacterSets {
  fn default() -> Self {
    Self { kind: Kind::Utf8 }
  }
}

impl CharacterSets {
  /// Builds a `CharacterSets` from the raw code strings of a
  /// `SpecificCharacterSet` element (its individual values, already split on
  /// the `\` value delimiter). Returns the resulting decoder along with any
  /// warnings about unsupported character sets that had to fall back to
  /// lossy UTF-8.
  ///
  /// An empty `codes` list means no character set was declared, which per
  /// the standard means the default repertoire, `ISO_IR 6`.
  ///
  pub fn from_code_strings(codes: &[String]) -> (Self, Vec<String>) {
    let trimmed: Vec<&str> = codes.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect();

    if trimmed.is_empty() {
      return (Self { kind: Kind::Ascii }, Vec::new());
    }

    if trimmed.len() > 1 {
      let warning = format!(
        "Multiple specific character sets declared ({}); code-extension \
         switching between them isn't supported, decoding as UTF-8 instead",
        trimmed.join(", ")
      );
      return (Self { kind: Kind::LossyFallback }, vec![warning]);
    }

    match trimmed[0] {
      "ISO_IR 6" | "ISO 2022 IR 6" => (Self { kind: Kind::Ascii }, Vec::new()),
      "ISO_IR 100" | "ISO 2022 IR 100" => (Self { kind: Kind::Latin1 }, Vec::new()),
      "ISO_IR 192" => (Self { kind: Kind::Utf8 }, Vec::new()),
      other => {
        let warning = format!(
          "Specific character set '{other}' isn't one of the directly supported \
           repertoires (ISO_IR 6, ISO_IR 100, ISO_IR 192); decoding as UTF-8 instead"
        );
        (Self { kind: Kind::LossyFallback }, vec![warning])
      }
    }
  }

  /// Decodes `bytes` into a `String` under the active character set.
  ///
  pub fn decode(&self, bytes: &[u8]) -> String {
    match self.kind {
      Kind::Ascii => bytes.iter().map(|b| if *b <= 0x7F { *b as char } else { '\u{FFFD}' }).collect(),
      Kind::Latin1 => bytes.iter().map(|b| *b as char).collect(),
      Kind::Utf8 | Kind::LossyFallback => utf8::decode_lossy(bytes),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_to_ascii_when_unspecified_test() {
    let (character_sets, warnings) = CharacterSets::from_code_strings(&[]);
    assert!(warnings.is_empty());
    assert_eq!(character_sets.decode(b"Hello"), "Hello");
  }

  #[test]
  fn iso_ir_192_decodes_utf8_test() {
    let (character_sets, warnings) =
      CharacterSets::from_code_strings(&["ISO_IR 192".to_string()]);
    assert!(warnings.is_empty());
    assert_eq!(character_sets.decode("Büchner".as_bytes()), "Büchner");
  }

  #[test]
  fn iso_ir_100_decodes_latin1_test() {
    let (character_sets, warnings) =
      CharacterSets::from_code_strings(&["ISO_IR 100".to_string()]);
    assert!(warnings.is_empty());
    assert_eq!(character_sets.decode(&[0xE9]), "\u{00E9}");
  }

  #[test]
  fn unsupported_character_set_falls_back_with_warning_test() {
    let (character_sets, warnings) =
      CharacterSets::from_code_strings(&["ISO 2022 IR 87".to_string()]);
    assert_eq!(warnings.len(), 1);
    assert_eq!(character_sets.decode(b"abc"), "abc");
  }

  #[test]
  fn multiple_character_sets_falls_back_with_warning_test() {
    let (_, warnings) = CharacterSets::from_code_strings(&[
      "ISO 2022 IR 100".to_string(),
      "ISO 2022 IR 126".to_string(),
    ]);
    assert_eq!(warnings.len(), 1);
  }
}
