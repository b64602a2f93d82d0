//! Work with the DICOM `PN` (Person Name) value representation.
//!
//! A person name value has up to three component groups separated by `=`:
//! alphabetic, ideographic, and phonetic. Each component group has up to
//! five components separated by `^`: family name, given name, middle name,
//! prefix, and suffix. Ref: PS3.5 6.2.1.1.

use unicode_segmentation::UnicodeSegmentation;

use crate::data_error::DataError;

/// A single component group of a person name.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PersonNameComponents {
  pub family_name: String,
  pub given_name: String,
  pub middle_name: String,
  pub prefix: String,
  pub suffix: String,
}

impl PersonNameComponents {
  fn from_str(s: &str) -> Self {
    let mut parts = s.split('^');

    Self {
      family_name: parts.next().unwrap_or("").to_string(),
      given_name: parts.next().unwrap_or("").to_string(),
      middle_name: parts.next().unwrap_or("").to_string(),
      prefix: parts.next().unwrap_or("").to_string(),
      suffix: parts.next().unwrap_or("").to_string(),
    }
  }

  fn to_component_string(&self) -> String {
    [
      &self.family_name,
      &self.given_name,
      &self.middle_name,
      &self.prefix,
      &self.suffix,
    ]
    .iter()
    .map(|s| s.as_str())
    .collect::<Vec<_>>()
    .join("^")
    .trim_end_matches('^')
    .to_string()
  }

  fn is_empty(&self) -> bool {
    self.family_name.is_empty()
      && self.given_name.is_empty()
      && self.middle_name.is_empty()
      && self.prefix.is_empty()
      && self.suffix.is_empty()
  }
}

/// A structured person name decoded from, or to be encoded as, a `PN` value.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StructuredPersonName {
  pub alphabetic: PersonNameComponents,
  pub ideographic: PersonNameComponents,
  pub phonetic: PersonNameComponents,
}

impl StructuredPersonName {
  /// Decodes a single `PN` value's already-charset-decoded text into a
  /// structured person name.
  ///
  pub fn from_str(s: &str) -> Result<Self, DataError> {
    if s.graphemes(true).count() > 3 * 64 {
      return Err(DataError::new_value_invalid(
        "Person name is too long".to_string(),
      ));
    }

    let mut groups = s.split('=');

    Ok(Self {
      alphabetic: PersonNameComponents::from_str(groups.next().unwrap_or("")),
      ideographic: PersonNameComponents::from_str(groups.next().unwrap_or("")),
      phonetic: PersonNameComponents::from_str(groups.next().unwrap_or("")),
    })
  }

  /// Encodes this structured person name back to its raw text form.
  ///
  pub fn to_string(&self) -> String {
    let groups = [&self.alphabetic, &self.ideographic, &self.phonetic];

    let last_non_empty = groups.iter().rposition(|g| !g.is_empty());

    match last_non_empty {
      None => String::new(),
      Some(last) => groups[..=last]
        .iter()
        .map(|g| g.to_component_string())
        .collect::<Vec<_>>()
        .join("="),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn from_str_test() {
    let name = StructuredPersonName::from_str("Yamada^Tarou=山田^太郎=やまだ^たろう").unwrap();

    assert_eq!(name.alphabetic.family_name, "Yamada");
    assert_eq!(name.alphabetic.given_name, "Tarou");
    assert_eq!(name.ideographic.family_name, "山田");
    assert_eq!(name.phonetic.given_name, "たろう");
  }

  #[test]
  fn round_trip_test() {
    let s = "Smith^John^^Dr.^Jr.";
    let name = StructuredPersonName::from_str(s).unwrap();
    assert_eq!(name.to_string(), s);
  }

  #[test]
  fn single_group_test() {
    let name = StructuredPersonName::from_str("Smith^John").unwrap();
    assert_eq!(name.to_string(), "Smith^John");
    assert!(name.ideographic.is_empty());
  }
}
