//! DICOM value multiplicity (VM).

/// Describes DICOM value multiplicity, i.e. the number of values allowed to
/// be present in a data element. `min` is always at least 1, and `max` (if
/// present) is always greater than or equal to `min`.
///
#[derive(Clone, Debug, PartialEq)]
pub struct ValueMultiplicity {
  pub min: u32,
  pub max: Option<u32>,
}

impl ValueMultiplicity {
  /// Returns whether `n` lies within this value multiplicity's range.
  ///
  pub fn contains(&self, n: usize) -> bool {
    n >= self.min as usize && n <= self.max.unwrap_or(u32::MAX) as usize
  }
}

impl std::fmt::Display for ValueMultiplicity {
  /// Formats a value multiplicity as a human-readable string, e.g. `"1"`,
  /// `"1-3"`, or `"2-n"`.
  ///
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    if self.min == 1 && self.max == Some(1) {
      return write!(f, "1");
    }

    let max = match self.max {
      Some(max) => max.to_string(),
      None => "n".to_string(),
    };

    write!(f, "{}-{}", self.min, max)
  }
}
