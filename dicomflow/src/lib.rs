//! dicomflow is a library for reading, transforming, validating, and writing
//! DICOM Part 10 (P10) files, the binary format used to store and transmit
//! DICOM medical imaging data.

/// Core data model: tags, value representations, transfer syntaxes, tag
/// paths, values, and the `Elements` data set tree.
///
/// This module is a re-export of the `dicomflow_core` crate.
///
pub mod core {
  pub use dicomflow_core::*;
}

/// Character set decoding for the string-valued elements of a data set.
///
/// This module is a re-export of the `dicomflow_charset` crate.
///
pub mod charset {
  pub use dicomflow_charset::*;
}

/// Streaming reader and writer for the DICOM P10 binary format, plus the
/// flow framework, transforms, and validator built on top of it.
///
/// This module is a re-export of the `dicomflow_p10` crate.
///
pub mod p10 {
  pub use dicomflow_p10::*;
}

#[cfg(test)]
mod integration_tests;
