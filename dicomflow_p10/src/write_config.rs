/// The implementation class UID written into the File Meta Information of
/// serialized DICOM P10 data, unless overridden.
///
pub const DICOMFLOW_IMPLEMENTATION_CLASS_UID: &str = "1.2.826.0.1.3680043.10.1182.1";

/// The implementation version name written into the File Meta Information
/// of serialized DICOM P10 data, unless overridden.
///
pub const DICOMFLOW_IMPLEMENTATION_VERSION_NAME: &str = "DICOMFLOW";

/// Configuration used when writing DICOM P10 data.
///
#[derive(Clone, Debug, PartialEq)]
pub struct WriteConfig {
  pub(crate) implementation_class_uid: String,
  pub(crate) implementation_version_name: String,
  pub(crate) zlib_compression_level: u32,
}

impl Default for WriteConfig {
  fn default() -> Self {
    Self {
      implementation_class_uid: DICOMFLOW_IMPLEMENTATION_CLASS_UID.to_string(),
      implementation_version_name: DICOMFLOW_IMPLEMENTATION_VERSION_NAME.to_string(),
      zlib_compression_level: 6,
    }
  }
}

impl WriteConfig {
  /// The implementation class UID included in the File Meta Information of
  /// serialized DICOM P10 data.
  ///
  pub fn implementation_class_uid(mut self, value: String) -> Self {
    self.implementation_class_uid = value;
    self
  }

  /// The implementation version name included in the File Meta Information
  /// of serialized DICOM P10 data.
  ///
  pub fn implementation_version_name(mut self, value: String) -> Self {
    self.implementation_version_name = value;
    self
  }

  /// The zlib compression level used when the active transfer syntax is
  /// deflated. Ranges 0 (no compression) through 9 (best compression,
  /// slowest). Default 6.
  ///
  pub fn zlib_compression_level(mut self, value: u32) -> Self {
    self.zlib_compression_level = value.clamp(0, 9);
    self
  }
}
