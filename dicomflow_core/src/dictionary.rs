//! A small, embedded data element dictionary.
//!
//! This is a deliberately partial stand-in for the full PS3.6 data
//! dictionary (out of scope for this crate, see `DESIGN.md`): it covers the
//! File Meta Information group, the handful of tags referenced directly by
//! this crate's own logic (character set, timezone, pixel/waveform data),
//! and enough identifying tags to make error messages and tests readable.
//! Anything not listed here resolves to a VR of `UN` and a generic name.

use crate::tag::Tag;
use crate::vr::ValueRepresentation;

struct Entry {
  tag: Tag,
  vr: ValueRepresentation,
  name: &'static str,
}

use ValueRepresentation as VR;

static ENTRIES: &[Entry] = &[
  Entry { tag: Tag::new(0x0002, 0x0000), vr: VR::UnsignedLong, name: "FileMetaInformationGroupLength" },
  Entry { tag: Tag::new(0x0002, 0x0001), vr: VR::OtherByteString, name: "FileMetaInformationVersion" },
  Entry { tag: Tag::new(0x0002, 0x0002), vr: VR::UniqueIdentifier, name: "MediaStorageSOPClassUID" },
  Entry { tag: Tag::new(0x0002, 0x0003), vr: VR::UniqueIdentifier, name: "MediaStorageSOPInstanceUID" },
  Entry { tag: Tag::new(0x0002, 0x0010), vr: VR::UniqueIdentifier, name: "TransferSyntaxUID" },
  Entry { tag: Tag::new(0x0002, 0x0012), vr: VR::UniqueIdentifier, name: "ImplementationClassUID" },
  Entry { tag: Tag::new(0x0002, 0x0013), vr: VR::ShortString, name: "ImplementationVersionName" },
  Entry { tag: Tag::new(0x0002, 0x0016), vr: VR::ApplicationEntity, name: "SourceApplicationEntityTitle" },
  Entry { tag: Tag::new(0x0008, 0x0005), vr: VR::CodeString, name: "SpecificCharacterSet" },
  Entry { tag: Tag::new(0x0008, 0x0012), vr: VR::Date, name: "InstanceCreationDate" },
  Entry { tag: Tag::new(0x0008, 0x0013), vr: VR::Time, name: "InstanceCreationTime" },
  Entry { tag: Tag::new(0x0008, 0x0016), vr: VR::UniqueIdentifier, name: "SOPClassUID" },
  Entry { tag: Tag::new(0x0008, 0x0018), vr: VR::UniqueIdentifier, name: "SOPInstanceUID" },
  Entry { tag: Tag::new(0x0008, 0x0020), vr: VR::Date, name: "StudyDate" },
  Entry { tag: Tag::new(0x0008, 0x0030), vr: VR::Time, name: "StudyTime" },
  Entry { tag: Tag::new(0x0008, 0x0060), vr: VR::CodeString, name: "Modality" },
  Entry { tag: Tag::new(0x0008, 0x0090), vr: VR::PersonName, name: "ReferringPhysicianName" },
  Entry { tag: Tag::new(0x0008, 0x0100), vr: VR::ShortString, name: "CodeValue" },
  Entry { tag: Tag::new(0x0008, 0x0201), vr: VR::ShortString, name: "TimezoneOffsetFromUTC" },
  Entry { tag: Tag::new(0x0008, 0x1115), vr: VR::Sequence, name: "ReferencedSeriesSequence" },
  Entry { tag: Tag::new(0x0010, 0x0010), vr: VR::PersonName, name: "PatientName" },
  Entry { tag: Tag::new(0x0010, 0x0020), vr: VR::LongString, name: "PatientID" },
  Entry { tag: Tag::new(0x0010, 0x0030), vr: VR::Date, name: "PatientBirthDate" },
  Entry { tag: Tag::new(0x0010, 0x0040), vr: VR::CodeString, name: "PatientSex" },
  Entry { tag: Tag::new(0x0010, 0x1010), vr: VR::AgeString, name: "PatientAge" },
  Entry { tag: Tag::new(0x0020, 0x000D), vr: VR::UniqueIdentifier, name: "StudyInstanceUID" },
  Entry { tag: Tag::new(0x0020, 0x000E), vr: VR::UniqueIdentifier, name: "SeriesInstanceUID" },
  Entry { tag: Tag::new(0x0020, 0x0013), vr: VR::IntegerString, name: "InstanceNumber" },
  Entry { tag: Tag::new(0x0028, 0x0002), vr: VR::UnsignedShort, name: "SamplesPerPixel" },
  Entry { tag: Tag::new(0x0028, 0x0100), vr: VR::UnsignedShort, name: "BitsAllocated" },
  Entry { tag: Tag::new(0x0028, 0x0103), vr: VR::UnsignedShort, name: "PixelRepresentation" },
  Entry { tag: Tag::new(0x5400, 0x1010), vr: VR::OtherWordString, name: "WaveformData" },
  Entry { tag: Tag::new(0x7FE0, 0x0010), vr: VR::OtherWordString, name: "PixelData" },
  Entry { tag: Tag::new(0xFFFE, 0xE000), vr: VR::Unknown, name: "Item" },
  Entry { tag: Tag::new(0xFFFE, 0xE00D), vr: VR::Unknown, name: "ItemDelimitationItem" },
  Entry { tag: Tag::new(0xFFFE, 0xE0DD), vr: VR::Unknown, name: "SequenceDelimitationItem" },
];

/// Looks up a tag's human-readable name. Unrecognized tags return
/// `"Unknown"`.
///
pub fn tag_name(tag: Tag) -> &'static str {
  ENTRIES
    .iter()
    .find(|e| e.tag == tag)
    .map(|e| e.name)
    .unwrap_or("Unknown")
}

/// Looks up a tag's VR, as used when a transfer syntax is Implicit VR
/// Little Endian and the VR isn't present in the stream. Unrecognized tags
/// fall back to `UN`, matching PS3.5's guidance for unrecognized private and
/// standard tags.
///
pub fn vr_of(tag: Tag) -> ValueRepresentation {
  if tag.is_private_creator() {
    return ValueRepresentation::LongString;
  }

  ENTRIES
    .iter()
    .find(|e| e.tag == tag)
    .map(|e| e.vr)
    .unwrap_or(ValueRepresentation::Unknown)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tag_name_test() {
    assert_eq!(tag_name(Tag::new(0x0010, 0x0010)), "PatientName");
    assert_eq!(tag_name(Tag::new(0x0009, 0x0001)), "Unknown");
  }

  #[test]
  fn vr_of_test() {
    assert_eq!(vr_of(Tag::new(0x0008, 0x0020)), ValueRepresentation::Date);
    assert_eq!(vr_of(Tag::new(0x0009, 0x0001)), ValueRepresentation::Unknown);
  }
}
