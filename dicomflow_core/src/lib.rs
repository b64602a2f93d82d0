//! Core data model for the dicomflow DICOM streaming library: tags, value
//! representations, transfer syntaxes, tag paths, values, and the
//! `Elements` data set tree that a parsed stream is folded into.

pub mod bytes;
pub mod data_error;
pub mod dataset;
pub mod dictionary;
pub mod element;
pub mod error;
pub mod tag;
pub mod tag_path;
pub mod tag_tree;
pub mod transfer_syntax;
pub mod utils;
pub mod value;
pub mod value_multiplicity;
pub mod vr;

pub use bytes::SharedBytes;
pub use data_error::DataError;
pub use dataset::{ElementSet, Elements, Fragments, Item};
pub use element::Element;
pub use error::DcmfxError;
pub use tag::Tag;
pub use tag_path::{TagPath, TagPathNode};
pub use tag_tree::{TagTree, TagTreeNode};
pub use transfer_syntax::{Endianness, TransferSyntax, VrSerialization};
pub use value::Value;
pub use value_multiplicity::ValueMultiplicity;
pub use vr::{ValueKind, ValueLengthSize, ValueRepresentation};
