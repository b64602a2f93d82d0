//! Reads, transforms, and writes DICOM Part 10 (P10) binary data: the
//! format used to store and transmit DICOM medical imaging information.
//!
//! Three pieces compose to do this:
//!
//! - [`reader::Reader`] turns raw bytes into a stream of [`part::Part`]s.
//! - [`flow`] and [`transform`] let that stream be filtered and rewritten
//!   without materializing it in memory.
//! - [`dataset_builder::DatasetBuilder`] folds a part stream into an
//!   in-memory `Elements` tree, and [`writer::Writer`] serializes a part
//!   stream (or a tree flattened via `Elements::to_parts`) back to bytes.

pub mod dataset_builder;
pub mod error;
pub mod flow;
pub mod part;
pub mod read_config;
pub mod reader;
pub mod transform;
pub mod validator;
pub mod write_config;
pub mod writer;

mod internal;

pub use dataset_builder::DatasetBuilder;
pub use error::{ReadError, TransformError, ValidationError, WriteError};
pub use flow::{Flow, Pipeline};
pub use part::Part;
pub use read_config::ReadConfig;
pub use reader::Reader;
pub use validator::Validator;
pub use write_config::WriteConfig;
pub use writer::Writer;
