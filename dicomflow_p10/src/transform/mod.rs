//! Transforms: flows that filter, normalize, or otherwise rewrite a part
//! stream, built over the behaviors in [`crate::flow::behaviors`].

mod bulk_data_filter;
mod collect_and_buffer;
mod deflate_flow;
mod explicit_vr_le_normalizer;
mod fmi_filter;
mod fmi_group_length_recompute;
mod group_length_filter;
mod modify_insert;
mod sequence_length_normalizer;
mod tag_filter;
mod utf8_normalizer;

pub use bulk_data_filter::BulkDataFilter;
pub use collect_and_buffer::CollectAndBuffer;
pub use deflate_flow::DeflateFlow;
pub use explicit_vr_le_normalizer::{EXPLICIT_VR_LITTLE_ENDIAN_UID, ExplicitVrLeNormalizer};
pub use fmi_filter::FmiFilter;
pub use fmi_group_length_recompute::FmiGroupLengthRecompute;
pub use group_length_filter::GroupLengthFilter;
pub use modify_insert::{Insertion, Modification, ModifyInsert};
pub use sequence_length_normalizer::SequenceLengthNormalizer;
pub use tag_filter::{Blacklist, Whitelist};
pub use utf8_normalizer::Utf8Normalizer;
