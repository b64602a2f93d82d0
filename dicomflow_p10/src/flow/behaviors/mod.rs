//! Decorators that each add one invariant to an inner [`crate::flow::Flow`]:
//! fragment/sequence nesting state, guaranteed value and delimitation
//! events, start/end sentinels, and tag path tracking.

mod guaranteed_delimitation_events;
mod guaranteed_value_event;
mod in_fragments;
mod in_sequence;
mod start_end_events;
mod tag_path_tracking;

pub use guaranteed_delimitation_events::GuaranteedDelimitationEvents;
pub use guaranteed_value_event::GuaranteedValueEvent;
pub use in_fragments::{FragmentsTracker, InFragments};
pub use in_sequence::InSequence;
pub use start_end_events::{StartEndEvents, StartEventMarker, EndEventMarker};
pub use tag_path_tracking::{PathTracker, TagPathTracking};
