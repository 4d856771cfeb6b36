//! Accelerating word pacing for rapid serial visual presentation.

mod engine;
pub mod ramp;
mod timer;

pub use engine::{Pacer, PlaybackPhase, PlaybackSnapshot, SubscriptionId};
pub use ramp::{START_WPM, ramp_length, rate_for_index};
