//! Trailstop Ports
//!
//! Port definitions (traits) for the trailing-stop strategy.
//! These define the boundary between the engine and its outbound collaborators.

mod publisher;
mod recording;

pub use publisher::Publisher;
pub use recording::RecordingPublisher;
