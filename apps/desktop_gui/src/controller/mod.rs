//! Controller layer: runtime-to-UI events and their routing into the connection controller.

pub mod events;
pub mod orchestration;
