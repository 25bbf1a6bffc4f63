//! Bridge between the tokio network runtime and the egui thread.

pub mod runtime;
pub mod transport;
