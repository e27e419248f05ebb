//! The accumulation pipeline.

pub mod accumulator;
pub mod dedup;

pub use accumulator::{Accumulator, CancelHandle};
pub use dedup::SeenSet;
