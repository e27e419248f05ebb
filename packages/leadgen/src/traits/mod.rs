//! Core trait abstractions for the lead accumulator.
//!
//! These traits define the collaborators an application injects into an
//! [`Accumulator`](crate::Accumulator): where leads come from, who may run,
//! and where usage is recorded.

pub mod quota;
pub mod source;
pub mod store;
pub mod usage;
