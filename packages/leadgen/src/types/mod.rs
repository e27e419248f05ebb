//! Data types for leads, tools, profiles and runs.

pub mod config;
pub mod lead;
pub mod profile;
pub mod run;
pub mod tool;
