//! Record source implementations.

mod gemini;

pub use gemini::{GeminiLeadSource, GeminiSourceConfig, LeadCandidate};
