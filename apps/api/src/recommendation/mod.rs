//! Job recommendation: one model call over a bounded pool of active jobs,
//! with a deterministic fallback when the reply can't be trusted.

pub mod handlers;
pub mod parse;
pub mod pipeline;
pub mod prompts;
