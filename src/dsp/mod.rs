//! Effect Pipeline Module
//!
//! The lazy controller layered on top of the sample engine: a typed
//! parameter set plus the dirty-flag-gated pipeline that derives the edit
//! buffer from the base buffer.

mod params;
mod pipeline;

pub use params::EffectParams;
pub use pipeline::EffectPipeline;
