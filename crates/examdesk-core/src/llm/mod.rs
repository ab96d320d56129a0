//! Generative model access
//!
//! Provides:
//! - The `GenerationTransport` seam and its Gemini HTTP implementation
//! - `KeyRing`, which spreads requests over several API keys and falls back
//!   to the next key when one is rate-limited or failing
//! - Prompt assembly for study questions

mod gemini;
mod keyring;
mod prompt;
mod traits;

pub use gemini::GeminiTransport;
pub use keyring::{
    mask_key, Completion, CredentialSlot, KeyRing, KeyRingReport, SlotHealth, SlotReport,
    SlotStats,
};
pub use prompt::build_prompt;
pub use traits::*;
