//! Examdesk Core Library
//!
//! Core functionality for the examdesk study assistant.
//!
//! # Features
//! - Generative model client that rotates across several API keys and
//!   falls back when one is rate-limited or failing
//! - Per-key health and usage statistics
//! - Inverted-index search over uploaded exam documents with subject,
//!   date, file type and exam type filters
//! - Suggestions and match highlighting

pub mod config;
pub mod error;
pub mod llm;
pub mod search;
pub mod store;

pub use config::{Config, GenerationSettings, KeyRingConfig};
pub use error::{Error, ExamDeskError, Result};
pub use llm::{
    Completion, CredentialSlot, GeminiTransport, Generation, GenerationRequest,
    GenerationTransport, KeyRing, KeyRingReport, SlotHealth, SlotReport, SlotStats,
    TransportError, Usage,
};
pub use search::{
    highlight, AvailableFilters, DateRange, Document, ExamInfo, FilterSet, SearchIndex,
};
pub use store::DocumentStore;

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "examdesk";

/// Default data directory name
pub const DATA_DIR_NAME: &str = "examdesk";
