//! CLI command handlers

pub mod ask;
pub mod docs;
pub mod keys;
pub mod search;
