//! MediaMend Library
//!
//! Repairs damaged video files through an escalating ladder of external
//! transcoder invocations (lossless remux, full re-encode, raw stream
//! extraction), validating every artifact with a read-only diagnostic pass,
//! and merges numbered multi-part recordings with a concat or crossfade
//! filter graph.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{Health, MediaFile, MergeMode, MergeResult, RepairOutcome};
pub use error::{MendError, MendResult};
