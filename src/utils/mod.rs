//! Common utilities and helpers

pub mod fs;
pub mod logging;
pub mod path;

pub use path::OutputLayout;
