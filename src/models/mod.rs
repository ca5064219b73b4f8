//! Models Module - Data Structures & Errors
//!
//! Single source of truth for domain types and error codes.

pub mod errors;
pub mod types;

pub use errors::*;
pub use types::*;
