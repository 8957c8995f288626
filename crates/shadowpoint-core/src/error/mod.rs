//! Error types for the checkpoint engine
//!
//! Every fallible engine operation returns [`CheckpointResult`]. Variants carry
//! a human-readable message plus optional context, and expose a stable
//! `error_code()` for programmatic handling.

mod constructors;
mod conversions;
mod types;


pub use types::{CheckpointError, CheckpointResult, ResultExt};
