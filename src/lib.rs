//! ctfgen library exports.
//!
//! The binary in `main.rs` is a thin CLI over these modules; integration
//! tests drive them directly.

pub mod commands;
pub mod common;
pub mod compose;
pub mod config;
pub mod generate;
pub mod preflight;
pub mod process;
pub mod template;
pub mod timing;
