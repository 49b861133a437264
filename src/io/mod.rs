//! Input/output helpers.
//!
//! - export view -> CSV (`export`)

pub mod export;

pub use export::*;
