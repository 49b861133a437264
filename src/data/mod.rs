//! Remote data access and series assembly.
//!
//! - `worldbank`: connectivity probe + paged fetch against the indicators API
//! - `assemble`: raw rows -> ascending, deduplicated `TimeSeries`

pub mod assemble;
pub mod worldbank;

pub use assemble::*;
pub use worldbank::*;
