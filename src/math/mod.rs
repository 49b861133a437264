//! Mathematical utilities: differencing, lag matrices and least squares.

pub mod lag;
pub mod ols;

pub use lag::*;
pub use ols::*;
