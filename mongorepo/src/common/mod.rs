//! Shared constants and document helpers used by the filter engine and both backends.

mod constants;
pub mod util;

pub use constants::*;
