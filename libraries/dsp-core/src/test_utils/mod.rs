//! Test signal generation and measurement
//!
//! Mono helpers shared by unit tests, integration tests, benches and the
//! render tool. Compiled only with the `test-utils` feature.

pub mod analysis;
pub mod signals;

pub use analysis::*;
pub use signals::*;
