//! Combo data components: segments, chain links, the key sequencer.

pub mod chain;
pub mod keys;
pub mod segment;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod chain_tests;

// Re-export all components
pub use chain::*;
pub use keys::*;
pub use segment::*;
