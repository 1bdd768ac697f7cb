//! Payload utilities: copying, equality, merging and rendering

mod display;
mod equality;
mod merge;

#[cfg(test)]
mod property_tests;

pub use display::*;
pub use equality::*;
pub use merge::*;
