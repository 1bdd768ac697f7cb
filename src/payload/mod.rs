//! Payload codec module
//!
//! Converts a filter tree to and from the nested wire payload handed to the
//! query endpoint. Only valid nodes make it into an emitted payload.

mod codec;
mod wire;


pub use codec::*;
pub use wire::*;
