//! Core domain types
//!
//! Data models shared across the engine: entity categories and spans,
//! chunks, and the domain error type.

pub mod chunk;
pub mod entity;
pub mod errors;

pub use chunk::{Chunk, CHUNK_SEPARATOR};
pub use entity::{EntityCategory, EntitySpan, KeyClass};
pub use errors::VeilError;
