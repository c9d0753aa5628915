//! Generation provider implementations for Librarian.
//!
//! All providers implement the `librarian_core::GenerationProvider` trait.

pub mod anthropic;

pub use anthropic::AnthropicProvider;
