//! # Librarian Core
//!
//! Domain types, traits, and error definitions for the Librarian document
//! processing system. This crate has **zero framework dependencies** — it
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The generation capability is defined as a trait here; implementations live
//! in `librarian-providers`. This enables:
//! - Swapping providers via configuration
//! - Easy testing with scripted mock providers
//! - Clean dependency graph (all crates depend inward on core)

pub mod chunk;
pub mod document;
pub mod error;
pub mod provider;
pub mod task;

// Re-export key types at crate root for ergonomics
pub use chunk::{BoundaryKind, Chunk};
pub use document::{Document, StructureKind};
pub use error::{ChunkError, Error, PlanError, ProviderError, Result, SessionError, SpecialistError};
pub use provider::{GenerationProvider, GenerationRequest};
pub use task::{SpecialistCategory, SpecialistResult, Task};
