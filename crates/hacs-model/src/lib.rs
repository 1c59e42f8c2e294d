//! HACS Model Layer
//!
//! This crate contains the resource-type metadata that the extraction core
//! consumes. It deliberately knows nothing about prompts, windows, or
//! concurrency — it only describes *what* can be extracted, not *how*.
//!
//! ## Key Concepts
//!
//! - **Extractable**: the capability trait every extraction target must
//!   implement — field list, required fields, and natural-language hints
//! - **ResourceSpec**: a concrete, serializable descriptor implementing
//!   `Extractable`, built with a fluent builder
//! - **Catalog**: built-in clinical resource descriptors (Patient,
//!   Observation, Condition, ...) modeled loosely on FHIR shapes
//! - **LlmProvider**: the minimal async invocation contract the extraction
//!   core requires from any language-model backend
//!
//! ## Architecture
//!
//! Descriptors are static metadata: pure values with no I/O. Provider
//! implementations live in `hacs-llm`; orchestration lives in
//! `hacs-extract`. Both depend on this crate, never the other way around.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod extractable;
pub mod provider;
pub mod resource;

// Re-exports for convenience
pub use extractable::Extractable;
pub use provider::{LlmProvider, LlmResponse};
pub use resource::{FieldDef, ResourceSpec};
