//! Capability trait for extraction targets
//!
//! Any resource-type descriptor implementing `Extractable` is eligible as a
//! structured-extraction target. This replaces runtime attribute probing on
//! arbitrary model objects with a compile-time-checkable contract: the
//! extraction core never asks a descriptor for anything not declared here.

/// A resource-type descriptor the extraction core can target.
///
/// Implementations must be pure metadata: every method returns the same
/// value for the life of the descriptor, and none of them perform I/O.
pub trait Extractable {
    /// The discriminator name of this resource type (e.g. `"Observation"`).
    fn resource_type(&self) -> &str;

    /// All declared field names, in declaration order.
    ///
    /// May include the discriminator field itself; the field selector is
    /// responsible for excluding it from prompts.
    fn extractable_fields(&self) -> Vec<String>;

    /// The subset of fields that must be surfaced to the LLM whenever the
    /// field budget allows, in declaration order.
    fn required_extractables(&self) -> Vec<String>;

    /// Natural-language guidance for extracting this resource type.
    ///
    /// Hints are short free-text sentences (units, coding conventions,
    /// disambiguation notes). Consumers may include all, some, or none.
    fn llm_hints(&self) -> Vec<String>;
}
