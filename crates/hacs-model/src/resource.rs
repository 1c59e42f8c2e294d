//! Concrete resource-type descriptor
//!
//! `ResourceSpec` is the value-object form of an extraction target: a named
//! schema with ordered fields and optional hint strings. It is the only
//! `Extractable` implementation this workspace ships, but the extraction
//! core accepts any implementor of the trait.

use crate::extractable::Extractable;
use serde::{Deserialize, Serialize};

/// One declared field of a resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name as it should appear in extracted records
    pub name: String,

    /// Whether the field must be surfaced to the LLM when the budget allows
    pub required: bool,
}

/// A named, ordered field schema describing one kind of extractable record.
///
/// Field order is significant: the field selector truncates in declaration
/// order when a prompt's field budget is smaller than the schema.
///
/// # Examples
///
/// ```
/// use hacs_model::{Extractable, ResourceSpec};
///
/// let spec = ResourceSpec::new("Observation")
///     .required("code")
///     .required("value_string")
///     .optional("unit")
///     .hint("Report lab values with their units when present.");
///
/// assert_eq!(spec.resource_type(), "Observation");
/// assert_eq!(spec.required_extractables(), vec!["code", "value_string"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSpec {
    resource_type: String,
    fields: Vec<FieldDef>,
    hints: Vec<String>,
}

impl ResourceSpec {
    /// Create an empty descriptor for the given resource type.
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            fields: Vec::new(),
            hints: Vec::new(),
        }
    }

    /// Append a required field.
    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            required: true,
        });
        self
    }

    /// Append an optional field.
    pub fn optional(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            required: false,
        });
        self
    }

    /// Append a hint sentence.
    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// The declared fields, in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Validate the descriptor's internal consistency.
    pub fn validate(&self) -> Result<(), String> {
        if self.resource_type.is_empty() {
            return Err("resource_type is empty".to_string());
        }
        if self.fields.is_empty() {
            return Err(format!("{}: no fields declared", self.resource_type));
        }
        for (idx, field) in self.fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(format!("{}: field {} has empty name", self.resource_type, idx));
            }
            if self.fields[..idx].iter().any(|f| f.name == field.name) {
                return Err(format!(
                    "{}: duplicate field '{}'",
                    self.resource_type, field.name
                ));
            }
        }
        Ok(())
    }
}

impl Extractable for ResourceSpec {
    fn resource_type(&self) -> &str {
        &self.resource_type
    }

    fn extractable_fields(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    fn required_extractables(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.clone())
            .collect()
    }

    fn llm_hints(&self) -> Vec<String> {
        self.hints.clone()
    }
}
