//! Compact field selection for prompts
//!
//! Prompts cannot carry a resource type's full field tree without blowing
//! the size budget, so each type is reduced to a bounded field subset
//! before prompt rendering: required fields first, optional fields filling
//! whatever slots remain.

use hacs_model::Extractable;
use tracing::debug;

/// Field name that discriminates resource types; never surfaced to the LLM
pub const DISCRIMINATOR_FIELD: &str = "resource_type";

/// Select at most `max_fields` field names for a prompt.
///
/// Required fields come first, in declaration order; optional fields fill
/// the remaining slots, also in declaration order. The discriminator field
/// is always excluded. When required fields alone exceed the cap, the
/// selection is the first `max_fields` required fields in declaration
/// order — deterministic, but worth a debug log since the prompt can no
/// longer name every required field.
///
/// Pure function of the descriptor's static metadata.
pub fn compact_extractable_fields(model: &dyn Extractable, max_fields: usize) -> Vec<String> {
    if max_fields == 0 {
        return Vec::new();
    }

    let declared = model.extractable_fields();
    let required = model.required_extractables();
    let is_required = |name: &str| required.iter().any(|r| r == name);

    let mut selected: Vec<String> = Vec::new();

    for name in declared.iter().filter(|n| is_required(n)) {
        if selected.len() == max_fields {
            break;
        }
        if name == DISCRIMINATOR_FIELD || selected.contains(name) {
            continue;
        }
        selected.push(name.clone());
    }

    if selected.len() == max_fields && required.len() > max_fields {
        debug!(
            resource_type = model.resource_type(),
            required = required.len(),
            max_fields,
            "required fields exceed the field budget; truncated in declaration order"
        );
        return selected;
    }

    for name in &declared {
        if selected.len() == max_fields {
            break;
        }
        if name == DISCRIMINATOR_FIELD || is_required(name) || selected.contains(name) {
            continue;
        }
        selected.push(name.clone());
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use hacs_model::{catalog, ResourceSpec};

    #[test]
    fn test_required_fields_come_first() {
        let spec = ResourceSpec::new("X")
            .optional("a")
            .required("b")
            .optional("c")
            .required("d");
        assert_eq!(
            compact_extractable_fields(&spec, 10),
            vec!["b", "d", "a", "c"]
        );
    }

    #[test]
    fn test_cap_is_respected() {
        let spec = catalog::observation();
        let fields = compact_extractable_fields(&spec, 3);
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0], "code");
        assert_eq!(fields[1], "value_string");
    }

    #[test]
    fn test_discriminator_is_excluded() {
        let spec = ResourceSpec::new("X")
            .required("resource_type")
            .required("a")
            .optional("b");
        let fields = compact_extractable_fields(&spec, 10);
        assert!(!fields.contains(&"resource_type".to_string()));
        assert_eq!(fields, vec!["a", "b"]);
    }

    #[test]
    fn test_required_overflow_truncates_in_declaration_order() {
        let spec = ResourceSpec::new("X")
            .required("a")
            .required("b")
            .required("c")
            .optional("d");
        assert_eq!(compact_extractable_fields(&spec, 2), vec!["a", "b"]);
    }

    #[test]
    fn test_all_required_present_when_budget_allows() {
        for spec in catalog::all() {
            let required = spec.required_extractables();
            let fields = compact_extractable_fields(&spec, 8);
            for name in &required {
                assert!(fields.contains(name), "{} missing required {}", fields.len(), name);
            }
        }
    }

    #[test]
    fn test_selection_is_idempotent() {
        let spec = catalog::condition();
        let first = compact_extractable_fields(&spec, 4);
        let second = compact_extractable_fields(&spec, 4);
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_budget_yields_empty() {
        let spec = catalog::patient();
        assert!(compact_extractable_fields(&spec, 0).is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use hacs_model::ResourceSpec;
    use proptest::prelude::*;

    fn arbitrary_spec() -> impl Strategy<Value = ResourceSpec> {
        proptest::collection::vec(("[a-z]{1,8}", any::<bool>()), 1..12).prop_map(|fields| {
            let mut spec = ResourceSpec::new("Arbitrary");
            for (name, required) in fields {
                spec = if required {
                    spec.required(name)
                } else {
                    spec.optional(name)
                };
            }
            spec
        })
    }

    proptest! {
        /// Property: output length never exceeds the cap and the
        /// discriminator never appears
        #[test]
        fn test_field_cap_property(spec in arbitrary_spec(), max_fields in 1usize..16) {
            let fields = compact_extractable_fields(&spec, max_fields);
            prop_assert!(fields.len() <= max_fields);
            prop_assert!(!fields.iter().any(|f| f == DISCRIMINATOR_FIELD));
        }

        /// Property: every required field is present whenever the budget
        /// allows all of them
        #[test]
        fn test_required_coverage_property(spec in arbitrary_spec(), max_fields in 1usize..16) {
            use hacs_model::Extractable;
            let required: Vec<String> = spec
                .required_extractables()
                .into_iter()
                .filter(|r| r != DISCRIMINATOR_FIELD)
                .collect();
            // Duplicate names collapse in the selection, so only check
            // specs with distinct field names
            let mut distinct = required.clone();
            distinct.sort();
            distinct.dedup();
            prop_assume!(distinct.len() == required.len());

            let fields = compact_extractable_fields(&spec, max_fields);
            if required.len() <= max_fields {
                for name in &required {
                    prop_assert!(fields.contains(name));
                }
            }
        }

        /// Property: selection is a pure function of its inputs
        #[test]
        fn test_idempotence_property(spec in arbitrary_spec(), max_fields in 1usize..16) {
            let first = compact_extractable_fields(&spec, max_fields);
            let second = compact_extractable_fields(&spec, max_fields);
            prop_assert_eq!(first, second);
        }
    }
}
