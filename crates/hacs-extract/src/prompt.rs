//! LLM prompt engineering for structured extraction
//!
//! Prompt size is a load-bearing property, not a style preference: every
//! character rendered here is paid for on every window of every run. The
//! full structured prompt stays under two thousand characters for typical
//! types; the window-scoped variant stays under one thousand characters
//! and twenty lines.

use crate::fields::compact_extractable_fields;
use hacs_model::Extractable;

/// Maximum hint sentences included in a descriptive prompt
const MAX_HINTS: usize = 4;

/// Renders extraction prompts for resource types
pub struct PromptBuilder {
    max_fields: usize,
}

impl PromptBuilder {
    /// Create a builder with the given per-type field budget.
    pub fn new(max_fields: usize) -> Self {
        Self { max_fields }
    }

    /// Build the full structured-output prompt for one resource type.
    ///
    /// Combines the caller's instruction, the compact field list, model
    /// hints (when `use_descriptive_schema` is set), a cardinality
    /// directive, and the output-shape block.
    pub fn build_structured_prompt(
        &self,
        base_prompt: &str,
        model: &dyn Extractable,
        is_array: bool,
        max_items: usize,
        use_descriptive_schema: bool,
    ) -> String {
        let fields = compact_extractable_fields(model, self.max_fields);
        let mut prompt = String::new();

        prompt.push_str(base_prompt.trim());
        prompt.push_str("\n\n");

        prompt.push_str(&format!("Resource type: {}\n", model.resource_type()));
        prompt.push_str("Fields to extract (omit any without evidence):\n");
        for field in &fields {
            prompt.push_str(&format!("- {}\n", field));
        }

        if use_descriptive_schema {
            let hints = self.relevant_hints(model, &fields);
            if !hints.is_empty() {
                prompt.push_str("\nGuidance:\n");
                for hint in hints {
                    prompt.push_str(&format!("- {}\n", hint));
                }
            }
        }

        prompt.push('\n');
        if is_array {
            prompt.push_str(&format!(
                "Respond with a JSON array of at most {} objects.\n",
                max_items
            ));
        } else {
            prompt.push_str("Respond with a single JSON object.\n");
        }

        prompt.push_str(OUTPUT_SHAPE);
        prompt
    }

    /// Build the compact window-scoped prompt for one resource type.
    ///
    /// The window text itself is appended by the runner; this is only the
    /// instruction block.
    pub fn build_window_prompt(&self, model: &dyn Extractable) -> String {
        let fields = compact_extractable_fields(model, self.max_fields);
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "Extract {} records from the text below.\n",
            model.resource_type()
        ));
        prompt.push_str(&format!("ALLOWED KEYS: {}\n", fields.join(", ")));
        prompt.push_str("RULES:\n");
        prompt.push_str("- Only output keys from the allowed list.\n");
        prompt.push_str("- Omit fields with no evidence in the text.\n");
        prompt.push_str(
            "- Cite the exact supporting span as \"citation\" with \"start_pos\"/\"end_pos\" offsets into the text.\n",
        );
        prompt.push_str("Return ONLY a JSON array, one object per record:\n");
        prompt.push_str(
            "[{\"record\": {\"<key>\": \"<value>\"}, \"citation\": \"...\", \"start_pos\": 0, \"end_pos\": 0}]\n",
        );
        prompt
    }

    /// Hints plausibly relevant to the selected fields: a hint survives if
    /// it mentions the resource type or any selected field name (word
    /// stems included, so "dose" matches "dosage").
    fn relevant_hints(&self, model: &dyn Extractable, fields: &[String]) -> Vec<String> {
        let type_lower = model.resource_type().to_lowercase();
        model
            .llm_hints()
            .into_iter()
            .filter(|hint| {
                let hint_lower = hint.to_lowercase();
                hint_lower.contains(&type_lower)
                    || fields.iter().any(|f| {
                        let stem: String =
                            f.to_lowercase().chars().take_while(|c| *c != '_').collect();
                        !stem.is_empty() && hint_lower.contains(&stem)
                    })
            })
            .take(MAX_HINTS)
            .collect()
    }
}

const OUTPUT_SHAPE: &str = r#"Each object has the shape:
{"record": {"<field>": "<value>"}, "citation": "exact source text", "start_pos": 0, "end_pos": 0}
Offsets are character positions within the provided text.
Return ONLY valid JSON, no markdown code blocks, no explanations."#;
