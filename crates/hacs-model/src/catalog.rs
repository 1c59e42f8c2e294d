//! Built-in clinical resource descriptors
//!
//! A small catalog of FHIR-shaped resource types used by tests and callers
//! that do not bring their own descriptors. Field sets are intentionally
//! compact: these describe what an LLM can plausibly ground in free text,
//! not the full FHIR element tree.

use crate::resource::ResourceSpec;

/// Patient demographics as stated in the document.
pub fn patient() -> ResourceSpec {
    ResourceSpec::new("Patient")
        .required("full_name")
        .optional("birth_date")
        .optional("gender")
        .optional("phone")
        .optional("address")
        .hint("Use the patient's name exactly as written, including titles.")
        .hint("Dates use YYYY-MM-DD; leave birth_date out if only an age is given.")
}

/// A single measurement, vital sign, or lab result.
pub fn observation() -> ResourceSpec {
    ResourceSpec::new("Observation")
        .required("code")
        .required("value_string")
        .optional("unit")
        .optional("effective_date")
        .optional("interpretation")
        .hint("code is the measurement name as written (e.g. 'blood pressure').")
        .hint("Keep value and unit separate: value_string '120/80', unit 'mmHg'.")
        .hint("interpretation is the clinician's reading (normal, elevated, critical).")
}

/// A diagnosis or clinical problem.
pub fn condition() -> ResourceSpec {
    ResourceSpec::new("Condition")
        .required("code")
        .optional("clinical_status")
        .optional("onset_date")
        .optional("severity")
        .optional("body_site")
        .hint("code is the condition name in the clinician's wording.")
        .hint("clinical_status is one of: active, recurrence, resolved, inactive.")
}

/// A medication the patient is taking or has been prescribed.
pub fn medication_statement() -> ResourceSpec {
    ResourceSpec::new("MedicationStatement")
        .required("medication")
        .optional("dosage")
        .optional("frequency")
        .optional("route")
        .optional("status")
        .hint("Keep dose and frequency separate: dosage '500 mg', frequency 'twice daily'.")
        .hint("route is oral, IV, topical, etc., only when stated.")
}

/// An allergy or intolerance with its reaction, when described.
pub fn allergy_intolerance() -> ResourceSpec {
    ResourceSpec::new("AllergyIntolerance")
        .required("substance")
        .optional("reaction")
        .optional("severity")
        .optional("recorded_date")
        .hint("substance is the allergen as written (drug, food, environmental).")
        .hint("Only record severity when the document states it explicitly.")
}

/// Every built-in descriptor, for callers extracting all supported types.
pub fn all() -> Vec<ResourceSpec> {
    vec![
        patient(),
        observation(),
        condition(),
        medication_statement(),
        allergy_intolerance(),
    ]
}
