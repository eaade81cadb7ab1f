//! Prompt construction for expression recognition.

use super::model::Variables;

/// Placeholder replaced by the serialized variable bindings.
const VARIABLES_SLOT: &str = "{variables}";

/// Instruction template sent alongside the normalized image.
const EXPRESSION_PROMPT: &str = r#"
Analyze the following handwritten mathematical expression from the provided image and evaluate it based on the given variables.

Variables: {variables}

Image: [Please refer to the attached image]

Please provide the expression, the result, and indicate whether it involves an assignment.

Respond in the following JSON format:

[
    {
        "expr": "expression as string",
        "result": "result as string",
        "assign": true or false
    },
    ...
]
"#;

/// Serialize the bindings as compact JSON (`{}` when empty).
pub fn serialize_variables(vars: &Variables) -> String {
    // A map of JSON values always serializes.
    serde_json::to_string(vars).unwrap_or_else(|_| "{}".to_string())
}

/// Build the full prompt for the given variable bindings.
pub fn build_prompt(vars: &Variables) -> String {
    EXPRESSION_PROMPT.replacen(VARIABLES_SLOT, &serialize_variables(vars), 1)
}
