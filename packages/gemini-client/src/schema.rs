//! Type-safe response schemas for Gemini structured output.
//!
//! Gemini's `responseSchema` accepts a subset of OpenAPI 3.0. The `schemars`
//! output is rewritten to fit it:
//!
//! 1. `$ref` references are inlined (Gemini has no definitions section)
//! 2. `"type": ["string", "null"]` becomes `"type": "string", "nullable": true`
//! 3. Unsupported keywords are removed (`$schema`, `definitions`, `title`,
//!    `additionalProperties`, `format`)
//!
//! # Example
//!
//! ```rust,ignore
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//! use gemini_client::StructuredOutput;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct Contact {
//!     name: String,
//!     email: Option<String>,
//! }
//!
//! let schema = Vec::<Contact>::gemini_schema();
//! ```

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Keywords Gemini rejects in a response schema.
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "$schema",
    "definitions",
    "title",
    "additionalProperties",
    "format",
];

/// Trait for types that can be used as Gemini structured output.
///
/// Automatically implemented for any type that implements `JsonSchema + DeserializeOwned`.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// Generate a Gemini-compatible response schema for this type.
    fn gemini_schema() -> Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        let definitions = value.get("definitions").cloned();
        if let Some(defs) = definitions {
            inline_refs(&mut value, &defs);
        }

        rewrite_for_gemini(&mut value);
        value
    }

    /// Get the schema name for this type.
    fn type_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

/// Recursively replace `{"$ref": "#/definitions/X"}` with the definition of X.
fn inline_refs(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(ref_path)) = map.get("$ref").cloned() {
                let name = ref_path.trim_start_matches("#/definitions/");
                if let Some(def) = definitions.get(name) {
                    *value = def.clone();
                    inline_refs(value, definitions);
                    return;
                }
            }

            for (_, v) in map.iter_mut() {
                inline_refs(v, definitions);
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                inline_refs(item, definitions);
            }
        }
        _ => {}
    }
}

/// Strip unsupported keywords and collapse nullable type unions.
fn rewrite_for_gemini(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in UNSUPPORTED_KEYWORDS {
                map.remove(*key);
            }

            if let Some(Value::Array(types)) = map.get("type").cloned() {
                let non_null: Vec<Value> = types
                    .iter()
                    .filter(|t| t.as_str() != Some("null"))
                    .cloned()
                    .collect();
                if non_null.len() < types.len() {
                    map.insert("nullable".to_string(), Value::Bool(true));
                }
                if let Some(first) = non_null.into_iter().next() {
                    map.insert("type".to_string(), first);
                }
            }

            // `properties` is keyed by field name; recursing into it must not
            // strip fields that happen to be called "title" or "format".
            if let Some(Value::Object(props)) = map.get_mut("properties") {
                for (_, v) in props.iter_mut() {
                    rewrite_for_gemini(v);
                }
            }
            for (key, v) in map.iter_mut() {
                if key != "properties" {
                    rewrite_for_gemini(v);
                }
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                rewrite_for_gemini(item);
            }
        }
        _ => {}
    }
}
