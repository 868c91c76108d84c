//! Structured response parsing with explicit defaults
//!
//! The response object is validated field by field. A missing or malformed
//! field is replaced with its default and noted; the other fields are kept.

use serde_json::{Map, Value};

/// Validated persona fields plus notes on every default that was substituted
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPersona {
    pub short_label: String,
    pub description: String,
    pub negative_constraints: Vec<String>,
    pub hypothetical_user_queries: Vec<String>,
    pub outliers_found: usize,
    pub notes: Vec<String>,
}

impl ParsedPersona {
    /// Persona fields for fallback content, taken verbatim and never parsed
    ///
    /// Fallback content echoes the prompt, so any JSON inside it came from
    /// sampled files rather than a model.
    pub fn from_fallback(content: &str, folder_name: &str, description_chars: usize) -> Self {
        let mut notes = Vec::new();
        let description =
            non_empty_or_placeholder(truncate(content.trim(), description_chars), &mut notes);
        Self {
            short_label: folder_name.to_string(),
            description,
            negative_constraints: Vec::new(),
            hypothetical_user_queries: Vec::new(),
            outliers_found: 0,
            notes,
        }
    }
}

/// Parse model output into persona fields
///
/// `folder_name` is the label default; `description_chars` caps the raw-text
/// description used when the model gave none.
pub fn parse_response(content: &str, folder_name: &str, description_chars: usize) -> ParsedPersona {
    let mut notes = Vec::new();
    let raw = truncate(content.trim(), description_chars);

    let object = match extract_json_object(content) {
        Some(json) => match serde_json::from_str::<Map<String, Value>>(json) {
            Ok(object) => Some(object),
            Err(e) => {
                notes.push(format!("Malformed structured response ({}); used raw text.", e));
                None
            }
        },
        None => {
            notes.push("Unstructured response; used raw text as description.".to_string());
            None
        }
    };

    let Some(object) = object else {
        return ParsedPersona {
            short_label: folder_name.to_string(),
            description: non_empty_or_placeholder(raw, &mut notes),
            negative_constraints: Vec::new(),
            hypothetical_user_queries: Vec::new(),
            outliers_found: 0,
            notes,
        };
    };

    let short_label = match text_field(&object, "short_label") {
        Ok(Some(label)) => label,
        Ok(None) => {
            notes.push("Response missing short_label; used folder name.".to_string());
            folder_name.to_string()
        }
        Err(kind) => {
            notes.push(malformed("short_label", kind, "used folder name"));
            folder_name.to_string()
        }
    };
    let description = match text_field(&object, "description") {
        Ok(Some(description)) => truncate(&description, description_chars),
        Ok(None) => {
            notes.push("Response missing description; used raw text.".to_string());
            non_empty_or_placeholder(raw, &mut notes)
        }
        Err(kind) => {
            notes.push(malformed("description", kind, "used raw text"));
            non_empty_or_placeholder(raw, &mut notes)
        }
    };
    let negative_constraints = list_field(&object, "negative_constraints").unwrap_or_else(|kind| {
        notes.push(malformed("negative_constraints", kind, "used empty list"));
        Vec::new()
    });
    let hypothetical_user_queries =
        list_field(&object, "hypothetical_user_queries").unwrap_or_else(|kind| {
            notes.push(malformed("hypothetical_user_queries", kind, "used empty list"));
            Vec::new()
        });
    let outliers_found = match object.get("outliers_found") {
        None | Some(Value::Null) => 0,
        Some(value) => match value.as_u64() {
            Some(count) => count as usize,
            None => {
                notes.push(malformed("outliers_found", value_kind(value), "used 0"));
                0
            }
        },
    };

    ParsedPersona {
        short_label,
        description,
        negative_constraints,
        hypothetical_user_queries,
        outliers_found,
        notes,
    }
}

/// Trimmed non-empty text, `Ok(None)` when absent or blank, `Err(kind)` on a wrong type
fn text_field(object: &Map<String, Value>, key: &str) -> Result<Option<String>, &'static str> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(clean(text)),
        Some(other) => Err(value_kind(other)),
    }
}

/// List of trimmed non-empty strings; absent means empty
fn list_field(object: &Map<String, Value>, key: &str) -> Result<Vec<String>, &'static str> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => Ok(clean(text)),
                other => Err(value_kind(other)),
            })
            .filter_map(Result::transpose)
            .collect(),
        Some(other) => Err(value_kind(other)),
    }
}

fn malformed(field: &str, kind: &str, default: &str) -> String {
    format!("Malformed {} in response (got {}); {}.", field, kind, default)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Slice from the first `{` to the last `}`, ignoring any Markdown fences
fn extract_json_object(content: &str) -> Option<&str> {
    let body = strip_code_fences(content);
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (start < end).then(|| &body[start..=end])
}

fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn clean(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn non_empty_or_placeholder(raw: String, notes: &mut Vec<String>) -> String {
    if raw.is_empty() {
        notes.push("Empty response; no description available.".to_string());
        "No description available.".to_string()
    } else {
        raw
    }
}
