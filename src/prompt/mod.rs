//! Prompt construction and response parsing
//!
//! Builds the LEAF and BRANCH prompts sent to the generation provider and turns
//! whatever comes back into validated persona fields. Parsing never fails: any
//! field the model omitted or mistyped is replaced with a defined default and the
//! substitution is reported so the builder can record it in the audit trail.

pub mod response;
pub mod templates;

pub use response::{parse_response, ParsedPersona};
pub use templates::{
    branch_prompt, leaf_prompt, persona_schema, summarize_loose_files, ChildSummary,
    PromptContext, Snippet, BRANCH_SYSTEM_PROMPT, LEAF_SYSTEM_PROMPT, LOOSE_FILES_MARKER,
};
