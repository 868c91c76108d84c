//! LEAF and BRANCH prompt templates

use crate::provider::ResponseSchema;
use serde_json::json;

pub const LEAF_SYSTEM_PROMPT: &str = "You are Map Maker, a semantic file system classifier.\n\
Obey path constraints strictly.\n\
Reject outliers. Never hallucinate details.\n\
Return concise JSON persona fields.";

pub const BRANCH_SYSTEM_PROMPT: &str = "You are Map Maker, a semantic aggregator.\n\
You synthesize meaning from child folders only.\n\
Never invent data not present in children or path constraints.\n\
Return concise JSON persona fields.";

/// `derived_from` entry standing for a BRANCH folder's own files
pub const LOOSE_FILES_MARKER: &str = "LooseFiles";

/// Loose file names listed before the summary is cut off
const LOOSE_FILE_NAMES: usize = 6;

const LEAF_TASK: &str =
    "TASK: Identify the semantic category and produce concise JSON persona fields.";
const BRANCH_TASK: &str = "TASK: Write a parent-level definition that unifies these children into a precise category header.";

/// Location and constraint lines shared by both prompt kinds
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub absolute_path: String,
    pub hierarchy: Vec<String>,
    pub root_rule: String,
    pub path_context: String,
    pub parent_constraint: Option<String>,
}

impl PromptContext {
    fn header(&self) -> String {
        let mut header = format!(
            "Absolute path: {}\nHierarchy: {:?}\nGLOBAL CONSTRAINT: {}\n",
            self.absolute_path, self.hierarchy, self.root_rule
        );
        // Ahead of the file list so it survives prompt truncation
        if let Some(constraint) = &self.parent_constraint {
            header.push_str(&format!("PARENT CONSTRAINT: {}\n", constraint));
        }
        header.push_str(&format!("PATH CONTEXT: {}\n", self.path_context));
        header
    }
}

/// Extracted text of one sampled file
#[derive(Debug, Clone, PartialEq)]
pub struct Snippet {
    pub name: String,
    pub text: String,
}

/// What a BRANCH prompt needs to know about one child folder
#[derive(Debug, Clone, PartialEq)]
pub struct ChildSummary {
    pub name: String,
    pub label: String,
    pub description: String,
}

pub fn leaf_prompt(context: &PromptContext, snippets: &[Snippet], snippet_chars: usize) -> String {
    let files = snippets
        .iter()
        .map(|s| {
            let text: String = s.text.chars().take(snippet_chars).collect();
            format!("# {}\n{}", s.name, text)
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}FILES:\n{}\n{}", context.header(), files, LEAF_TASK)
}

pub fn branch_prompt(
    context: &PromptContext,
    children: &[ChildSummary],
    loose_files: &[String],
) -> String {
    let mut lines: Vec<String> = children
        .iter()
        .map(|c| {
            if c.label == c.name {
                format!("{}: {}", c.name, c.description)
            } else {
                format!("{} ({}): {}", c.name, c.label, c.description)
            }
        })
        .collect();
    if !loose_files.is_empty() {
        lines.push(format!(
            "{}: {}",
            LOOSE_FILES_MARKER,
            summarize_loose_files(loose_files)
        ));
    }
    format!(
        "{}CHILDREN:\n{}\n{}",
        context.header(),
        lines.join("\n"),
        BRANCH_TASK
    )
}

/// One-line summary of a folder's direct files
pub fn summarize_loose_files(names: &[String]) -> String {
    if names.is_empty() {
        return "No loose files".to_string();
    }
    if names.len() <= LOOSE_FILE_NAMES {
        return format!("Loose files: {}", names.join(", "));
    }
    format!(
        "Loose files sample: {} (+more)",
        names[..LOOSE_FILE_NAMES].join(", ")
    )
}

/// JSON schema hint for the persona fields the model should return
pub fn persona_schema() -> ResponseSchema {
    ResponseSchema {
        name: "folder_persona".to_string(),
        schema: json!({
            "type": "object",
            "properties": {
                "short_label": { "type": "string" },
                "description": { "type": "string" },
                "negative_constraints": { "type": "array", "items": { "type": "string" } },
                "hypothetical_user_queries": { "type": "array", "items": { "type": "string" } },
                "outliers_found": { "type": "integer", "minimum": 0 }
            },
            "required": ["short_label", "description"]
        }),
    }
}
