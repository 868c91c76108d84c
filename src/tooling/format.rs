//! Format build reports, store statistics, and personas as text.

use crate::builder::{BuildReport, RefinementReport};
use crate::persona::{FolderPersona, NodeType};
use crate::store::{PersonaRecord, StoreStats};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Format a completed run as human-readable text.
pub fn format_build_report_text(report: &BuildReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Build")));
    out.push_str(&format!("  Root: {}\n", report.root.display()));
    out.push_str(&format!("  Duration: {} ms\n\n", report.duration_ms));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Folders", "Generated", "Cached", "Placeholders", "Fallbacks"]);
    table.add_row(vec![
        report.folders.to_string(),
        report.generated.to_string(),
        report.cache_hits.to_string(),
        report.placeholders.to_string(),
        report.fallbacks.to_string(),
    ]);
    out.push_str(&format!("{}\n", table));

    if let Some(ref refinement) = report.refinement {
        out.push('\n');
        out.push_str(&format_refinement_report_text(refinement));
    }
    out
}

/// Format a refinement pass as human-readable text.
pub fn format_refinement_report_text(report: &RefinementReport) -> String {
    format!(
        "{}\n\n  Visited: {}\n  Refined: {}\n",
        format_section_heading("Refinement"),
        report.visited,
        report.refined
    )
}

/// Format store statistics as human-readable text.
pub fn format_stats_text(stats: &StoreStats, store_path: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Persona Store")));
    out.push_str(&format!("  Store path: {}\n", store_path));
    out.push_str(&format!("  Total personas: {}\n\n", stats.total));
    if stats.total == 0 {
        out.push_str("No personas stored. Run `mapmaker build` first.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Type", "Personas"]);
    for (node_type, count) in &stats.breakdown {
        table.add_row(vec![node_type.clone(), count.to_string()]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

/// Optional sections of the detailed persona listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListView {
    pub queries: bool,
    pub constraints: bool,
    pub derived: bool,
    pub meta: bool,
}

impl ListView {
    pub fn full() -> Self {
        Self {
            queries: true,
            constraints: true,
            derived: true,
            meta: true,
        }
    }

    pub fn is_detailed(&self) -> bool {
        self.queries || self.constraints || self.derived || self.meta
    }
}

/// Characters of a description shown in the summary table
const TABLE_DESCRIPTION_CHARS: usize = 60;

/// Characters of a parent constraint shown in the detailed listing
const LIST_CONSTRAINT_CHARS: usize = 100;

/// Format stored records as a table, or as per-folder blocks when `view` asks for details.
pub fn format_persona_list_text(records: &[PersonaRecord], view: &ListView) -> String {
    if records.is_empty() {
        return "No personas stored.\n".to_string();
    }
    if view.is_detailed() {
        return format_persona_details_text(records, view);
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Path", "Type", "Label", "Description"]);
    for record in records {
        table.add_row(vec![
            record.path.clone(),
            record.node_type.to_string(),
            record.document.persona.short_label.clone(),
            shorten(&record.document.persona.description, TABLE_DESCRIPTION_CHARS),
        ]);
    }
    format!("{}\n\nTotal: {} personas.\n", table, records.len())
}

fn format_persona_details_text(records: &[PersonaRecord], view: &ListView) -> String {
    let mut out = format!("{}\n", format_section_heading("Folder Personas"));
    for record in records {
        let doc = &record.document;
        out.push_str(&format!("\n{}\n", record.path.bold()));
        out.push_str(&format!("  Label: {}\n", doc.persona.short_label));
        out.push_str(&format!("  Description: {}\n", doc.persona.description));

        if view.meta {
            out.push_str(&format!(
                "  Meta: type={}, depth={}, confidence={:.2}, language={}\n",
                doc.node_type(),
                doc.meta.depth,
                doc.meta.confidence,
                doc.meta.language
            ));
        }
        if view.derived && !doc.persona.derived_from.is_empty() {
            out.push_str(&format!(
                "  Derived from: {}\n",
                doc.persona.derived_from.join(", ")
            ));
        }
        if view.constraints {
            if let Some(ref constraint) = doc.constraints.parent_constraint {
                out.push_str(&format!(
                    "  Parent constraint: {}\n",
                    shorten(constraint, LIST_CONSTRAINT_CHARS)
                ));
            }
            if !doc.persona.negative_constraints.is_empty() {
                out.push_str(&format!(
                    "  Negative constraints: {}\n",
                    doc.persona.negative_constraints.join(", ")
                ));
            }
        }
        if view.queries {
            if !doc.vector_data.hypothetical_user_queries.is_empty() {
                out.push_str("  Queries:\n");
                for (i, query) in doc.vector_data.hypothetical_user_queries.iter().enumerate() {
                    out.push_str(&format!("    {}. {}\n", i + 1, query));
                }
            }
            if let Some(ref model) = doc.vector_data.embedding_model {
                let status = if doc.vector_data.embedding.is_some() {
                    "yes"
                } else {
                    "no"
                };
                out.push_str(&format!("  Embedding: {} ({})\n", status, model));
            }
        }
    }
    out.push_str(&format!("\nTotal folders: {}\n", records.len()));
    out
}

fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

/// Format one persona as human-readable text.
pub fn format_persona_text(persona: &FolderPersona) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n\n",
        format_section_heading(&persona.persona.short_label)
    ));
    out.push_str(&format!("  Path: {}\n", persona.path()));
    out.push_str(&format!(
        "  Type: {} (depth {})\n",
        persona.node_type(),
        persona.meta.depth
    ));
    out.push_str(&format!("  Confidence: {:.2}\n", persona.meta.confidence));
    out.push_str(&format!("  Rule: {}\n", persona.constraints.root_rule));
    if let Some(ref constraint) = persona.constraints.parent_constraint {
        out.push_str(&format!("  Parent constraint: {}\n", constraint));
    }
    out.push_str(&format!("\n{}\n", persona.persona.description));

    if !persona.persona.derived_from.is_empty() {
        let label = match persona.node_type() {
            NodeType::Leaf => "Sampled files",
            NodeType::Branch => "Derived from",
        };
        out.push_str(&format!(
            "\n{}: {}\n",
            label,
            persona.persona.derived_from.join(", ")
        ));
    }
    if !persona.persona.negative_constraints.is_empty() {
        out.push_str(&format!(
            "Excludes: {}\n",
            persona.persona.negative_constraints.join("; ")
        ));
    }
    if !persona.audit.errors.is_empty() {
        out.push_str(&format!("\n{}\n", format_section_heading("Audit")));
        for error in &persona.audit.errors {
            out.push_str(&format!("  - {}\n", error));
        }
    }
    out
}
