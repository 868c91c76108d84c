//! Persona synthesis shared by both passes

use super::{Counters, PersonaBuilder};
use crate::persona::{Audit, Constraints, FolderPersona, Meta, NodeType, Persona, VectorData};
use crate::prompt::{
    branch_prompt, leaf_prompt, parse_response, persona_schema, ChildSummary, ParsedPersona,
    PromptContext, Snippet, BRANCH_SYSTEM_PROMPT, LEAF_SYSTEM_PROMPT, LOOSE_FILES_MARKER,
};
use crate::provider::GenerationRequest;
use crate::tree::path::{build_path_context, display_name, hierarchy};
use crate::tree::FileEntry;
use crate::types::SYMLINK_LOOP_HASH;
use std::path::Path;
use tracing::{debug, warn};

/// Evidence a persona is synthesized from
pub(super) enum Evidence<'a> {
    /// Textual direct files of a LEAF folder
    Leaf { files: &'a [FileEntry] },
    /// Child personas and direct file names of a BRANCH folder
    Branch {
        children: Vec<ChildSummary>,
        loose_files: Vec<String>,
        textual_count: usize,
    },
}

/// Identity of the persona being synthesized
pub(super) struct Identity<'a> {
    pub path: &'a Path,
    pub depth: usize,
    pub node_type: NodeType,
    pub structural_hash: Option<String>,
}

impl PersonaBuilder {
    /// Generate a persona from evidence, persist it and return it
    pub(super) async fn synthesize(
        &self,
        identity: Identity<'_>,
        evidence: Evidence<'_>,
        parent_constraint: Option<String>,
        mut audit_errors: Vec<String>,
    ) -> FolderPersona {
        let root = &self.settings.root;
        let path = identity.path;
        let root_rule = self.settings.root_rules.rule_for(root, path).to_string();
        let path_context = build_path_context(root, path);
        let context = PromptContext {
            absolute_path: path.display().to_string(),
            hierarchy: hierarchy(path),
            root_rule: root_rule.clone(),
            path_context: path_context.clone(),
            parent_constraint: parent_constraint.clone(),
        };
        let processing = &self.settings.processing;

        let (system_prompt, user_prompt, derived_from, sample_count, thin_evidence) = match evidence
        {
            Evidence::Leaf { files } => {
                let samples = self.sampler.sample(files, processing.sample_limit);
                let mut snippets = Vec::with_capacity(samples.len());
                let mut extracted = 0;
                for sample in &samples {
                    let (text, errors) = self.sampler.extract(&sample.path);
                    if !text.trim().is_empty() {
                        extracted += 1;
                    }
                    audit_errors.extend(errors);
                    snippets.push(Snippet {
                        name: sample.name.clone(),
                        text,
                    });
                }
                let derived_from = samples.iter().map(|s| s.name.clone()).collect();
                (
                    LEAF_SYSTEM_PROMPT,
                    leaf_prompt(&context, &snippets, processing.snippet_chars),
                    derived_from,
                    samples.len(),
                    extracted == 0,
                )
            }
            Evidence::Branch {
                children,
                loose_files,
                textual_count,
            } => {
                let mut derived_from: Vec<String> =
                    children.iter().map(|c| c.name.clone()).collect();
                if !loose_files.is_empty() {
                    derived_from.push(LOOSE_FILES_MARKER.to_string());
                }
                (
                    BRANCH_SYSTEM_PROMPT,
                    branch_prompt(&context, &children, &loose_files),
                    derived_from,
                    textual_count,
                    children.is_empty() && textual_count == 0,
                )
            }
        };

        let request = GenerationRequest::new(system_prompt, user_prompt).with_schema(persona_schema());
        let outcome = self.provider.generate(&request).await;
        Counters::bump(&self.counters.generated);
        if let Some(err) = &outcome.fallback_error {
            Counters::bump(&self.counters.fallbacks);
            warn!(path = %path.display(), error = %err, "Using fallback persona");
            audit_errors.push(format!("Generation failed; fallback used: {}", err));
        }

        let folder_name = display_name(path);
        let limit = processing.description_chars;
        let parsed = if outcome.is_fallback() {
            ParsedPersona::from_fallback(&outcome.content, &folder_name, limit)
        } else {
            parse_response(&outcome.content, &folder_name, limit)
        };
        audit_errors.extend(parsed.notes);

        let confidence = if outcome.is_fallback() || thin_evidence {
            processing.low_confidence
        } else {
            self.settings.schema.confidence
        };

        let mut persona = FolderPersona {
            schema_version: self.settings.schema.version.clone(),
            meta: Meta {
                path: path.to_string_lossy().to_string(),
                node_type: identity.node_type,
                depth: identity.depth,
                language: self.settings.schema.language.clone(),
                confidence,
                structural_hash: identity.structural_hash,
            },
            constraints: Constraints {
                path_context,
                root_rule,
                parent_constraint,
            },
            persona: Persona {
                short_label: parsed.short_label,
                description: parsed.description,
                derived_from,
                negative_constraints: parsed.negative_constraints,
            },
            vector_data: VectorData {
                hypothetical_user_queries: parsed.hypothetical_user_queries,
                embedding_model: None,
                embedding: None,
            },
            audit: Audit {
                sample_count,
                outliers_found: parsed.outliers_found,
                errors: audit_errors,
            },
        };

        if let Some(model) = self.provider.embedding_model() {
            persona.vector_data.embedding = self.provider.embed(&persona.embedding_text()).await;
            persona.vector_data.embedding_model = Some(model);
        }

        debug!(
            path = %persona.path(),
            node_type = %persona.node_type(),
            model = %outcome.model,
            "Synthesized persona"
        );
        self.persist(&persona);
        persona
    }

    /// Stand-in for a directory whose real path was already reached
    pub(super) fn placeholder(&self, path: &Path, depth: usize) -> FolderPersona {
        let root = &self.settings.root;
        let label = path
            .file_name()
            .map(|_| display_name(path))
            .unwrap_or_else(|| "Symlink".to_string());
        let persona = FolderPersona {
            schema_version: self.settings.schema.version.clone(),
            meta: Meta {
                path: path.to_string_lossy().to_string(),
                node_type: NodeType::Branch,
                depth,
                language: self.settings.schema.language.clone(),
                confidence: self.settings.processing.low_confidence,
                structural_hash: Some(SYMLINK_LOOP_HASH.to_string()),
            },
            constraints: Constraints {
                path_context: build_path_context(root, path),
                root_rule: self.settings.root_rules.rule_for(root, path).to_string(),
                parent_constraint: None,
            },
            persona: Persona {
                short_label: label,
                description: "Skipped because it resolves to a previously visited path."
                    .to_string(),
                derived_from: Vec::new(),
                negative_constraints: Vec::new(),
            },
            vector_data: VectorData::default(),
            audit: Audit {
                sample_count: 0,
                outliers_found: 0,
                errors: vec!["Symlink loop detected; skipped.".to_string()],
            },
        };
        Counters::bump(&self.counters.placeholders);
        warn!(path = %path.display(), "Symlink loop detected; skipped");
        self.persist(&persona);
        persona
    }
}
