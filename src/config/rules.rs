//! Root rule table
//!
//! The first path segment below the root selects a global constraint that is
//! injected into every prompt for that subtree.

use crate::tree::path::first_segment;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rule used when no table entry matches
pub const GENERIC_RULE: &str = "General: derive meaning only from content.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootRule {
    /// Top-level folder name, matched exactly
    pub segment: String,
    pub rule: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootRules {
    #[serde(default = "default_fallback")]
    pub fallback: String,

    #[serde(default = "default_rules")]
    pub rules: Vec<RootRule>,
}

fn default_fallback() -> String {
    GENERIC_RULE.to_string()
}

fn default_rules() -> Vec<RootRule> {
    vec![
        RootRule {
            segment: "Business".to_string(),
            rule: "Strictly commercial, financial, legal, strategic, and operational content. \
                   EXCLUDES: personal, family, domestic, medical, hobby, intimate, or unrelated materials."
                .to_string(),
        },
        RootRule {
            segment: "Private".to_string(),
            rule: "Strictly personal, family, health, education, hobbies, and private financial documents. \
                   EXCLUDES: corporate, client, revenue-generating, or organizational materials."
                .to_string(),
        },
    ]
}

impl Default for RootRules {
    fn default() -> Self {
        Self {
            fallback: default_fallback(),
            rules: default_rules(),
        }
    }
}

impl RootRules {
    /// Rule for a top-level segment, or the fallback
    pub fn lookup(&self, segment: Option<&str>) -> &str {
        segment
            .and_then(|segment| {
                self.rules
                    .iter()
                    .find(|r| r.segment == segment)
            })
            .map(|r| r.rule.as_str())
            .unwrap_or(&self.fallback)
    }

    /// Rule governing `path` within the tree rooted at `root`
    pub fn rule_for(&self, root: &Path, path: &Path) -> &str {
        self.lookup(first_segment(root, path).as_deref())
    }
}
