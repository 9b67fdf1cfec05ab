use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::{
    pom_document::{ElementText, PomDocument, PomError},
    rewrite_rule::{AppliedKind, AppliedRewrite, RewriteRule, Role, RuleError, RuleOutcome},
    rule_table::RuleTable,
};

/// Tag rewritten by the version-bump mode
pub const VERSION_TAG: &str = "version";

/// What a run does to every POM it touches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformMode {
    /// Rename coordinates into their diff variants
    Diff,
    /// Overwrite every `<version>` with the given string
    Version(String),
}

impl TransformMode {
    pub fn is_diff(&self) -> bool {
        matches!(self, TransformMode::Diff)
    }
}

/// Rewrites POM documents according to a rule table
pub struct PomRewriteEngine {
    table: RuleTable,
}

/// Result of rewriting one POM
#[derive(Debug, Clone)]
pub struct RewriteResult {
    pub document: PomDocument,
    pub applied_rewrites: Vec<AppliedRewrite>,
    pub warnings: Vec<RewriteWarning>,
}

/// Warning generated while rewriting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteWarning {
    pub tag: String,
    pub message: String,
    pub warning_type: RewriteWarningType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteWarningType {
    /// Matched element had no text to rewrite
    EmptyElement,
    /// Matched element holds the build plugin's own coordinates
    PluginCoordinates,
}

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("Rule for <{tag}> failed: {source}")]
    RuleApplicationFailed { tag: String, source: RuleError },

    #[error(transparent)]
    Document(#[from] PomError),
}

impl PomRewriteEngine {
    pub fn new(table: RuleTable) -> Self {
        Self { table }
    }

    /// Rewrite one POM in the given mode. The role only matters for diffs.
    pub fn transform(
        &self,
        document: &PomDocument,
        role: Role,
        mode: &TransformMode,
    ) -> Result<RewriteResult, RewriteError> {
        match mode {
            TransformMode::Diff => self.rewrite(document, role),
            TransformMode::Version(version) => self.rewrite_version(document, version),
        }
    }

    /// Apply the diff-naming rules for `role`, leaving `document` untouched
    pub fn rewrite(&self, document: &PomDocument, role: Role) -> Result<RewriteResult, RewriteError> {
        let rules = self.table.rules_for(role);
        let mut applied_rewrites = Vec::new();
        let mut warnings = Vec::new();

        let rewritten = document.map_element_texts::<_, RewriteError>(|tag, text| {
            let Some(rule) = find_rule(rules, tag) else {
                return Ok(None);
            };

            let value = match text {
                ElementText::Text(value) if !value.is_empty() => value,
                _ => {
                    warnings.push(RewriteWarning::empty_element(tag));
                    return Ok(None);
                }
            };

            let outcome = rule.apply(value).map_err(|source| RewriteError::RuleApplicationFailed {
                tag: tag.to_string(),
                source,
            })?;

            match outcome {
                RuleOutcome::Rewritten(new_value) => {
                    tracing::debug!(%role, tag, old = value, new = %new_value, "rewrote element");
                    applied_rewrites.push(AppliedRewrite {
                        tag: tag.to_string(),
                        role: Some(role),
                        old_value: value.to_string(),
                        new_value: new_value.clone(),
                        kind: rule.rewrite.applied_kind(),
                    });
                    Ok(Some(new_value))
                }
                RuleOutcome::Protected => {
                    warnings.push(RewriteWarning::new(
                        tag,
                        format!("Kept plugin coordinate '{}'", value),
                        RewriteWarningType::PluginCoordinates,
                    ));
                    Ok(None)
                }
                RuleOutcome::Unmatched => Ok(None),
            }
        })?;

        Ok(RewriteResult {
            document: rewritten,
            applied_rewrites,
            warnings,
        })
    }

    /// Replace the text of every `<version>` element, wherever it sits.
    ///
    /// Dependency and plugin version pins are overwritten too; plugin
    /// coordinates get no protection here.
    pub fn rewrite_version(&self, document: &PomDocument, version: &str) -> Result<RewriteResult, RewriteError> {
        let mut applied_rewrites = Vec::new();
        let mut warnings = Vec::new();

        let rewritten = document.map_element_texts::<_, RewriteError>(|tag, text| {
            if tag != VERSION_TAG {
                return Ok(None);
            }
            match text {
                ElementText::Text(old) if !old.is_empty() => {
                    applied_rewrites.push(AppliedRewrite {
                        tag: tag.to_string(),
                        role: None,
                        old_value: old.to_string(),
                        new_value: version.to_string(),
                        kind: AppliedKind::Version,
                    });
                    Ok(Some(version.to_string()))
                }
                _ => {
                    warnings.push(RewriteWarning::empty_element(tag));
                    Ok(None)
                }
            }
        })?;

        Ok(RewriteResult {
            document: rewritten,
            applied_rewrites,
            warnings,
        })
    }
}

impl Default for PomRewriteEngine {
    fn default() -> Self {
        Self::new(RuleTable::diff_defaults())
    }
}

fn find_rule<'a>(rules: &'a [RewriteRule], tag: &str) -> Option<&'a RewriteRule> {
    rules.iter().find(|rule| rule.tag == tag)
}

impl RewriteWarning {
    pub fn new(tag: &str, message: String, warning_type: RewriteWarningType) -> Self {
        Self {
            tag: tag.to_string(),
            message,
            warning_type,
        }
    }

    fn empty_element(tag: &str) -> Self {
        tracing::debug!(tag, "skipping element without text");
        Self::new(
            tag,
            format!("Skipped <{}> without text content", tag),
            RewriteWarningType::EmptyElement,
        )
    }
}
