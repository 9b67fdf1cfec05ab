use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::rewrite_rule::{RewriteKind, RewriteRule, Role, PLACEHOLDER};

/// Suffix that marks a module as publishing release diffs
pub const DIFF_SUFFIX: &str = "-diff";

/// Per-role rewrite rules plus the suffix used for mirrored child directories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    #[serde(default = "default_directory_suffix")]
    pub directory_suffix: String,
    #[serde(default)]
    pub parent: Vec<RewriteRule>,
    #[serde(default)]
    pub child: Vec<RewriteRule>,
}

#[derive(Debug, Error)]
pub enum RuleTableError {
    #[error("Failed to read rules file {0}: {1}")]
    Io(String, std::io::Error),

    #[error("Failed to parse rules: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Rule validation failed: {0}")]
    RuleValidationFailed(String),
}

fn default_directory_suffix() -> String {
    DIFF_SUFFIX.to_string()
}

impl RuleTable {
    pub fn new() -> Self {
        Self {
            directory_suffix: default_directory_suffix(),
            parent: Vec::new(),
            child: Vec::new(),
        }
    }

    /// The rules that turn a Databus release tree into its diff variant
    pub fn diff_defaults() -> Self {
        let template = format!("{}{}", PLACEHOLDER, DIFF_SUFFIX);
        Self {
            directory_suffix: default_directory_suffix(),
            parent: vec![
                RewriteRule::template("module", template.clone()),
                RewriteRule::template("artifactId", template.clone()),
            ],
            child: vec![
                RewriteRule::template("artifactId", template),
                RewriteRule::split_insert("label", "@", DIFF_SUFFIX),
                RewriteRule::template("datasetDescription", format!("The diffs to {}", PLACEHOLDER)),
            ],
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, RuleTableError> {
        let table: RuleTable = serde_yaml::from_str(yaml)?;
        table.validate()?;
        Ok(table)
    }

    /// Load a rule table from a YAML file, replacing the defaults entirely
    pub fn load_from_file(path: &Path) -> Result<Self, RuleTableError> {
        let content = fs::read_to_string(path)
            .map_err(|e| RuleTableError::Io(path.display().to_string(), e))?;
        let table = Self::from_yaml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            parent_rules = table.parent.len(),
            child_rules = table.child.len(),
            "loaded rule table"
        );
        Ok(table)
    }

    pub fn add_rule(&mut self, role: Role, rule: RewriteRule) -> Result<(), RuleTableError> {
        validate_rule(&rule)?;
        match role {
            Role::Parent => self.parent.push(rule),
            Role::Child => self.child.push(rule),
        }
        Ok(())
    }

    /// Rules for a role, in declaration order
    pub fn rules_for(&self, role: Role) -> &[RewriteRule] {
        match role {
            Role::Parent => &self.parent,
            Role::Child => &self.child,
        }
    }

    fn validate(&self) -> Result<(), RuleTableError> {
        self.parent
            .iter()
            .chain(self.child.iter())
            .try_for_each(validate_rule)
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::diff_defaults()
    }
}

fn validate_rule(rule: &RewriteRule) -> Result<(), RuleTableError> {
    if rule.tag.trim().is_empty() {
        return Err(RuleTableError::RuleValidationFailed(
            "Tag name cannot be empty".to_string()
        ));
    }

    match &rule.rewrite {
        RewriteKind::Template { template } if !template.contains(PLACEHOLDER) => {
            Err(RuleTableError::RuleValidationFailed(format!(
                "Template '{}' for tag {} has no {} placeholder",
                template, rule.tag, PLACEHOLDER
            )))
        }
        RewriteKind::SplitInsert { separator, .. } if separator.is_empty() => {
            Err(RuleTableError::RuleValidationFailed(format!(
                "Separator cannot be empty for tag {}",
                rule.tag
            )))
        }
        RewriteKind::Literal { legacy_names, .. } if legacy_names.is_empty() => {
            Err(RuleTableError::RuleValidationFailed(format!(
                "Literal rule for tag {} lists no legacy names",
                rule.tag
            )))
        }
        _ => Ok(()),
    }
}
