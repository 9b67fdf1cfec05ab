use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Placeholder that a template rule replaces with the original element text
pub const PLACEHOLDER: &str = "%s%";

/// Coordinates of the Databus build plugin itself; never renamed
pub const PLUGIN_SENTINELS: [&str; 2] = ["databus-maven-plugin", "org.dbpedia.databus"];

/// Which POM of a release tree is being rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Parent,
    Child,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Parent => write!(f, "parent"),
            Role::Child => write!(f, "child"),
        }
    }
}

/// A rule that rewrites the text of every element named `tag`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteRule {
    pub tag: String,
    pub rewrite: RewriteKind,
}

/// The ways an element's text can be rewritten
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewriteKind {
    /// Substitute the original text for `%s%` inside the template
    Template { template: String },
    /// Insert `suffix` right before the single `separator` in the text
    SplitInsert { separator: String, suffix: String },
    /// Replace the whole text when it is one of the legacy names
    Literal {
        legacy_names: Vec<String>,
        replacement: String,
    },
}

/// What happened when a rule met an element's text
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    Rewritten(String),
    /// The text is one of the plugin sentinels
    Protected,
    /// A literal rule whose legacy names do not include the text
    Unmatched,
}

/// Represents one rewrite that was applied to a POM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedRewrite {
    pub tag: String,
    pub role: Option<Role>,
    pub old_value: String,
    pub new_value: String,
    pub kind: AppliedKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppliedKind {
    Template,
    SplitInsert,
    Literal,
    Version,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("Value '{value}' must contain exactly one '{separator}' separator")]
    MalformedSplit { value: String, separator: String },
}

pub fn is_plugin_sentinel(value: &str) -> bool {
    PLUGIN_SENTINELS.contains(&value)
}

impl RewriteRule {
    pub fn new(tag: impl Into<String>, rewrite: RewriteKind) -> Self {
        Self {
            tag: tag.into(),
            rewrite,
        }
    }

    pub fn template(tag: impl Into<String>, template: impl Into<String>) -> Self {
        Self::new(
            tag,
            RewriteKind::Template {
                template: template.into(),
            },
        )
    }

    pub fn split_insert(
        tag: impl Into<String>,
        separator: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        Self::new(
            tag,
            RewriteKind::SplitInsert {
                separator: separator.into(),
                suffix: suffix.into(),
            },
        )
    }

    pub fn literal<I, S>(tag: impl Into<String>, legacy_names: I, replacement: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            tag,
            RewriteKind::Literal {
                legacy_names: legacy_names.into_iter().map(Into::into).collect(),
                replacement: replacement.into(),
            },
        )
    }

    /// Apply the rule to an element's text, leaving plugin coordinates alone
    pub fn apply(&self, value: &str) -> Result<RuleOutcome, RuleError> {
        if is_plugin_sentinel(value) {
            return Ok(RuleOutcome::Protected);
        }

        match &self.rewrite {
            RewriteKind::Template { template } => {
                Ok(RuleOutcome::Rewritten(template.replace(PLACEHOLDER, value)))
            }
            RewriteKind::SplitInsert { separator, suffix } => {
                let parts: Vec<&str> = value.split(separator.as_str()).collect();
                if parts.len() != 2 {
                    return Err(RuleError::MalformedSplit {
                        value: value.to_string(),
                        separator: separator.clone(),
                    });
                }
                Ok(RuleOutcome::Rewritten(format!(
                    "{}{}{}{}",
                    parts[0], suffix, separator, parts[1]
                )))
            }
            RewriteKind::Literal {
                legacy_names,
                replacement,
            } => {
                if legacy_names.iter().any(|name| name == value) {
                    Ok(RuleOutcome::Rewritten(replacement.clone()))
                } else {
                    Ok(RuleOutcome::Unmatched)
                }
            }
        }
    }
}

impl RewriteKind {
    pub fn applied_kind(&self) -> AppliedKind {
        match self {
            RewriteKind::Template { .. } => AppliedKind::Template,
            RewriteKind::SplitInsert { .. } => AppliedKind::SplitInsert,
            RewriteKind::Literal { .. } => AppliedKind::Literal,
        }
    }
}
