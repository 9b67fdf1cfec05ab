// Databus POM diff/version transformation
pub mod pom_document;
pub mod rewrite_rule;
pub mod rule_table;
pub mod rewrite_engine;
pub mod project_tree;
pub mod release_version;
pub mod reporter;

// Re-export core types for convenience
pub use pom_document::{PomDocument, PomError};
pub use rewrite_rule::{AppliedRewrite, RewriteKind, RewriteRule, Role};
pub use rule_table::{RuleTable, RuleTableError};
pub use rewrite_engine::{PomRewriteEngine, RewriteError, RewriteResult, TransformMode};
pub use project_tree::{OutputMode, ProjectLayout, TreeError};
pub use release_version::ReleaseVersion;
pub use reporter::{ReportFormat, RunReport, RunReporter};
