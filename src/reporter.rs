use serde::{Deserialize, Serialize};
use crate::{
    project_tree::SkippedEntry,
    rewrite_engine::{RewriteWarning, RewriteWarningType, TransformMode},
    rewrite_rule::{AppliedKind, AppliedRewrite, Role},
};

/// Reporter for summarizing a run in various formats
pub struct RunReporter {
    output_format: ReportFormat,
}

/// Available output formats for run reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Console,
    Json,
    Yaml,
}

/// Everything that happened to one POM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    pub role: Role,
    pub source: String,
    pub destination: String,
    pub applied_rewrites: Vec<AppliedRewrite>,
    pub warnings: Vec<RewriteWarning>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub mode: TransformMode,
    pub files: Vec<FileOutcome>,
    pub skipped_entries: Vec<SkippedEntry>,
    pub summary: RunSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub files_written: usize,
    pub total_rewrites: usize,
    pub template_rewrites: usize,
    pub split_inserts: usize,
    pub literal_rewrites: usize,
    pub version_rewrites: usize,
    pub protected_values: usize,
    pub empty_elements: usize,
    pub skipped_entries: usize,
}

impl RunReporter {
    pub fn new() -> Self {
        Self {
            output_format: ReportFormat::Console,
        }
    }

    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn generate_report(
        &self,
        mode: TransformMode,
        files: Vec<FileOutcome>,
        skipped_entries: Vec<SkippedEntry>,
    ) -> RunReport {
        let summary = self.create_summary(&files, &skipped_entries);
        RunReport {
            mode,
            files,
            skipped_entries,
            summary,
        }
    }

    /// Format the report according to the configured output format
    pub fn format_report(&self, report: &RunReport) -> Result<String, ReportError> {
        match self.output_format {
            ReportFormat::Console => Ok(self.format_console_report(report)),
            ReportFormat::Json => serde_json::to_string_pretty(report)
                .map_err(|e| ReportError::SerializationError(e.to_string())),
            ReportFormat::Yaml => serde_yaml::to_string(report)
                .map_err(|e| ReportError::SerializationError(e.to_string())),
        }
    }

    fn create_summary(&self, files: &[FileOutcome], skipped: &[SkippedEntry]) -> RunSummary {
        let mut summary = RunSummary {
            files_written: files.len(),
            skipped_entries: skipped.len(),
            ..RunSummary::default()
        };

        for rewrite in files.iter().flat_map(|f| f.applied_rewrites.iter()) {
            summary.total_rewrites += 1;
            match rewrite.kind {
                AppliedKind::Template => summary.template_rewrites += 1,
                AppliedKind::SplitInsert => summary.split_inserts += 1,
                AppliedKind::Literal => summary.literal_rewrites += 1,
                AppliedKind::Version => summary.version_rewrites += 1,
            }
        }

        for warning in files.iter().flat_map(|f| f.warnings.iter()) {
            match warning.warning_type {
                RewriteWarningType::PluginCoordinates => summary.protected_values += 1,
                RewriteWarningType::EmptyElement => summary.empty_elements += 1,
            }
        }

        summary
    }

    fn format_console_report(&self, report: &RunReport) -> String {
        let mut output = String::new();

        output.push_str("=== POM Transformation Report ===\n\n");
        match &report.mode {
            TransformMode::Diff => output.push_str("Mode: diff\n"),
            TransformMode::Version(version) => output.push_str(&format!("Mode: version → {}\n", version)),
        }
        output.push_str(&format!("Files Written: {}\n", report.summary.files_written));
        output.push_str(&format!("Rewrites Applied: {}\n", report.summary.total_rewrites));

        if report.summary.protected_values > 0 {
            output.push_str(&format!("Plugin Coordinates Kept: {}\n", report.summary.protected_values));
        }
        if report.summary.empty_elements > 0 {
            output.push_str(&format!("Empty Elements Skipped: {}\n", report.summary.empty_elements));
        }

        if !report.files.is_empty() {
            output.push_str("\nFiles:\n");
            for file in &report.files {
                output.push_str(&format!(
                    "  ✓ [{}] {} → {} ({} rewrites)\n",
                    file.role,
                    file.source,
                    file.destination,
                    file.applied_rewrites.len()
                ));
            }
        }

        if !report.skipped_entries.is_empty() {
            output.push_str("\nSkipped:\n");
            for entry in &report.skipped_entries {
                output.push_str(&format!("  ⚠ {} {}\n", entry.path, entry.reason));
            }
        }

        output
    }
}

impl Default for RunReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_files() -> Vec<FileOutcome> {
        vec![
            FileOutcome {
                role: Role::Parent,
                source: "generic/pom.xml".to_string(),
                destination: "out/generic/pom.xml".to_string(),
                applied_rewrites: vec![AppliedRewrite {
                    tag: "module".to_string(),
                    role: Some(Role::Parent),
                    old_value: "mappings".to_string(),
                    new_value: "mappings-diff".to_string(),
                    kind: AppliedKind::Template,
                }],
                warnings: Vec::new(),
            },
            FileOutcome {
                role: Role::Child,
                source: "generic/mappings/pom.xml".to_string(),
                destination: "out/generic/mappings-diff/pom.xml".to_string(),
                applied_rewrites: vec![AppliedRewrite {
                    tag: "label".to_string(),
                    role: Some(Role::Child),
                    old_value: "mappings@en".to_string(),
                    new_value: "mappings-diff@en".to_string(),
                    kind: AppliedKind::SplitInsert,
                }],
                warnings: vec![RewriteWarning::new(
                    "artifactId",
                    "Kept plugin coordinate 'databus-maven-plugin'".to_string(),
                    RewriteWarningType::PluginCoordinates,
                )],
            },
        ]
    }

    #[test]
    fn test_reporter_with_format() {
        let reporter = RunReporter::new().with_format(ReportFormat::Json);
        assert!(matches!(reporter.output_format, ReportFormat::Json));
    }

    #[test]
    fn test_generate_report_summary() {
        let reporter = RunReporter::new();
        let skipped = vec![SkippedEntry {
            path: "generic/docs".to_string(),
            reason: "no pom.xml in directory".to_string(),
        }];

        let report = reporter.generate_report(TransformMode::Diff, sample_files(), skipped);

        assert_eq!(
            report.summary,
            RunSummary {
                files_written: 2,
                total_rewrites: 2,
                template_rewrites: 1,
                split_inserts: 1,
                protected_values: 1,
                skipped_entries: 1,
                ..RunSummary::default()
            }
        );
    }

    #[test]
    fn test_format_console_report() {
        let reporter = RunReporter::new();
        let report = reporter.generate_report(
            TransformMode::Version("2018.11.01".to_string()),
            sample_files(),
            Vec::new(),
        );

        let formatted = reporter.format_report(&report).unwrap();
        assert!(formatted.contains("POM Transformation Report"));
        assert!(formatted.contains("2018.11.01"));
        assert!(formatted.contains("[child] generic/mappings/pom.xml → out/generic/mappings-diff/pom.xml"));
        assert!(formatted.contains("Plugin Coordinates Kept: 1"));
    }

    #[test]
    fn test_format_json_report() {
        let reporter = RunReporter::new().with_format(ReportFormat::Json);
        let report = reporter.generate_report(TransformMode::Diff, sample_files(), Vec::new());

        let formatted = reporter.format_report(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&formatted).unwrap();

        assert_eq!(value["mode"], "diff");
        assert_eq!(value["summary"]["files_written"], 2);
        assert_eq!(value["files"][1]["applied_rewrites"][0]["kind"], "split_insert");
    }

    #[test]
    fn test_format_yaml_report() {
        let reporter = RunReporter::new().with_format(ReportFormat::Yaml);
        let report = reporter.generate_report(TransformMode::Diff, Vec::new(), Vec::new());

        let formatted = reporter.format_report(&report).unwrap();
        assert!(formatted.contains("files_written: 0"));
    }
}
