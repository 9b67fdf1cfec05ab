use std::path::PathBuf;
use std::process;
use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use databus_pom_transform::{
    project_tree::write_output,
    reporter::{FileOutcome, ReportError},
    OutputMode, PomDocument, PomError, PomRewriteEngine, ProjectLayout, ReleaseVersion,
    ReportFormat, RewriteError, RuleTable, RuleTableError, RunReporter, TransformMode, TreeError,
};

#[derive(Parser, Debug)]
#[command(name = "databus-pom-transform")]
#[command(about = "Turn a Databus release tree into its diff variant, or bump its version")]
struct Args {
    /// Release directory holding the parent pom.xml and one module per subdirectory
    sourcedir: PathBuf,

    /// Set every <version> element to VERSION (e.g., 2018.11.01) instead of renaming
    #[arg(short = 'v', long = "version", visible_alias = "v", value_name = "VERSION")]
    release_version: Option<String>,

    /// Append output into a mirrored tree under DIR instead of overwriting in place
    #[arg(short = 't', long = "target", visible_alias = "t", value_name = "DIR")]
    target: Option<PathBuf>,

    /// YAML rule table replacing the built-in diff rules
    #[arg(long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Format of the summary printed after the run
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Rules(#[from] RuleTableError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Document(#[from] PomError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("\n❌ Error: {}", e);
            process::exit(1);
        }
    }
}

/// Rewrite the whole release tree and return the formatted report
fn run(args: Args) -> Result<String, CliError> {
    let table = match &args.rules {
        Some(path) => RuleTable::load_from_file(path)?,
        None => RuleTable::diff_defaults(),
    };

    let mode = match args.release_version {
        Some(version) => {
            if let Err(e) = version.parse::<ReleaseVersion>() {
                eprintln!("  ⚠ WARNING: {} (continuing anyway)", e);
            }
            TransformMode::Version(version)
        }
        None => TransformMode::Diff,
    };

    let output = match args.target {
        Some(dir) => OutputMode::Target(dir),
        None => OutputMode::InPlace,
    };

    let layout = ProjectLayout::discover(&args.sourcedir)?;
    let child_suffix = if mode.is_diff() {
        table.directory_suffix.clone()
    } else {
        String::new()
    };
    let engine = PomRewriteEngine::new(table);

    let mut files = Vec::new();
    for planned in layout.plan(&output, &child_suffix) {
        let document = PomDocument::from_file(&planned.source)?;
        let result = engine.transform(&document, planned.role, &mode)?;
        write_output(&planned.destination, &result.document.to_pretty_xml()?, &output)?;

        tracing::info!(
            role = %planned.role,
            source = %planned.source.display(),
            destination = %planned.destination.display(),
            rewrites = result.applied_rewrites.len(),
            "wrote POM"
        );
        files.push(FileOutcome {
            role: planned.role,
            source: planned.source.display().to_string(),
            destination: planned.destination.display().to_string(),
            applied_rewrites: result.applied_rewrites,
            warnings: result.warnings,
        });
    }

    let reporter = RunReporter::new().with_format(args.report);
    let report = reporter.generate_report(mode, files, layout.skipped);
    Ok(reporter.format_report(&report)?)
}
