use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::rewrite_rule::Role;

pub const POM_FILE: &str = "pom.xml";

/// Where rewritten POMs go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Overwrite each source `pom.xml`
    InPlace,
    /// Append into a mirror of the source tree under this directory
    Target(PathBuf),
}

/// A release tree: one parent `pom.xml` and one level of child modules
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    pub source_dir: PathBuf,
    pub parent_pom: PathBuf,
    pub children: Vec<ChildModule>,
    pub skipped: Vec<SkippedEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildModule {
    pub name: String,
    pub pom: PathBuf,
}

/// A directory entry that was left alone, with the reason why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub path: String,
    pub reason: String,
}

/// One POM to read, rewrite and write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedWrite {
    pub role: Role,
    pub source: PathBuf,
    pub destination: PathBuf,
}

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Source directory {0} does not exist or is not a directory")]
    MissingSourceDir(String),

    #[error("No parent pom.xml found in {0}")]
    MissingParentPom(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> TreeError + '_ {
    move |source| TreeError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl ProjectLayout {
    /// Scan `source_dir` for the parent POM and its immediate child modules
    pub fn discover(source_dir: &Path) -> Result<Self, TreeError> {
        if !source_dir.is_dir() {
            return Err(TreeError::MissingSourceDir(source_dir.display().to_string()));
        }
        let source_dir = fs::canonicalize(source_dir).map_err(io_error(source_dir))?;

        let parent_pom = source_dir.join(POM_FILE);
        if !parent_pom.is_file() {
            return Err(TreeError::MissingParentPom(source_dir.display().to_string()));
        }

        let mut children = Vec::new();
        let mut skipped = Vec::new();

        for entry in fs::read_dir(&source_dir).map_err(io_error(&source_dir))? {
            let entry = entry.map_err(io_error(&source_dir))?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();

            if path.is_file() {
                if name != POM_FILE {
                    tracing::debug!(path = %path.display(), "ignoring non-POM file");
                }
            } else if path.is_dir() {
                let pom = path.join(POM_FILE);
                if pom.is_file() {
                    children.push(ChildModule { name, pom });
                } else {
                    skipped.push(SkippedEntry {
                        path: path.display().to_string(),
                        reason: format!("no {} in directory", POM_FILE),
                    });
                }
            } else {
                tracing::warn!(path = %path.display(), "entry is no file or directory");
                skipped.push(SkippedEntry {
                    path: path.display().to_string(),
                    reason: "is no file or directory".to_string(),
                });
            }
        }

        children.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Self {
            source_dir,
            parent_pom,
            children,
            skipped,
        })
    }

    /// Work list for a run, parent first so its output directory exists
    /// before any child is written beneath it.
    pub fn plan(&self, mode: &OutputMode, child_suffix: &str) -> Vec<PlannedWrite> {
        let mut writes = Vec::with_capacity(self.children.len() + 1);

        match mode {
            OutputMode::InPlace => {
                writes.push(PlannedWrite {
                    role: Role::Parent,
                    source: self.parent_pom.clone(),
                    destination: self.parent_pom.clone(),
                });
                writes.extend(self.children.iter().map(|child| PlannedWrite {
                    role: Role::Child,
                    source: child.pom.clone(),
                    destination: child.pom.clone(),
                }));
            }
            OutputMode::Target(target) => {
                let root = self.mirror_root(target);
                writes.push(PlannedWrite {
                    role: Role::Parent,
                    source: self.parent_pom.clone(),
                    destination: root.join(POM_FILE),
                });
                writes.extend(self.children.iter().map(|child| PlannedWrite {
                    role: Role::Child,
                    source: child.pom.clone(),
                    destination: root
                        .join(format!("{}{}", child.name, child_suffix))
                        .join(POM_FILE),
                }));
            }
        }

        writes
    }

    /// `<target>/<name of the source directory>`
    pub fn mirror_root(&self, target: &Path) -> PathBuf {
        match self.source_dir.file_name() {
            Some(name) => target.join(name),
            None => target.to_path_buf(),
        }
    }
}

/// Write rewritten XML: truncate in place, or append under a target tree
pub fn write_output(destination: &Path, xml: &str, mode: &OutputMode) -> Result<(), TreeError> {
    match mode {
        OutputMode::InPlace => fs::write(destination, xml).map_err(io_error(destination)),
        OutputMode::Target(_) => {
            if let Some(dir) = destination.parent() {
                fs::create_dir_all(dir).map_err(io_error(dir))?;
            }
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(destination)
                .map_err(io_error(destination))?;
            file.write_all(xml.as_bytes()).map_err(io_error(destination))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("generic");
        fs::create_dir_all(root.join("mappings")).unwrap();
        fs::create_dir_all(root.join("labels")).unwrap();
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join(POM_FILE), "<project/>").unwrap();
        fs::write(root.join("README.md"), "release notes").unwrap();
        fs::write(root.join("mappings").join(POM_FILE), "<project/>").unwrap();
        fs::write(root.join("labels").join(POM_FILE), "<project/>").unwrap();
        dir
    }

    #[test]
    fn test_discover() {
        let dir = release_tree();
        let layout = ProjectLayout::discover(&dir.path().join("generic")).unwrap();

        let names: Vec<&str> = layout.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["labels", "mappings"]);
        assert!(layout.parent_pom.ends_with("generic/pom.xml"));
        assert_eq!(layout.skipped.len(), 1);
        assert!(layout.skipped[0].path.ends_with("docs"));
    }

    #[test]
    fn test_discover_requires_parent_pom() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("mappings")).unwrap();

        let result = ProjectLayout::discover(dir.path());
        assert!(matches!(result, Err(TreeError::MissingParentPom(_))));

        let result = ProjectLayout::discover(&dir.path().join("missing"));
        assert!(matches!(result, Err(TreeError::MissingSourceDir(_))));
    }

    #[test]
    fn test_plan_in_place() {
        let dir = release_tree();
        let layout = ProjectLayout::discover(&dir.path().join("generic")).unwrap();

        let plan = layout.plan(&OutputMode::InPlace, "-diff");

        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].role, Role::Parent);
        assert!(plan.iter().all(|w| w.source == w.destination));
        assert!(plan[1..].iter().all(|w| w.role == Role::Child));
    }

    #[test]
    fn test_plan_target_mirrors_tree() {
        let dir = release_tree();
        let layout = ProjectLayout::discover(&dir.path().join("generic")).unwrap();
        let target = dir.path().join("out");

        let plan = layout.plan(&OutputMode::Target(target.clone()), "-diff");

        assert_eq!(plan[0].destination, target.join("generic").join(POM_FILE));
        assert_eq!(plan[1].destination, target.join("generic").join("labels-diff").join(POM_FILE));
        assert_eq!(plan[2].destination, target.join("generic").join("mappings-diff").join(POM_FILE));

        let plain = layout.plan(&OutputMode::Target(target.clone()), "");
        assert_eq!(plain[2].destination, target.join("generic").join("mappings").join(POM_FILE));
    }

    #[test]
    fn test_write_output_appends_under_target() {
        let dir = tempfile::tempdir().unwrap();
        let mode = OutputMode::Target(dir.path().to_path_buf());
        let destination = dir.path().join("generic").join("mappings-diff").join(POM_FILE);

        write_output(&destination, "<a/>\n", &mode).unwrap();
        write_output(&destination, "<b/>\n", &mode).unwrap();

        assert_eq!(fs::read_to_string(&destination).unwrap(), "<a/>\n<b/>\n");
    }

    #[test]
    fn test_write_output_in_place_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join(POM_FILE);
        fs::write(&destination, "<old/>").unwrap();

        write_output(&destination, "<new/>\n", &OutputMode::InPlace).unwrap();

        assert_eq!(fs::read_to_string(&destination).unwrap(), "<new/>\n");
    }
}

#[cfg(all(test, unix))]
mod unix_tests {
    use super::*;
    use std::os::unix::fs::symlink;

    #[test]
    fn test_discover_skips_entries_that_are_neither_file_nor_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("generic");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join(POM_FILE), "<project/>").unwrap();
        symlink(root.join("gone"), root.join("dangling")).unwrap();

        let layout = ProjectLayout::discover(&root).unwrap();

        assert!(layout.children.is_empty());
        assert_eq!(layout.skipped.len(), 1);
        assert!(layout.skipped[0].path.ends_with("dangling"));
        assert_eq!(layout.skipped[0].reason, "is no file or directory");
    }
}
