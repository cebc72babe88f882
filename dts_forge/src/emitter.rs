//! Writes declarations under an output root that is rebuilt from scratch on
//! every run.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::converter::Declaration;
use crate::error::{GenerationError, Result};

/// Difference between the files on disk and a planned run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Drift {
    /// Planned but absent.
    Missing(PathBuf),
    /// Present with different contents.
    Stale(PathBuf),
    /// Present but not planned; the next run deletes it.
    Orphan(PathBuf),
}

impl Drift {
    pub fn path(&self) -> &Path {
        match self {
            Drift::Missing(path) | Drift::Stale(path) | Drift::Orphan(path) => path,
        }
    }
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Drift::Missing(path) => write!(f, "missing: {}", path.display()),
            Drift::Stale(path) => write!(f, "stale:   {}", path.display()),
            Drift::Orphan(path) => write!(f, "orphan:  {}", path.display()),
        }
    }
}

pub struct DeclarationEmitter {
    root: PathBuf,
}

impl DeclarationEmitter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deletes the whole output root if it exists.
    pub fn wipe(&self) -> Result<()> {
        if self.root.exists() {
            info!(root = %self.root.display(), "wiping output root");
            fs::remove_dir_all(&self.root)
                .map_err(|e| GenerationError::filesystem(&self.root, e))?;
        }
        Ok(())
    }

    /// Writes one declaration, overwriting any existing file. Returns the
    /// absolute path written.
    pub fn emit(&self, declaration: &Declaration) -> Result<PathBuf> {
        let path = self.root.join(&declaration.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| GenerationError::filesystem(parent, e))?;
        }
        fs::write(&path, declaration.contents())
            .map_err(|e| GenerationError::filesystem(&path, e))?;
        debug!(path = %path.display(), "wrote declaration");
        Ok(path)
    }

    /// Compares the output root with `planned` without touching it. Paths in
    /// the result are relative to the root.
    pub fn check(&self, planned: &[Declaration]) -> Result<Vec<Drift>> {
        let mut drift = Vec::new();
        let mut expected = BTreeSet::new();

        for declaration in planned {
            expected.insert(declaration.path.clone());
            let path = self.root.join(&declaration.path);
            match fs::read_to_string(&path) {
                Ok(existing) if existing == declaration.contents() => {}
                Ok(_) => drift.push(Drift::Stale(declaration.path.clone())),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    drift.push(Drift::Missing(declaration.path.clone()))
                }
                Err(e) => return Err(GenerationError::filesystem(path, e)),
            }
        }

        if self.root.is_dir() {
            for entry in WalkDir::new(&self.root) {
                let entry = entry.map_err(|e| {
                    let path = e.path().unwrap_or(self.root.as_path()).to_path_buf();
                    GenerationError::filesystem(path, e.into())
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = entry
                    .path()
                    .strip_prefix(&self.root)
                    .unwrap_or(entry.path())
                    .to_path_buf();
                if !expected.contains(&relative) {
                    drift.push(Drift::Orphan(relative));
                }
            }
        }

        drift.sort();
        Ok(drift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{TypePath, TypeRef};

    fn declaration(qualified: &str, lines: &[&str]) -> Declaration {
        let path = TypePath::parse(qualified);
        Declaration {
            root: TypeRef::named(path.clone()),
            declared: vec![TypeRef::named(path.clone())],
            path: path.declaration_path(".d.ts"),
            lines: lines.iter().map(|line| line.to_string()).collect(),
        }
    }

    #[test]
    fn test_emit_creates_namespace_directories() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = DeclarationEmitter::new(dir.path().join("types"));
        let written = emitter
            .emit(&declaration("shop::models::Product", &["", "export interface Product {", "}"]))
            .unwrap();
        assert_eq!(written, dir.path().join("types/shop/models/Product.d.ts"));
        assert_eq!(
            fs::read_to_string(written).unwrap(),
            "\nexport interface Product {\n}\n"
        );
    }

    #[test]
    fn test_wipe_removes_stale_files_and_tolerates_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("types");
        let emitter = DeclarationEmitter::new(&root);
        emitter.wipe().unwrap();

        fs::create_dir_all(root.join("old")).unwrap();
        fs::write(root.join("old/Gone.d.ts"), "stale").unwrap();
        emitter.wipe().unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn test_check_reports_every_kind_of_drift() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = DeclarationEmitter::new(dir.path());
        let current = declaration("app::Current", &["", "export interface Current {", "}"]);
        let changed = declaration("app::Changed", &["", "export interface Changed {", "}"]);
        let absent = declaration("app::Absent", &["", "export interface Absent {", "}"]);

        emitter.emit(&current).unwrap();
        emitter
            .emit(&declaration("app::Changed", &["", "export interface Changed {", "  x: number;", "}"]))
            .unwrap();
        emitter
            .emit(&declaration("app::Removed", &["", "export enum Removed {", "}"]))
            .unwrap();

        let drift = emitter.check(&[current, changed, absent]).unwrap();
        assert_eq!(
            drift,
            vec![
                Drift::Missing(PathBuf::from("app/Absent.d.ts")),
                Drift::Stale(PathBuf::from("app/Changed.d.ts")),
                Drift::Orphan(PathBuf::from("app/Removed.d.ts")),
            ]
        );
    }

    #[test]
    fn test_check_on_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = DeclarationEmitter::new(dir.path().join("nothing"));
        let drift = emitter
            .check(&[declaration("app::Absent", &["", "export interface Absent {", "}"])])
            .unwrap();
        assert_eq!(drift, vec![Drift::Missing(PathBuf::from("app/Absent.d.ts"))]);
    }
}
