use anyhow::Result;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, error};
use walkdir::WalkDir;

mod imports;

pub use imports::{is_import_line, line_tokens, ImportToken};

use crate::code::{Language, RelatedStrategy, MAX_RELATED_TEST_FILES};

/// Files a target imports, plus at most [`MAX_RELATED_TEST_FILES`] existing
/// tests that import the target.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RelatedFileSet {
    pub imports: Vec<PathBuf>,
    pub tests: Vec<PathBuf>,
}

/// Best-effort static discovery of a file's neighbours.
///
/// Import targets are resolved against `root`, except relative imports,
/// which are looked up beside the importing file first. Existing tests are
/// searched for recursively under `search_root`.
pub struct RelatedFileResolver {
    root: PathBuf,
    search_root: PathBuf,
}

impl RelatedFileResolver {
    pub fn new(root: impl AsRef<Path>, search_root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            search_root: search_root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, language: Language, path: &Path) -> RelatedFileSet {
        RelatedFileSet {
            imports: self.resolve_related(language, path),
            tests: self.resolve_related_tests(language, path),
        }
    }

    pub fn resolve_related(&self, language: Language, path: &Path) -> Vec<PathBuf> {
        if language.profile().related != RelatedStrategy::ImportScan {
            debug!("Related file discovery is not implemented for {}", language);
            return Vec::new();
        }

        match self.scan_imports(path) {
            Ok(found) => found,
            Err(e) => {
                error!("Error identifying related files in {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    pub fn resolve_related_tests(&self, language: Language, path: &Path) -> Vec<PathBuf> {
        let profile = language.profile();
        if profile.related != RelatedStrategy::ImportScan || profile.test_patterns.is_empty() {
            return Vec::new();
        }

        match self.scan_tests(profile.test_patterns, path) {
            Ok(found) => found,
            Err(e) => {
                error!(
                    "Error identifying related test files in {}: {}",
                    path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    fn scan_imports(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let reader = BufReader::new(File::open(self.root.join(path))?);
        let mut related = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if !is_import_line(&line) {
                continue;
            }
            related.extend(line_tokens(&line).filter_map(|token| self.locate(path, &token)));
        }

        Ok(related)
    }

    /// First existing candidate for `token` as imported from `importer`.
    /// The returned path is relative to `root` unless `importer` is absolute.
    fn locate(&self, importer: &Path, token: &ImportToken) -> Option<PathBuf> {
        let candidates = token.candidates();
        let sibling_dir = match token {
            ImportToken::Relative(_) => importer.parent(),
            _ => None,
        };

        sibling_dir
            .into_iter()
            .flat_map(|dir| candidates.iter().map(move |c| dir.join(c)))
            .chain(candidates.iter().cloned())
            .find(|candidate| self.root.join(candidate).is_file())
    }

    fn imports_target(&self, test_file: &Path, target_on_disk: &Path) -> Result<bool> {
        let reader = BufReader::new(File::open(test_file)?);
        for line in reader.lines() {
            let line = line?;
            if !is_import_line(&line) {
                continue;
            }
            let hit = line_tokens(&line)
                .filter_map(|token| self.locate(test_file, &token))
                .any(|found| same_file(&self.root.join(found), target_on_disk));
            if hit {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn scan_tests(&self, patterns: &[&str], target: &Path) -> Result<Vec<PathBuf>> {
        let patterns = patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        let target_on_disk = self.root.join(target);
        let mut found = Vec::new();

        let walker = WalkDir::new(&self.search_root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !should_ignore(entry.path()));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if !patterns.iter().any(|p| p.matches(&name)) {
                continue;
            }
            if same_file(entry.path(), &target_on_disk) {
                continue;
            }
            if self.imports_target(entry.path(), &target_on_disk)? {
                found.push(entry.path().to_path_buf());
                if found.len() >= MAX_RELATED_TEST_FILES {
                    break;
                }
            }
        }

        Ok(found)
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn should_ignore(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

    matches!(
        name,
        "target" | "node_modules" | ".git" | "dist" | "build" | ".idea" | ".vscode"
    )
}
