use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::analysis::{RelatedFileResolver, RelatedFileSet};
use crate::code::Language;

/// The composed text sent to the generation service for one changed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    target: PathBuf,
    text: String,
}

impl Prompt {
    pub fn new(target: PathBuf, text: String) -> Self {
        Self { target, text }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

pub struct PromptBuilder {
    resolver: RelatedFileResolver,
}

impl PromptBuilder {
    pub fn new(resolver: RelatedFileResolver) -> Self {
        Self { resolver }
    }

    /// Returns `None` when the target itself cannot be read.
    pub fn build_prompt(&self, path: &Path, language: Language) -> Option<Prompt> {
        let code = match fs::read_to_string(self.resolver.root().join(path)) {
            Ok(code) => code,
            Err(e) => {
                error!("Error reading file {}: {}", path.display(), e);
                return None;
            }
        };

        let related = self.resolver.resolve(language, path);
        let related_content = self.related_context(path, &related);
        let related_test_content = self.related_tests(path, &related);

        let text = format_prompt(
            language,
            &path.display().to_string(),
            &code,
            &related_content,
            &related_test_content,
        );
        info!(
            "Created prompt for {} with length {} characters",
            path.display(),
            text.chars().count()
        );

        Some(Prompt::new(path.to_path_buf(), text))
    }

    fn related_context(&self, path: &Path, related: &RelatedFileSet) -> String {
        if related.imports.is_empty() {
            info!("No related files found for {} to reference", path.display());
        } else {
            info!("Related files for {}: {:?}", path.display(), related.imports);
        }

        let mut content = String::new();
        for file in &related.imports {
            match fs::read_to_string(self.resolver.root().join(file)) {
                Ok(file_content) => {
                    let module = module_path(file);
                    content.push_str(&format!(
                        "\n\n// Module: {module}\nimport {module}\n{file_content}"
                    ));
                    info!(
                        "Included content from related file: {} as module {}",
                        file.display(),
                        module
                    );
                }
                Err(e) => error!("Error reading related file {}: {}", file.display(), e),
            }
        }
        content
    }

    fn related_tests(&self, path: &Path, related: &RelatedFileSet) -> String {
        if related.tests.is_empty() {
            info!("No related test files found for {} to reference", path.display());
        } else {
            info!("Related test files for {}: {:?}", path.display(), related.tests);
        }

        let mut content = String::new();
        for file in &related.tests {
            match fs::read_to_string(file) {
                Ok(file_content) => {
                    content.push_str(&format!(
                        "\n\n// Related test file: {}\n{}",
                        file.display(),
                        file_content
                    ));
                    info!("Included content from related test file: {}", file.display());
                }
                Err(e) => error!("Error reading related test file {}: {}", file.display(), e),
            }
        }
        content
    }
}

/// `pkg/models.py` becomes `pkg.models`.
pub fn module_path(file: &Path) -> String {
    file.with_extension("")
        .to_string_lossy()
        .replace(['/', '\\'], ".")
}

pub fn format_prompt(
    language: Language,
    file_name: &str,
    code: &str,
    related_content: &str,
    related_test_content: &str,
) -> String {
    let framework = language.test_framework();
    format!(
        "Generate comprehensive unit tests for the following {language} file: {file_name} using {framework}.

Requirements:
1. Include edge cases, normal cases, and error cases.
2. Use mocking where appropriate for external dependencies.
3. Include setup and teardown if needed.
4. Add descriptive test names and docstrings.
5. Follow {framework} best practices.
6. Ensure high code coverage.
7. Test both success and failure scenarios.

Code to test (File: {file_name}):

{code}

Related context:

{related_content}

Related test cases:

{related_test_content}

Generate only the test code without any explanations or notes."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn builder(dir: &TempDir) -> PromptBuilder {
        PromptBuilder::new(RelatedFileResolver::new(dir.path(), dir.path()))
    }

    fn write(dir: &TempDir, rel: &str, content: &str) {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn unreadable_target_produces_no_prompt() {
        let dir = TempDir::new().unwrap();
        assert!(builder(&dir)
            .build_prompt(Path::new("missing.py"), Language::Python)
            .is_none());
    }

    #[test]
    fn prompt_embeds_code_related_modules_and_tests() {
        let dir = TempDir::new().unwrap();
        write(&dir, "app.py", "from pkg.models import User\n\ndef main(): pass\n");
        write(&dir, "pkg/models.py", "class User: pass\n");
        write(&dir, "tests/test_app.py", "import app\n\ndef test_main(): app.main()\n");

        let prompt = builder(&dir)
            .build_prompt(Path::new("app.py"), Language::Python)
            .unwrap();
        let text = prompt.text();

        assert_eq!(prompt.target(), Path::new("app.py"));
        assert!(text.starts_with(
            "Generate comprehensive unit tests for the following Python file: app.py using pytest."
        ));
        assert!(text.contains("5. Follow pytest best practices."));
        assert!(text.contains("Code to test (File: app.py):\n\nfrom pkg.models import User"));
        assert!(text.contains("// Module: pkg.models\nimport pkg.models\nclass User: pass"));
        assert!(text.contains(&format!(
            "// Related test file: {}\nimport app",
            dir.path().join("tests/test_app.py").display()
        )));
        assert!(text.ends_with("Generate only the test code without any explanations or notes."));
    }

    #[test]
    fn prompt_is_deterministic() {
        let dir = TempDir::new().unwrap();
        write(&dir, "index.js", "const util = require('./util');\nimport helpers from './helpers.js';\n");
        write(&dir, "util.js", "module.exports = {};\n");
        write(&dir, "helpers.js", "export default {};\n");
        write(&dir, "index.test.js", "import index from './index';\n");

        let builder = builder(&dir);
        let first = builder.build_prompt(Path::new("index.js"), Language::JavaScript);
        let second = builder.build_prompt(Path::new("index.js"), Language::JavaScript);

        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn languages_without_related_discovery_still_get_a_prompt() {
        let dir = TempDir::new().unwrap();
        write(&dir, "main.go", "package main\n\nimport \"fmt\"\n");

        let prompt = builder(&dir)
            .build_prompt(Path::new("main.go"), Language::Go)
            .unwrap();
        assert!(prompt.text().contains("Go file: main.go using testing."));
        assert!(prompt.text().contains("Related context:\n\n\n\nRelated test cases:"));
    }

    #[test]
    fn unknown_language_uses_unknown_framework() {
        let text = format_prompt(Language::Unknown, "notes.txt", "hello", "", "");
        assert!(text.contains("Unknown file: notes.txt using unknown."));
    }

    #[test]
    fn module_paths_use_dots() {
        assert_eq!(module_path(Path::new("pkg/models.py")), "pkg.models");
        assert_eq!(module_path(Path::new("utils.js")), "utils");
    }
}
