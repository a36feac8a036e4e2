use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::ai::{self, CompletionClient};
use crate::analysis::RelatedFileResolver;
use crate::code::{ArtifactWriter, Language};
use crate::config::Config;
use crate::coverage::{CoverageReport, CoverageRunner};
use crate::executor::CommandRunner;
use crate::prompt::PromptBuilder;

/// Changed file paths in the order they were supplied. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    files: Vec<String>,
}

impl ChangeSet {
    /// Splits a single whitespace-separated argument. `None` or blank input
    /// gives an empty set.
    pub fn parse(arg: Option<&str>) -> Self {
        let files = arg
            .map(|raw| raw.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        Self { files }
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Extension not recognised; nothing was attempted.
    Skipped,
    NoPrompt,
    GenerationFailed,
    WriteFailed,
    Generated {
        artifact: PathBuf,
        coverage: Option<CoverageReport>,
    },
}

impl FileOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            FileOutcome::NoPrompt | FileOutcome::GenerationFailed | FileOutcome::WriteFailed
        )
    }
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub results: Vec<(String, FileOutcome)>,
}

impl RunSummary {
    pub fn generated(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, outcome)| matches!(outcome, FileOutcome::Generated { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, outcome)| *outcome == FileOutcome::Skipped)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, outcome)| outcome.is_failure())
            .count()
    }
}

/// Drives every changed file through detection, prompting, generation,
/// writing and coverage, one file at a time.
pub struct Pipeline {
    prompts: PromptBuilder,
    client: Box<dyn CompletionClient>,
    writer: ArtifactWriter,
    coverage: Option<CoverageRunner>,
}

impl Pipeline {
    pub fn new(
        config: &Config,
        client: Box<dyn CompletionClient>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let resolver = RelatedFileResolver::new(&config.paths.root, config.paths.search_root());
        Self {
            prompts: PromptBuilder::new(resolver),
            client,
            writer: ArtifactWriter::new(config.paths.output_root()),
            coverage: Some(CoverageRunner::new(runner)),
        }
    }

    pub fn without_coverage(mut self) -> Self {
        self.coverage = None;
        self
    }

    pub async fn run(&self, changes: &ChangeSet) -> RunSummary {
        let mut summary = RunSummary::default();
        if changes.is_empty() {
            info!("No files changed.");
            return summary;
        }

        for file in changes.files() {
            let outcome = self.process_file(file).await;
            summary.results.push((file.clone(), outcome));
        }
        summary
    }

    pub async fn process_file(&self, file: &str) -> FileOutcome {
        let path = Path::new(file);
        let language = Language::detect(path);
        if !language.is_known() {
            warn!("Unsupported file type: {}", file);
            return FileOutcome::Skipped;
        }

        info!("Processing {} ({})", file, language);
        let Some(prompt) = self.prompts.build_prompt(path, language) else {
            return FileOutcome::NoPrompt;
        };

        let Some(test_cases) = ai::generate(self.client.as_ref(), &prompt).await else {
            error!("Failed to generate test cases for {}", file);
            return FileOutcome::GenerationFailed;
        };

        if let Some(coverage) = &self.coverage {
            coverage.ensure_installed(language);
        }

        let Some(artifact) = self.writer.save(path, &test_cases, language) else {
            return FileOutcome::WriteFailed;
        };

        let coverage = self
            .coverage
            .as_ref()
            .and_then(|runner| runner.run_coverage(&artifact, language));

        FileOutcome::Generated { artifact, coverage }
    }
}
