use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::code::{CoveragePlan, Language, ToolCheck};
use crate::executor::{display_command, CommandRunner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandStep {
    pub program: String,
    pub args: Vec<String>,
    /// When set, stdout of this step is written to the given file.
    pub capture_to: Option<PathBuf>,
}

impl CommandStep {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            capture_to: None,
        }
    }

    fn capture(mut self, path: &Path) -> Self {
        self.capture_to = Some(path.to_path_buf());
        self
    }

    fn command_line(&self) -> String {
        display_command(&self.program, &self.args)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageReport {
    pub path: PathBuf,
    pub success: bool,
}

pub fn report_path(artifact: &Path) -> PathBuf {
    let stem = artifact
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    artifact.with_file_name(format!("{stem}_coverage_report.txt"))
}

/// Invokes the coverage tool that matches a language's profile.
pub struct CoverageRunner {
    runner: Arc<dyn CommandRunner>,
    python: String,
}

impl CoverageRunner {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            python: "python3".to_string(),
        }
    }

    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }

    pub fn plan(&self, artifact: &Path, language: Language) -> Vec<CommandStep> {
        let artifact_arg = artifact.to_string_lossy().into_owned();
        let artifact_arg = artifact_arg.as_str();
        let report = report_path(artifact);

        match language.profile().coverage {
            CoveragePlan::PythonCoverage => vec![
                CommandStep::new("coverage", &["run", artifact_arg]),
                CommandStep::new("coverage", &["report", "-m", "--omit=*/site-packages/*"])
                    .capture(&report),
            ],
            CoveragePlan::Jest => {
                vec![CommandStep::new("jest", &["--coverage", artifact_arg]).capture(&report)]
            }
            CoveragePlan::GoCover => {
                let profile = artifact.with_file_name("coverage.out");
                let profile_flag = format!("-coverprofile={}", profile.display());
                let html_flag = format!("-html={}", profile.display());
                let report_arg = report.to_string_lossy().into_owned();
                vec![
                    CommandStep::new("go", &["test", profile_flag.as_str(), artifact_arg]),
                    CommandStep::new(
                        "go",
                        &["tool", "cover", html_flag.as_str(), "-o", report_arg.as_str()],
                    ),
                ]
            }
            CoveragePlan::Unsupported => Vec::new(),
        }
    }

    /// Runs the coverage plan for `artifact`. Returns `None` when the language
    /// has no coverage tooling; a failing tool yields `success: false`.
    pub fn run_coverage(&self, artifact: &Path, language: Language) -> Option<CoverageReport> {
        let steps = self.plan(artifact, language);
        if steps.is_empty() {
            warn!("No coverage report generation implemented for {}.", language);
            return None;
        }

        let path = report_path(artifact);
        for step in &steps {
            if let Err(e) = self.run_step(step) {
                error!(
                    "Error generating coverage report for {}: {}",
                    artifact.display(),
                    e
                );
                return Some(CoverageReport { path, success: false });
            }
        }

        info!("Code coverage report saved to {}", path.display());
        Some(CoverageReport { path, success: true })
    }

    fn run_step(&self, step: &CommandStep) -> anyhow::Result<()> {
        let output = self.runner.run(&step.program, &step.args)?;
        if let Some(target) = &step.capture_to {
            fs::write(target, &output.stdout)?;
        }
        if !output.success {
            anyhow::bail!("`{}` failed: {}", step.command_line(), output.stderr);
        }
        Ok(())
    }

    pub fn tool_steps(&self, language: Language) -> Option<(CommandStep, CommandStep)> {
        match language.profile().tool_check {
            ToolCheck::PipPackage(package) => Some((
                CommandStep::new(&self.python, &["-m", "pip", "show", package]),
                CommandStep::new(&self.python, &["-m", "pip", "install", package]),
            )),
            ToolCheck::NpmPackage(package) => Some((
                CommandStep::new("npm", &["list", package]),
                CommandStep::new("npm", &["install", package]),
            )),
            ToolCheck::Note(_) | ToolCheck::Unsupported => None,
        }
    }

    /// Makes sure the coverage tool for `language` is present, installing it
    /// when the presence check fails. Never fatal.
    pub fn ensure_installed(&self, language: Language) {
        if let ToolCheck::Note(note) = language.profile().tool_check {
            info!("{}", note);
            return;
        }

        let Some((check, install)) = self.tool_steps(language) else {
            warn!(
                "Coverage tool check is not configured for {}. Please add it manually.",
                language
            );
            return;
        };

        if self.run_step(&check).is_ok() {
            info!("Coverage tool for {} is already installed.", language);
            return;
        }

        error!("Coverage tool for {} is not installed. Installing...", language);
        match self.run_step(&install) {
            Ok(()) => info!("Coverage tool for {} has been installed.", language),
            Err(e) => error!(
                "Failed to install the coverage tool for {}: {}. Please install it manually.",
                language, e
            ),
        }
    }
}
