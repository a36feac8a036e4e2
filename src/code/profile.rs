use super::Language;

/// Extensions tried, in order, when turning an import token into a file.
/// The first one that exists wins.
pub const CANDIDATE_EXTENSIONS: [&str; 3] = [".py", ".js", ".ts"];

/// Upper bound on related test files embedded in a prompt.
pub const MAX_RELATED_TEST_FILES: usize = 1;

const PYTHON_PATH_BOOTSTRAP: &str = "import sys\n\
import os\n\
sys.path.append(os.path.abspath(os.path.join(os.path.dirname(__file__), '../..')))\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelatedStrategy {
    ImportScan,
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingRule {
    PrefixTest,
    SuffixTest,
    KeepStem,
}

impl NamingRule {
    pub fn apply(&self, stem: &str) -> String {
        match self {
            NamingRule::PrefixTest if !stem.starts_with("test_") => format!("test_{stem}"),
            NamingRule::SuffixTest if !stem.ends_with("_test") => format!("{stem}_test"),
            _ => stem.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoveragePlan {
    PythonCoverage,
    Jest,
    GoCover,
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCheck {
    PipPackage(&'static str),
    NpmPackage(&'static str),
    Note(&'static str),
    Unsupported,
}

/// Everything the pipeline needs to know about one language.
#[derive(Debug)]
pub struct LanguageProfile {
    pub language: Language,
    pub label: &'static str,
    pub extensions: &'static [&'static str],
    pub framework: &'static str,
    pub related: RelatedStrategy,
    pub test_patterns: &'static [&'static str],
    pub naming: NamingRule,
    pub output_extension: Option<&'static str>,
    pub header: Option<&'static str>,
    pub coverage: CoveragePlan,
    pub tool_check: ToolCheck,
}

static PROFILES: [LanguageProfile; 8] = [
    LanguageProfile {
        language: Language::Python,
        label: "Python",
        extensions: &["py"],
        framework: "pytest",
        related: RelatedStrategy::ImportScan,
        test_patterns: &["tests.py", "test.py", "test_*.py", "*_test.py"],
        naming: NamingRule::PrefixTest,
        output_extension: None,
        header: Some(PYTHON_PATH_BOOTSTRAP),
        coverage: CoveragePlan::PythonCoverage,
        tool_check: ToolCheck::PipPackage("coverage"),
    },
    LanguageProfile {
        language: Language::JavaScript,
        label: "JavaScript",
        extensions: &["js"],
        framework: "jest",
        related: RelatedStrategy::ImportScan,
        test_patterns: &["*.test.js", "*.spec.js"],
        naming: NamingRule::PrefixTest,
        output_extension: Some("js"),
        header: None,
        coverage: CoveragePlan::Jest,
        tool_check: ToolCheck::NpmPackage("jest"),
    },
    LanguageProfile {
        language: Language::TypeScript,
        label: "TypeScript",
        extensions: &["ts"],
        framework: "jest",
        related: RelatedStrategy::ImportScan,
        test_patterns: &["*.test.ts", "*.spec.ts"],
        naming: NamingRule::KeepStem,
        output_extension: None,
        header: None,
        coverage: CoveragePlan::Unsupported,
        tool_check: ToolCheck::Unsupported,
    },
    LanguageProfile {
        language: Language::Java,
        label: "Java",
        extensions: &["java"],
        framework: "JUnit",
        related: RelatedStrategy::Unsupported,
        test_patterns: &[],
        naming: NamingRule::KeepStem,
        output_extension: None,
        header: None,
        coverage: CoveragePlan::Unsupported,
        tool_check: ToolCheck::Note("Ensure Jacoco is configured in your Maven/Gradle build."),
    },
    LanguageProfile {
        language: Language::Cpp,
        label: "C++",
        extensions: &["cpp"],
        framework: "Google Test",
        related: RelatedStrategy::Unsupported,
        test_patterns: &[],
        naming: NamingRule::KeepStem,
        output_extension: None,
        header: None,
        coverage: CoveragePlan::Unsupported,
        tool_check: ToolCheck::Unsupported,
    },
    LanguageProfile {
        language: Language::CSharp,
        label: "C#",
        extensions: &["cs"],
        framework: "NUnit",
        related: RelatedStrategy::Unsupported,
        test_patterns: &[],
        naming: NamingRule::KeepStem,
        output_extension: None,
        header: None,
        coverage: CoveragePlan::Unsupported,
        tool_check: ToolCheck::Unsupported,
    },
    LanguageProfile {
        language: Language::Go,
        label: "Go",
        extensions: &["go"],
        framework: "testing",
        related: RelatedStrategy::Unsupported,
        test_patterns: &[],
        naming: NamingRule::SuffixTest,
        output_extension: Some("go"),
        header: None,
        coverage: CoveragePlan::GoCover,
        tool_check: ToolCheck::Note("Go coverage is handled by the 'go test' command."),
    },
    LanguageProfile {
        language: Language::Unknown,
        label: "Unknown",
        extensions: &[],
        framework: "unknown",
        related: RelatedStrategy::Unsupported,
        test_patterns: &[],
        naming: NamingRule::KeepStem,
        output_extension: None,
        header: None,
        coverage: CoveragePlan::Unsupported,
        tool_check: ToolCheck::Unsupported,
    },
];

pub(super) fn lookup(language: Language) -> &'static LanguageProfile {
    PROFILES
        .iter()
        .find(|profile| profile.language == language)
        .unwrap_or(&PROFILES[PROFILES.len() - 1])
}
