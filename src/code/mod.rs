use std::fmt;
use std::path::Path;

mod profile;
mod writer;

pub use profile::{
    CoveragePlan, LanguageProfile, NamingRule, RelatedStrategy, ToolCheck, CANDIDATE_EXTENSIONS,
    MAX_RELATED_TEST_FILES,
};
pub use writer::ArtifactWriter;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Copy)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Cpp,
    CSharp,
    Go,
    Unknown,
}

impl Language {
    pub const ALL: [Language; 8] = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Java,
        Language::Cpp,
        Language::CSharp,
        Language::Go,
        Language::Unknown,
    ];

    /// Maps a bare extension (no leading dot) to a language, ignoring case.
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.profile().extensions.contains(&ext.as_str()))
            .unwrap_or(Language::Unknown)
    }

    pub fn detect(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    pub fn profile(&self) -> &'static LanguageProfile {
        profile::lookup(*self)
    }

    pub fn label(&self) -> &'static str {
        self.profile().label
    }

    /// Directory name used under the output root, e.g. `javascript` or `c++`.
    pub fn dir_name(&self) -> String {
        self.label().to_lowercase()
    }

    pub fn test_framework(&self) -> &'static str {
        self.profile().framework
    }

    pub fn is_known(&self) -> bool {
        *self != Language::Unknown
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
