use anyhow::{anyhow, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use super::Language;

/// Writes generated test code to `<output_root>/<language>/<name><ext>`.
pub struct ArtifactWriter {
    output_root: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_root: impl AsRef<Path>) -> Self {
        Self {
            output_root: output_root.as_ref().to_path_buf(),
        }
    }

    pub fn output_path(&self, source: &Path, language: Language) -> PathBuf {
        let profile = language.profile();
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let base_name = profile.naming.apply(&stem);

        let extension = profile
            .output_extension
            .map(str::to_string)
            .or_else(|| {
                source
                    .extension()
                    .map(|ext| ext.to_string_lossy().into_owned())
            });

        let file_name = match extension {
            Some(ext) => format!("{base_name}.{ext}"),
            None => base_name,
        };

        self.output_root.join(language.dir_name()).join(file_name)
    }

    /// Writes `generated` for `source` and returns the path it landed at.
    /// Failures are logged, not returned.
    pub fn save(&self, source: &Path, generated: &str, language: Language) -> Option<PathBuf> {
        let path = self.output_path(source, language);
        match self.write_artifact(&path, generated, language) {
            Ok(size) => {
                info!("Test cases saved to {} ({} bytes)", path.display(), size);
                Some(path)
            }
            Err(e) => {
                error!("Error saving test cases to {}: {}", path.display(), e);
                None
            }
        }
    }

    fn write_artifact(&self, path: &Path, generated: &str, language: Language) -> Result<u64> {
        let content = match language.profile().header {
            Some(header) => format!("{header}{generated}"),
            None => generated.to_string(),
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;

        if !path.exists() {
            return Err(anyhow!("file {} was not created", path.display()));
        }
        Ok(fs::metadata(path)?.len())
    }
}
