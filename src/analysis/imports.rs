use std::path::PathBuf;

use crate::code::CANDIDATE_EXTENSIONS;

const IMPORT_MARKERS: [&str; 3] = ["import ", "from ", "require("];

pub fn is_import_line(line: &str) -> bool {
    IMPORT_MARKERS.iter().any(|marker| line.contains(marker))
}

/// How a single token on an import line is turned into file candidates.
#[derive(Debug, PartialEq, Eq)]
pub enum ImportToken {
    /// Already names a file, e.g. `helpers.py` or `./lib/util.js`.
    FileName(String),
    /// `.utils` or `./utils`: looked up beside the importing file first.
    Relative(String),
    /// `pkg.module`: dots become path separators.
    Dotted(String),
    /// A bare identifier, lowercased.
    Identifier(String),
}

impl ImportToken {
    pub fn classify(raw: &str) -> Option<Self> {
        let token = raw.trim_matches(|c: char| matches!(c, '\'' | '"' | '`' | ';' | ',' | '(' | ')'));
        if token.is_empty() || token.starts_with("..") {
            return None;
        }

        let stripped = token.trim_start_matches("./");
        if CANDIDATE_EXTENSIONS.iter().any(|ext| stripped.ends_with(ext)) {
            return Some(ImportToken::FileName(stripped.to_string()));
        }

        if token.starts_with('.') {
            let base = token
                .trim_start_matches(|c: char| c == '.' || c == '/')
                .replace('.', "/");
            return (!base.is_empty()).then_some(ImportToken::Relative(base));
        }

        if token.contains('.') {
            return Some(ImportToken::Dotted(token.replace('.', "/")));
        }

        is_identifier(token).then(|| ImportToken::Identifier(token.to_lowercase()))
    }

    /// Candidate paths in priority order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let base = match self {
            ImportToken::FileName(name) => return vec![PathBuf::from(name)],
            ImportToken::Relative(base) | ImportToken::Dotted(base) | ImportToken::Identifier(base) => {
                base
            }
        };
        CANDIDATE_EXTENSIONS
            .iter()
            .map(|ext| PathBuf::from(format!("{base}{ext}")))
            .collect()
    }
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Every classifiable token on one line, in order.
pub fn line_tokens(line: &str) -> impl Iterator<Item = ImportToken> + '_ {
    line.split_whitespace().filter_map(ImportToken::classify)
}
