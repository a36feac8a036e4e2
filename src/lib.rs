pub mod ai;
pub mod analysis;
pub mod cli;
pub mod code;
pub mod config;
pub mod coverage;
pub mod executor;
pub mod pipeline;
pub mod prompt;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use ai::{CompletionClient, OpenAIClient};
pub use code::Language;
pub use config::Config;
pub use pipeline::{ChangeSet, FileOutcome, Pipeline, RunSummary};
