use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "testgen",
    version,
    about = "Generate unit tests for changed source files and run coverage on them"
)]
pub struct Cli {
    /// Changed files as one whitespace-separated list, e.g. "src/app.py src/util.js"
    #[arg(value_name = "CHANGED_FILES")]
    pub changed_files: Option<String>,

    /// Directory changed paths and imports are resolved against
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Where generated tests are written, relative to the root
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Optional TOML file with [ai] and [paths] settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write generated tests without running coverage tools
    #[arg(long)]
    pub skip_coverage: bool,

    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            "warn"
        }
    }
}
