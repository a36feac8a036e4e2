use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::ai::{AIError, CompletionClient};
use crate::executor::{display_command, CommandOutput, CommandRunner};

/// Records every command line and answers with canned output.
#[derive(Default)]
pub(crate) struct FakeRunner {
    calls: Mutex<Vec<String>>,
    stdout: String,
    fail_prefix: Option<String>,
    unspawnable: bool,
}

impl FakeRunner {
    pub fn with_stdout(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            ..Self::default()
        }
    }

    /// Commands whose command line starts with `prefix` exit nonzero.
    pub fn failing_on(prefix: &str) -> Self {
        Self {
            fail_prefix: Some(prefix.to_string()),
            ..Self::default()
        }
    }

    pub fn unspawnable() -> Self {
        Self {
            unspawnable: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        let line = display_command(program, args);
        self.calls.lock().unwrap().push(line.clone());

        if self.unspawnable {
            return Err(anyhow!("No such file or directory: {}", program));
        }

        let failed = self
            .fail_prefix
            .as_deref()
            .is_some_and(|prefix| line.starts_with(prefix));
        Ok(CommandOutput {
            stdout: self.stdout.clone(),
            stderr: if failed { "boom".to_string() } else { String::new() },
            success: !failed,
        })
    }
}

/// Shared view of the prompts a [`FakeClient`] received.
#[derive(Clone, Default)]
pub(crate) struct PromptLog(Arc<Mutex<Vec<String>>>);

impl PromptLog {
    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

pub(crate) struct FakeClient {
    reply: Option<String>,
    log: PromptLog,
}

impl FakeClient {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            log: PromptLog::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            log: PromptLog::default(),
        }
    }

    pub fn calls(&self) -> PromptLog {
        self.log.clone()
    }
}

#[async_trait]
impl CompletionClient for FakeClient {
    async fn complete(&self, prompt: &str) -> Result<String, AIError> {
        self.log.0.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .ok_or_else(|| AIError::NetworkError("connection refused".to_string()))
    }
}
