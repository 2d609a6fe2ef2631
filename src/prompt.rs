use std::io::{self, BufRead, Write};

use crate::error::{ReportError, Result};
use crate::services::placeholder_agent_name;

/// Interactive confirmation and free-text questions.
pub trait Prompt {
    fn confirm(&mut self, message: &str) -> bool;

    /// `None` when the user cancels.
    fn ask(&mut self, message: &str, default: &str) -> Option<String>;
}

/// Line-oriented prompt over any reader/writer pair.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_answer(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

impl LinePrompt<io::StdinLock<'static>, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn confirm(&mut self, message: &str) -> bool {
        let _ = write!(self.output, "{} [y/N] ", message);
        let _ = self.output.flush();
        matches!(
            self.read_answer().map(|a| a.to_ascii_lowercase()).as_deref(),
            Some("y") | Some("yes")
        )
    }

    fn ask(&mut self, message: &str, default: &str) -> Option<String> {
        let _ = write!(self.output, "{} [{}] ", message, default);
        let _ = self.output.flush();
        let answer = self.read_answer()?;
        if answer.is_empty() {
            Some(default.to_string())
        } else {
            Some(answer)
        }
    }
}

/// Agent name from the command line, or asked for with a random default.
pub fn resolve_agent_name(prompt: &mut dyn Prompt, explicit: Option<String>) -> Result<String> {
    if let Some(name) = explicit {
        return Ok(name);
    }
    prompt
        .ask("Assign agent name (demo):", &placeholder_agent_name())
        .ok_or(ReportError::Cancelled)
}

pub fn confirm_reset(prompt: &mut dyn Prompt, assume_yes: bool) -> bool {
    assume_yes || prompt.confirm("Clear all demo data?")
}
