use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::error::{CutsubError, Result};

/// Source of operator answers.
///
/// The interactive binary reads from the terminal; tests hand in canned answers.
pub trait PromptProvider: Send {
    /// Show `question` and return the trimmed answer. End of input yields an empty answer.
    fn ask(&mut self, question: &str) -> Result<String>;
}

/// Prompts on stdout and reads a line from stdin
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl PromptProvider for StdinPrompt {
    fn ask(&mut self, question: &str) -> Result<String> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{}", question).map_err(|e| CutsubError::Prompt(e.to_string()))?;
        stdout.flush().map_err(|e| CutsubError::Prompt(e.to_string()))?;

        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| CutsubError::Prompt(format!("Failed to read answer: {}", e)))?;

        Ok(line.trim().to_string())
    }
}

/// Replays a fixed list of answers and records every question asked
#[derive(Debug, Default)]
pub struct CannedPrompt {
    answers: VecDeque<String>,
    questions: Vec<String>,
}

impl CannedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            questions: Vec::new(),
        }
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }
}

impl PromptProvider for CannedPrompt {
    fn ask(&mut self, question: &str) -> Result<String> {
        self.questions.push(question.to_string());
        Ok(self
            .answers
            .pop_front()
            .map(|answer| answer.trim().to_string())
            .unwrap_or_default())
    }
}
