use std::cell::RefCell;
use std::collections::VecDeque;

use super::Interaction;
use crate::error::{FlowError, Result};
use crate::warning::FlowWarning;

/// Interaction that replays pre-recorded answers and keeps every message.
///
/// Confirmations and text prompts draw from separate queues. Running out of
/// answers is an error so a test notices an unexpected prompt.
#[derive(Debug, Default)]
pub struct ScriptedInteraction {
    confirmations: RefCell<VecDeque<bool>>,
    answers: RefCell<VecDeque<String>>,
    prompts: RefCell<Vec<String>>,
    messages: RefCell<Vec<String>>,
    warnings: RefCell<Vec<FlowWarning>>,
    opened: RefCell<Vec<String>>,
}

impl ScriptedInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue answers to yes/no questions
    pub fn with_confirmations(self, answers: &[bool]) -> Self {
        self.confirmations.borrow_mut().extend(answers.iter().copied());
        self
    }

    /// Queue answers to text prompts
    pub fn with_answers(self, answers: &[&str]) -> Self {
        self.answers
            .borrow_mut()
            .extend(answers.iter().map(|s| s.to_string()));
        self
    }

    /// Every prompt shown, confirmations included
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    /// Status and success messages, in order
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    /// Warnings reported, in order
    pub fn warnings(&self) -> Vec<FlowWarning> {
        self.warnings.borrow().clone()
    }

    /// URLs that would have been opened in a browser
    pub fn opened_urls(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }

    fn exhausted(prompt: &str) -> FlowError {
        FlowError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("no scripted answer for '{}'", prompt),
        ))
    }
}

impl Interaction for ScriptedInteraction {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.confirmations
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| Self::exhausted(prompt))
    }

    fn input(&self, prompt: &str) -> Result<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .map(|answer| answer.trim().to_string())
            .ok_or_else(|| Self::exhausted(prompt))
    }

    fn status(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }

    fn success(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }

    fn warn(&self, warning: &FlowWarning) {
        self.warnings.borrow_mut().push(warning.clone());
    }

    fn open_url(&self, url: &str) {
        self.opened.borrow_mut().push(url.to_string());
    }
}
