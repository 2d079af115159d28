//! Interactive prompts.
//!
//! Everything that asks the operator a question goes through [`Prompter`],
//! so the curation flow can be driven by a script in tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

use crate::error::{CuratorError, Result};

/// Blocking single-choice, free-text and yes/no prompts.
pub trait Prompter {
    /// Ask the operator to pick one of `items`; returns its index.
    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize>;

    /// Ask for free text. Empty answers are allowed.
    fn input(&self, prompt: &str) -> Result<String>;

    /// Ask a yes/no question.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

/// Terminal prompter. The theme is fixed for the lifetime of the session.
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    #[must_use]
    pub fn new(theme: ColorfulTheme) -> Self {
        Self { theme }
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new(ColorfulTheme::default())
    }
}

impl Prompter for DialoguerPrompter {
    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact()?)
    }

    fn input(&self, prompt: &str) -> Result<String> {
        Ok(Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?)
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }
}

/// A scripted answer for [`ScriptedPrompter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Pick the item with this text.
    Select(String),
    /// Type this text.
    Input(String),
    /// Answer yes or no.
    Confirm(bool),
}

impl Answer {
    pub fn select(item: impl Into<String>) -> Self {
        Self::Select(item.into())
    }

    pub fn input(text: impl Into<String>) -> Self {
        Self::Input(text.into())
    }
}

/// Prompter that replays a fixed sequence of answers.
///
/// Running out of answers, or an answer of the wrong kind, is reported as a
/// [`CuratorError::Validation`].
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<Answer>>,
    asked: RefCell<Vec<String>>,
    defaults: RefCell<Vec<usize>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: RefCell::new(answers.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Every prompt shown so far, in order.
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    /// Default index of every select prompt shown so far.
    pub fn select_defaults(&self) -> Vec<usize> {
        self.defaults.borrow().clone()
    }

    /// Answers not consumed yet.
    pub fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }

    fn next(&self, prompt: &str) -> Result<Answer> {
        self.asked.borrow_mut().push(prompt.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| CuratorError::Validation(format!("No scripted answer for '{prompt}'")))
    }
}

fn unexpected(prompt: &str, answer: &Answer) -> CuratorError {
    CuratorError::Validation(format!("Unexpected answer {answer:?} for '{prompt}'"))
}

impl Prompter for ScriptedPrompter {
    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize> {
        self.defaults.borrow_mut().push(default);
        match self.next(prompt)? {
            Answer::Select(item) => items.iter().position(|i| *i == item).ok_or_else(|| {
                CuratorError::Validation(format!("'{item}' is not one of {items:?}"))
            }),
            other => Err(unexpected(prompt, &other)),
        }
    }

    fn input(&self, prompt: &str) -> Result<String> {
        match self.next(prompt)? {
            Answer::Input(text) => Ok(text),
            other => Err(unexpected(prompt, &other)),
        }
    }

    fn confirm(&self, prompt: &str, _default: bool) -> Result<bool> {
        match self.next(prompt)? {
            Answer::Confirm(yes) => Ok(yes),
            other => Err(unexpected(prompt, &other)),
        }
    }
}
