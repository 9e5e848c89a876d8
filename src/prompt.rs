//! Interactive prompts.
//!
//! The ordering workflow only talks to the [`Prompter`] trait so it can be
//! driven by scripted answers in tests. [`TerminalPrompter`] implements it
//! on top of `dialoguer`, which shares the `console` backend with the rest
//! of the UI.

use std::io;

use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password, Select};
use thiserror::Error;

/// Maximum characters accepted by free-text prompts.
pub const TEXT_CHAR_LIMIT: usize = 500;

#[derive(Debug, Error)]
pub enum PromptError {
    /// The user pressed Esc or Ctrl-C.
    #[error("prompt cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(io::Error),
}

impl From<dialoguer::Error> for PromptError {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(e) if e.kind() == io::ErrorKind::Interrupted => {
                PromptError::Cancelled
            }
            dialoguer::Error::IO(e) => PromptError::Io(e),
        }
    }
}

/// Questions the ordering workflow asks the user. Every method returns
/// [`PromptError::Cancelled`] when the user backs out.
pub trait Prompter {
    /// Ask for an integer in `min..=max`, pre-filled with `default`.
    fn prompt_int(&mut self, label: &str, min: u32, max: u32, default: u32)
    -> Result<u32, PromptError>;

    fn prompt_confirm(&mut self, label: &str, default: bool) -> Result<bool, PromptError>;

    /// Pick one of `options`, returning its index.
    fn prompt_select(&mut self, label: &str, options: &[String]) -> Result<usize, PromptError>;

    /// Free text. When `optional` an empty answer is accepted.
    fn prompt_text(
        &mut self,
        label: &str,
        placeholder: &str,
        help: &str,
        optional: bool,
    ) -> Result<String, PromptError>;
}

/// [`Prompter`] backed by `dialoguer` on the controlling terminal.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl TerminalPrompter {
    /// Prompter with the colorful theme.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hidden input, used for passwords at login and signup.
    pub fn prompt_password(&mut self, label: &str) -> Result<String, PromptError> {
        Ok(Password::with_theme(&self.theme)
            .with_prompt(label)
            .interact()?)
    }
}

impl Prompter for TerminalPrompter {
    fn prompt_int(
        &mut self,
        label: &str,
        min: u32,
        max: u32,
        default: u32,
    ) -> Result<u32, PromptError> {
        Ok(Input::<u32>::with_theme(&self.theme)
            .with_prompt(label)
            .default(default)
            .validate_with(move |value: &u32| -> Result<(), String> {
                if (min..=max).contains(value) {
                    Ok(())
                } else {
                    Err(format!("quantity must be between {min} and {max} kg"))
                }
            })
            .interact_text()?)
    }

    fn prompt_confirm(&mut self, label: &str, default: bool) -> Result<bool, PromptError> {
        Confirm::with_theme(&self.theme)
            .with_prompt(label)
            .default(default)
            .interact_opt()?
            .ok_or(PromptError::Cancelled)
    }

    fn prompt_select(&mut self, label: &str, options: &[String]) -> Result<usize, PromptError> {
        Select::with_theme(&self.theme)
            .with_prompt(label)
            .items(options)
            .interact_opt()?
            .ok_or(PromptError::Cancelled)
    }

    fn prompt_text(
        &mut self,
        label: &str,
        placeholder: &str,
        help: &str,
        optional: bool,
    ) -> Result<String, PromptError> {
        if !help.is_empty() {
            println!("  {}", style(help).dim());
        }
        if !placeholder.is_empty() {
            println!("  {}", style(placeholder).dim().italic());
        }
        let text = Input::<String>::with_theme(&self.theme)
            .with_prompt(label)
            .allow_empty(optional)
            .validate_with(|value: &String| -> Result<(), String> {
                if value.chars().count() <= TEXT_CHAR_LIMIT {
                    Ok(())
                } else {
                    Err(format!("please keep it under {TEXT_CHAR_LIMIT} characters"))
                }
            })
            .interact_text()?;
        Ok(text.trim().to_string())
    }
}
