//! Operator confirmation

use std::io::IsTerminal;

use anyhow::{Context, Result};
use dialoguer::Confirm as Prompt;
use tracing::warn;

/// Asks the operator a yes/no question before a destructive step.
#[cfg_attr(test, mockall::automock)]
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Interactive prompt on the controlling terminal. Defaults to "no".
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        if !std::io::stdin().is_terminal() {
            anyhow::bail!(
                "Cannot prompt for confirmation without a terminal; pass --yes to skip prompts"
            );
        }
        Prompt::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .context("Failed to read confirmation")
    }
}

/// Ask `confirm`, treating a prompt error as "no".
pub fn ask<C: Confirm + ?Sized>(confirm: &C, prompt: &str) -> bool {
    match confirm.confirm(prompt) {
        Ok(answer) => answer,
        Err(e) => {
            warn!(error = %e, "Confirmation failed, treating as declined");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_error_is_a_decline() {
        let mut confirm = MockConfirm::new();
        confirm
            .expect_confirm()
            .returning(|_| Err(anyhow::anyhow!("stdin closed")));
        assert!(!ask(&confirm, "Delete?"));
    }

    #[test]
    fn passes_answers_through() {
        let mut confirm = MockConfirm::new();
        confirm
            .expect_confirm()
            .withf(|p| p.contains("AKIA1"))
            .times(1)
            .returning(|_| Ok(true));
        assert!(ask(&confirm, "Deactivate AKIA1?"));
    }
}
