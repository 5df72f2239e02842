//! Command implementations.
//!
//! Each subcommand is implemented in its own module for clean separation.

pub(crate) mod completions;
pub(crate) mod delete;
pub(crate) mod devices;
pub(crate) mod diag;
pub(crate) mod flash;
pub(crate) mod listing;
pub(crate) mod run;
pub(crate) mod transfer;

use anyhow::Result;
use dialoguer::{Confirm, Error as DialoguerError, theme::ColorfulTheme};

use crate::CliError;

/// Ask a yes/no question, defaulting to no. In non-interactive mode the
/// prompt becomes a usage error so scripts fail fast instead of hanging.
pub(crate) fn confirm(prompt: &str, non_interactive: bool) -> Result<bool> {
    if non_interactive {
        return Err(CliError::Usage(format!(
            "confirmation required: {prompt} (pass --yes to proceed)"
        ))
        .into());
    }

    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact_opt()
        .map_err(map_prompt_error)?;

    Ok(confirmed.unwrap_or(false))
}

pub(crate) fn map_prompt_error(err: DialoguerError) -> anyhow::Error {
    match err {
        DialoguerError::IO(io_err) => {
            if io_err.kind() == std::io::ErrorKind::Interrupted {
                CliError::Cancelled("cancelled".to_string()).into()
            } else {
                CliError::Usage("prompt failed (no usable terminal?)".to_string()).into()
            }
        }
    }
}
