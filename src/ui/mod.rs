//! User interface module - interaction (prompts) and formatting.
//!
//! - `formatter` - styled output
//! - this module - confirmation prompts

use std::io::{self, Write};

use anyhow::Result;

pub mod formatter;

pub use formatter::{
    display_analysis, display_boundary_warning, display_branches, display_error,
    display_next_release, display_status, display_success,
};

/// Prompts the user with a yes/no question, defaulting to "no".
pub fn confirm_action(prompt: &str) -> Result<bool> {
    print!("\n{} (y/N): ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(is_confirmation(&input))
}

/// "y" or "yes", case-insensitive
pub fn is_confirmation(input: &str) -> bool {
    let response = input.trim().to_lowercase();
    response == "y" || response == "yes"
}
