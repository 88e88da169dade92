//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - `scripted` - Pre-recorded answers for tests and automation
//! - This module - The [Interaction] seam and its terminal implementation

use std::io::{self, BufRead, Write};

use crate::error::Result;
use crate::warning::FlowWarning;

pub mod formatter;
pub mod scripted;

pub use formatter::{
    display_error, display_manual_push_instruction, display_status, display_success,
    display_warning, manual_push_command,
};
pub use scripted::ScriptedInteraction;

/// Everything a flow command needs from the person running it:
/// yes/no confirmations, free-text answers and a place to report progress.
pub trait Interaction {
    /// Ask a yes/no question
    fn confirm(&self, prompt: &str) -> Result<bool>;

    /// Ask for a line of text; the answer is trimmed and may be empty
    fn input(&self, prompt: &str) -> Result<String>;

    /// Report progress
    fn status(&self, message: &str);

    /// Report a completed step
    fn success(&self, message: &str);

    /// Report a non-fatal condition
    fn warn(&self, warning: &FlowWarning);

    /// Show a web page, e.g. a freshly created pull request
    fn open_url(&self, url: &str);

    /// Tell the user how to push refs that were left local
    fn manual_push(&self, remote: &str, refs: &[String]) {
        self.status(&format!(
            "To push later, run: {}",
            manual_push_command(remote, refs)
        ));
    }
}

/// Interaction over stdin/stdout
#[derive(Debug, Default, Clone)]
pub struct TerminalInteraction {
    assume_yes: bool,
}

impl TerminalInteraction {
    /// Create a terminal interaction; with `assume_yes` every confirmation
    /// is answered yes without prompting
    pub fn new(assume_yes: bool) -> Self {
        TerminalInteraction { assume_yes }
    }

    fn read_answer(prompt: &str) -> Result<String> {
        print!("{}", prompt);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }
}

impl Interaction for TerminalInteraction {
    /// Displays the prompt and accepts "y" or "yes" (case-insensitive).
    /// Default is "no" if the user presses Enter.
    fn confirm(&self, prompt: &str) -> Result<bool> {
        if self.assume_yes {
            display_status(&format!("{} (y/N): yes", prompt));
            return Ok(true);
        }

        let response = Self::read_answer(&format!("\n{} (y/N): ", prompt))?.to_lowercase();
        Ok(response == "y" || response == "yes")
    }

    fn input(&self, prompt: &str) -> Result<String> {
        Self::read_answer(&format!("{}: ", prompt))
    }

    fn status(&self, message: &str) {
        display_status(message);
    }

    fn success(&self, message: &str) {
        display_success(message);
    }

    fn warn(&self, warning: &FlowWarning) {
        display_warning(warning);
    }

    fn manual_push(&self, remote: &str, refs: &[String]) {
        display_manual_push_instruction(remote, refs);
    }

    /// Opens the system browser; failing to do so only prints the URL.
    fn open_url(&self, url: &str) {
        if let Err(e) = webbrowser::open(url) {
            tracing::debug!(url = %url, error = %e, "cannot open browser");
            display_status(&format!("Could not open a browser, visit {}", url));
        }
    }
}
