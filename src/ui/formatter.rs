//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from user interaction.

use crate::warning::FlowWarning;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("\x1b[31mERROR:\x1b[0m {}", message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("\x1b[32m✓\x1b[0m {}", message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("\x1b[33m→\x1b[0m {}", message);
}

/// Display a flow warning to the user.
///
/// Shows a yellow warning icon followed by the warning message.
pub fn display_warning(warning: &FlowWarning) {
    eprintln!("\x1b[33m⚠ WARNING:\x1b[0m {}", warning);
}

/// Git command that pushes the given refs by hand
pub fn manual_push_command(remote: &str, refs: &[String]) -> String {
    format!("git push {} {}", remote, refs.join(" "))
}

/// Display manual push instruction for refs that were not pushed.
///
/// # Arguments
/// * `remote` - The remote name (e.g., "origin")
/// * `refs` - Branches and tags left unpushed
pub fn display_manual_push_instruction(remote: &str, refs: &[String]) {
    println!(
        "\n\x1b[33m→\x1b[0m To push later, run:\n  \x1b[36m{}\x1b[0m",
        manual_push_command(remote, refs)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_push_command() {
        let refs = vec!["master".to_string(), "release-24-01-01-01".to_string()];
        assert_eq!(
            manual_push_command("origin", &refs),
            "git push origin master release-24-01-01-01"
        );
    }

    #[test]
    fn test_display_functions_do_not_panic() {
        display_error("test error");
        display_success("test success");
        display_status("test status");
        display_warning(&FlowWarning::NoIssueNumber {
            branch: "x".to_string(),
        });
    }
}
