use crate::error::{FlowError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs the `git` executable for porcelain operations git2 does not offer
/// (merge with conflict handling, rebase, pull --rebase).
#[derive(Debug, Clone)]
pub struct GitCommand {
    program: PathBuf,
    workdir: PathBuf,
}

impl GitCommand {
    /// Create an executor running `git` inside `workdir`
    pub fn new(workdir: impl AsRef<Path>) -> Self {
        GitCommand {
            program: PathBuf::from("git"),
            workdir: workdir.as_ref().to_path_buf(),
        }
    }

    /// Use a different git executable
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Execute git with the given arguments
    ///
    /// # Returns
    /// * `Ok(String)` - Trimmed stdout if git exits with code 0
    /// * `Err` - If git cannot be spawned or returns a non-zero exit code
    pub fn run(&self, args: &[&str]) -> Result<String> {
        tracing::debug!(workdir = %self.workdir.display(), "git {}", args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| {
                FlowError::command(format!(
                    "Failed to execute {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(FlowError::command(format!(
                "git {} failed with exit code {}\nStdout: {}\nStderr: {}",
                args.join(" "),
                output.status.code().unwrap_or(-1),
                stdout.trim(),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
