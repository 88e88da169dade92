use thiserror::Error;

/// Unified error type for github-flow operations
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("{}", dirty_message(.untracked))]
    DirtyWorkingTree { untracked: Vec<String> },

    #[error("Not on {expected} branch (current branch: {actual})")]
    WrongBranch { expected: String, actual: String },

    #[error("Branch '{branch}' is not pushed to '{remote}' or differs from the remote")]
    NotPushed { branch: String, remote: String },

    #[error("Feature name was empty")]
    EmptyName,

    #[error("Pull request #{number} is not mergeable")]
    NotMergeable { number: u64 },

    #[error("Invalid issue number: '{0}'")]
    InvalidIssueNumber(String),

    #[error(
        "GitHub token not found at {path}. Create one at https://github.com/settings/tokens \
         and save it to that file"
    )]
    MissingToken { path: String },

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Git command failed: {0}")]
    Command(String),

    #[error("Hosting error: {0}")]
    Hosting(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn dirty_message(untracked: &[String]) -> String {
    if untracked.is_empty() {
        "Won't proceed, working tree is not clean".to_string()
    } else {
        format!(
            "Won't proceed, working tree is not clean (untracked: {})",
            untracked.join(", ")
        )
    }
}

/// Convenience type alias for Results in github-flow
pub type Result<T> = std::result::Result<T, FlowError>;

impl FlowError {
    /// Create a git command error with context
    pub fn command(msg: impl Into<String>) -> Self {
        FlowError::Command(msg.into())
    }

    /// Create a hosting error with context
    pub fn hosting(msg: impl Into<String>) -> Self {
        FlowError::Hosting(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        FlowError::Config(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        FlowError::Tag(msg.into())
    }

    /// Whether this error comes from a precondition check rather than a
    /// collaborator call. Guard failures never leave partial state behind.
    pub fn is_guard_failure(&self) -> bool {
        matches!(
            self,
            FlowError::DirtyWorkingTree { .. }
                | FlowError::WrongBranch { .. }
                | FlowError::NotPushed { .. }
                | FlowError::EmptyName
                | FlowError::InvalidIssueNumber(_)
        )
    }
}
