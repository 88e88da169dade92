use std::fmt;

/// Non-fatal conditions reported to the user while a command runs.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowWarning {
    /// Branch name does not start with an issue number
    NoIssueNumber { branch: String },
    /// A pull request for the branch is already open
    PullRequestExists { number: u64, url: String },
    /// Latest commit status is not a success, merge skipped
    ChecksFailed {
        state: String,
        description: Option<String>,
    },
    /// User declined a push
    PushSkipped { refs: Vec<String>, remote: String },
    /// Remote URL does not name a GitHub repository
    RemoteNotOnGitHub { remote: String, url: Option<String> },
}

impl fmt::Display for FlowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowWarning::NoIssueNumber { branch } => {
                write!(f, "Can't extract issue number from '{}'", branch)
            }
            FlowWarning::PullRequestExists { number, url } => {
                write!(f, "Pull request #{} already exists: {}", number, url)
            }
            FlowWarning::ChecksFailed { state, description } => match description {
                Some(text) => write!(f, "Checks didn't pass ({}): {}, won't merge", state, text),
                None => write!(f, "Checks didn't pass ({}), won't merge", state),
            },
            FlowWarning::PushSkipped { refs, remote } => {
                write!(f, "Not pushed to '{}': {}", remote, refs.join(", "))
            }
            FlowWarning::RemoteNotOnGitHub { remote, url } => match url {
                Some(url) => write!(
                    f,
                    "Remote '{}' ({}) is not a GitHub repository, set [github] owner and repo",
                    remote, url
                ),
                None => write!(
                    f,
                    "Remote '{}' not found, set [github] owner and repo",
                    remote
                ),
            },
        }
    }
}
