//! Code-hosting abstraction layer
//!
//! The flow engine talks to the hosting platform only through the [Hosting]
//! trait: issue lookup, pull request lookup/creation/merge and commit status.
//!
//! - [github::GitHubClient]: GitHub REST API over blocking `reqwest`
//! - [mock::MockHosting]: In-memory implementation that records calls

pub mod github;
pub mod mock;

pub use github::GitHubClient;
pub use mock::{HostingCall, MockHosting};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// An issue on the hosting platform
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
}

/// A pull request on the hosting platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub head: String,
    pub base: String,
    pub html_url: String,
    /// `None` while the platform has not computed mergeability yet
    pub mergeable: Option<bool>,
}

/// Parameters for creating a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
}

/// State of a commit status check
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Success,
    Pending,
    Failure,
    Error,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for StatusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusState::Success => "success",
            StatusState::Pending => "pending",
            StatusState::Failure => "failure",
            StatusState::Error => "error",
            StatusState::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Most recent status reported for a commit
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitStatus {
    pub state: StatusState,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_url: Option<String>,
}

impl CommitStatus {
    pub fn is_success(&self) -> bool {
        self.state == StatusState::Success
    }
}

/// Operations the flow engine needs from the hosting platform
pub trait Hosting {
    /// Look up an issue by number
    fn get_issue(&self, number: u64) -> Result<Issue>;

    /// Open pull requests whose head is the given branch
    fn list_pull_requests(&self, head: &str) -> Result<Vec<PullRequest>>;

    /// Open a new pull request
    fn create_pull_request(&self, request: &NewPullRequest) -> Result<PullRequest>;

    /// Re-read a pull request, including its mergeable flag
    fn get_pull_request(&self, number: u64) -> Result<PullRequest>;

    /// Merge a pull request
    fn merge_pull_request(&self, number: u64) -> Result<()>;

    /// Latest status reported for a ref, `None` when no status exists
    fn latest_commit_status(&self, git_ref: &str) -> Result<Option<CommitStatus>>;
}
