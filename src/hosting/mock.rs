use std::cell::RefCell;
use std::collections::HashMap;

use super::{CommitStatus, Hosting, Issue, NewPullRequest, PullRequest, StatusState};
use crate::error::{FlowError, Result};

/// A call made against [MockHosting], in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostingCall {
    GetIssue(u64),
    ListPullRequests(String),
    CreatePullRequest(NewPullRequest),
    GetPullRequest(u64),
    MergePullRequest(u64),
    LatestCommitStatus(String),
}

#[derive(Debug, Default)]
struct MockState {
    issues: HashMap<u64, Issue>,
    pulls: Vec<PullRequest>,
    statuses: HashMap<String, CommitStatus>,
    merged: Vec<u64>,
    calls: Vec<HostingCall>,
    next_number: u64,
    created_mergeable: Option<bool>,
}

/// In-memory hosting platform for tests
pub struct MockHosting {
    state: RefCell<MockState>,
}

impl MockHosting {
    /// Create an empty platform; new pull requests are mergeable
    pub fn new() -> Self {
        MockHosting {
            state: RefCell::new(MockState {
                next_number: 1,
                created_mergeable: Some(true),
                ..MockState::default()
            }),
        }
    }

    /// Register an issue
    pub fn add_issue(&self, number: u64, title: &str) {
        self.state.borrow_mut().issues.insert(
            number,
            Issue {
                number,
                title: title.to_string(),
            },
        );
    }

    /// Register an already open pull request
    pub fn add_pull_request(&self, pr: PullRequest) {
        let mut state = self.state.borrow_mut();
        state.next_number = state.next_number.max(pr.number + 1);
        state.pulls.push(pr);
    }

    /// Mergeable flag reported for pull requests created from now on
    pub fn set_created_mergeable(&self, mergeable: Option<bool>) {
        self.state.borrow_mut().created_mergeable = mergeable;
    }

    /// Report a status for a ref
    pub fn set_status(&self, git_ref: &str, state: StatusState, description: &str) {
        self.state.borrow_mut().statuses.insert(
            git_ref.to_string(),
            CommitStatus {
                state,
                description: Some(description.to_string()),
                target_url: Some(format!("https://ci.example.com/{}", git_ref)),
            },
        );
    }

    /// Recorded calls, oldest first
    pub fn calls(&self) -> Vec<HostingCall> {
        self.state.borrow().calls.clone()
    }

    /// Number of create calls made so far
    pub fn create_count(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| matches!(call, HostingCall::CreatePullRequest(_)))
            .count()
    }

    /// Pull requests merged so far
    pub fn merged(&self) -> Vec<u64> {
        self.state.borrow().merged.clone()
    }

    fn record(&self, call: HostingCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl Default for MockHosting {
    fn default() -> Self {
        Self::new()
    }
}

impl Hosting for MockHosting {
    fn get_issue(&self, number: u64) -> Result<Issue> {
        self.record(HostingCall::GetIssue(number));
        self.state
            .borrow()
            .issues
            .get(&number)
            .cloned()
            .ok_or_else(|| FlowError::hosting(format!("Issue #{} not found", number)))
    }

    fn list_pull_requests(&self, head: &str) -> Result<Vec<PullRequest>> {
        self.record(HostingCall::ListPullRequests(head.to_string()));
        Ok(self
            .state
            .borrow()
            .pulls
            .iter()
            .filter(|pr| pr.head == head)
            .cloned()
            .collect())
    }

    fn create_pull_request(&self, request: &NewPullRequest) -> Result<PullRequest> {
        self.record(HostingCall::CreatePullRequest(request.clone()));

        let mut state = self.state.borrow_mut();
        let number = state.next_number;
        state.next_number += 1;

        let pr = PullRequest {
            number,
            title: request.title.clone(),
            head: request.head.clone(),
            base: request.base.clone(),
            html_url: format!("https://github.com/acme/backend/pull/{}", number),
            mergeable: state.created_mergeable,
        };
        state.pulls.push(pr.clone());
        Ok(pr)
    }

    fn get_pull_request(&self, number: u64) -> Result<PullRequest> {
        self.record(HostingCall::GetPullRequest(number));
        self.state
            .borrow()
            .pulls
            .iter()
            .find(|pr| pr.number == number)
            .cloned()
            .ok_or_else(|| FlowError::hosting(format!("Pull request #{} not found", number)))
    }

    fn merge_pull_request(&self, number: u64) -> Result<()> {
        self.record(HostingCall::MergePullRequest(number));
        self.state.borrow_mut().merged.push(number);
        Ok(())
    }

    fn latest_commit_status(&self, git_ref: &str) -> Result<Option<CommitStatus>> {
        self.record(HostingCall::LatestCommitStatus(git_ref.to_string()));
        Ok(self.state.borrow().statuses.get(git_ref).cloned())
    }
}
