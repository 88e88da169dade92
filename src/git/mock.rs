use crate::error::{FlowError, Result};
use crate::git::Repository;
use git2::Oid;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

/// A call made against [MockRepository], in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    Checkout(String),
    CreateBranch(String),
    DeleteBranch(String),
    DeleteRemoteBranch { remote: String, branch: String },
    Merge(String),
    RebaseOnto(String),
    PullRebase { remote: String, branch: String },
    PushBranch { remote: String, branch: String },
    PushTag { remote: String, tag: String },
    SetUpstream { branch: String, remote: String },
    CreateTag { name: String, message: String },
}

#[derive(Debug, Default)]
struct MockState {
    head: String,
    dirty: bool,
    untracked: Vec<String>,
    branches: BTreeMap<String, Oid>,
    remote_refs: BTreeMap<(String, String), Oid>,
    tags: BTreeSet<String>,
    calls: Vec<GitCall>,
    failing: Option<String>,
}

/// Mock repository for testing without actual git operations.
///
/// Every mutating call is appended to a call log; read-only queries are not
/// logged. Pushing a branch updates the matching remote ref so a later
/// pushed-check sees it.
pub struct MockRepository {
    state: RefCell<MockState>,
}

fn oid(byte: u8) -> Oid {
    Oid::from_bytes(&[byte; 20]).unwrap_or_else(|_| Oid::zero())
}

impl MockRepository {
    /// Create a repository with a single `master` branch checked out
    pub fn new() -> Self {
        let mut state = MockState {
            head: "master".to_string(),
            ..MockState::default()
        };
        state.branches.insert("master".to_string(), oid(1));

        MockRepository {
            state: RefCell::new(state),
        }
    }

    /// Create a repository with `master`, `staging` and `release` branches
    pub fn with_flow_branches() -> Self {
        let repo = Self::new();
        repo.add_branch("staging", oid(2));
        repo.add_branch("release", oid(3));
        repo
    }

    /// Add a local branch pointing at an OID
    pub fn add_branch(&self, name: impl Into<String>, tip: Oid) {
        self.state.borrow_mut().branches.insert(name.into(), tip);
    }

    /// Check out a branch without logging a call, creating it if missing
    pub fn set_head(&self, name: impl Into<String>) {
        let name = name.into();
        let mut state = self.state.borrow_mut();
        let next = oid(10 + state.branches.len() as u8);
        state.branches.entry(name.clone()).or_insert(next);
        state.head = name;
    }

    /// Mark the working tree dirty, with the given untracked files
    pub fn set_dirty(&self, untracked: &[&str]) {
        let mut state = self.state.borrow_mut();
        state.dirty = true;
        state.untracked = untracked.iter().map(|s| s.to_string()).collect();
    }

    /// Set the remote-tracking ref `<remote>/<branch>`
    pub fn set_remote_ref(&self, remote: &str, branch: &str, tip: Oid) {
        self.state
            .borrow_mut()
            .remote_refs
            .insert((remote.to_string(), branch.to_string()), tip);
    }

    /// Make the remote ref match the local branch tip
    pub fn mark_pushed(&self, remote: &str, branch: &str) {
        let tip = self.state.borrow().branches.get(branch).copied();
        if let Some(tip) = tip {
            self.set_remote_ref(remote, branch, tip);
        }
    }

    /// Add an existing tag
    pub fn add_tag(&self, name: impl Into<String>) {
        self.state.borrow_mut().tags.insert(name.into());
    }

    /// Make every call of the given kind fail, e.g. `"push_tag"`
    pub fn fail_on(&self, operation: &str) {
        self.state.borrow_mut().failing = Some(operation.to_string());
    }

    /// Recorded mutating calls, oldest first
    pub fn calls(&self) -> Vec<GitCall> {
        self.state.borrow().calls.clone()
    }

    /// Branch currently checked out
    pub fn head(&self) -> String {
        self.state.borrow().head.clone()
    }

    /// Whether a local branch exists
    pub fn has_branch(&self, name: &str) -> bool {
        self.state.borrow().branches.contains_key(name)
    }

    /// Whether a tag exists
    pub fn has_tag(&self, name: &str) -> bool {
        self.state.borrow().tags.contains(name)
    }

    fn record(&self, operation: &str, call: GitCall) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.failing.as_deref() == Some(operation) {
            return Err(FlowError::command(format!("{} failed (mock)", operation)));
        }
        state.calls.push(call);
        Ok(())
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn current_branch(&self) -> Result<String> {
        Ok(self.head())
    }

    fn is_dirty(&self) -> Result<bool> {
        Ok(self.state.borrow().dirty)
    }

    fn untracked_files(&self) -> Result<Vec<String>> {
        Ok(self.state.borrow().untracked.clone())
    }

    fn branch_tip(&self, branch_name: &str) -> Result<Oid> {
        self.state
            .borrow()
            .branches
            .get(branch_name)
            .copied()
            .ok_or_else(|| FlowError::command(format!("Branch not found: {}", branch_name)))
    }

    fn remote_ref(&self, remote: &str, branch_name: &str) -> Result<Option<Oid>> {
        Ok(self
            .state
            .borrow()
            .remote_refs
            .get(&(remote.to_string(), branch_name.to_string()))
            .copied())
    }

    fn checkout(&self, branch_name: &str) -> Result<()> {
        if !self.has_branch(branch_name) {
            return Err(FlowError::command(format!(
                "Branch not found: {}",
                branch_name
            )));
        }
        self.record("checkout", GitCall::Checkout(branch_name.to_string()))?;
        self.state.borrow_mut().head = branch_name.to_string();
        Ok(())
    }

    fn create_branch(&self, name: &str) -> Result<()> {
        if self.has_branch(name) {
            return Err(FlowError::command(format!("Branch already exists: {}", name)));
        }
        self.record("create_branch", GitCall::CreateBranch(name.to_string()))?;
        let tip = self.branch_tip(&self.head())?;
        self.add_branch(name, tip);
        Ok(())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        if self.head() == name {
            return Err(FlowError::command(format!(
                "Cannot delete checked out branch: {}",
                name
            )));
        }
        self.record("delete_branch", GitCall::DeleteBranch(name.to_string()))?;
        self.state.borrow_mut().branches.remove(name);
        Ok(())
    }

    fn delete_remote_branch(&self, remote: &str, name: &str) -> Result<()> {
        self.record(
            "delete_remote_branch",
            GitCall::DeleteRemoteBranch {
                remote: remote.to_string(),
                branch: name.to_string(),
            },
        )?;
        self.state
            .borrow_mut()
            .remote_refs
            .remove(&(remote.to_string(), name.to_string()));
        Ok(())
    }

    fn merge(&self, branch_name: &str) -> Result<()> {
        self.record("merge", GitCall::Merge(branch_name.to_string()))
    }

    fn rebase_onto(&self, upstream: &str) -> Result<()> {
        self.record("rebase_onto", GitCall::RebaseOnto(upstream.to_string()))
    }

    fn pull_rebase(&self, remote: &str) -> Result<()> {
        let branch = self.head();
        self.record(
            "pull_rebase",
            GitCall::PullRebase {
                remote: remote.to_string(),
                branch,
            },
        )
    }

    fn push_branch(&self, remote: &str, branch_name: &str) -> Result<()> {
        self.record(
            "push_branch",
            GitCall::PushBranch {
                remote: remote.to_string(),
                branch: branch_name.to_string(),
            },
        )?;
        self.mark_pushed(remote, branch_name);
        Ok(())
    }

    fn push_tag(&self, remote: &str, tag_name: &str) -> Result<()> {
        self.record(
            "push_tag",
            GitCall::PushTag {
                remote: remote.to_string(),
                tag: tag_name.to_string(),
            },
        )
    }

    fn set_upstream(&self, branch_name: &str, remote: &str) -> Result<()> {
        self.record(
            "set_upstream",
            GitCall::SetUpstream {
                branch: branch_name.to_string(),
                remote: remote.to_string(),
            },
        )
    }

    fn create_tag(&self, name: &str, message: &str) -> Result<()> {
        if self.has_tag(name) {
            return Err(FlowError::tag(format!("Tag already exists: {}", name)));
        }
        self.record(
            "create_tag",
            GitCall::CreateTag {
                name: name.to_string(),
                message: message.to_string(),
            },
        )?;
        self.add_tag(name);
        Ok(())
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        Ok(self.state.borrow().tags.iter().cloned().collect())
    }
}
