//! Precondition checks run before a command touches the repository.
//!
//! Guards are evaluated cheapest first (clean tree, then branch identity,
//! then push status) whatever order the caller lists them in, and
//! evaluation stops at the first failure. Guards only read state.

use crate::domain::BranchContext;
use crate::error::{FlowError, Result};
use crate::git::Repository;

/// A single precondition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// No modified tracked files
    Clean,
    /// Current branch has exactly this name
    OnBranch(String),
    /// Current branch is not master, staging or release
    OnFeature,
    /// Current branch exists on the remote at the same commit
    Pushed,
}

impl Guard {
    fn rank(&self) -> u8 {
        match self {
            Guard::Clean => 0,
            Guard::OnBranch(_) | Guard::OnFeature => 1,
            Guard::Pushed => 2,
        }
    }
}

/// Evaluate guards in canonical order.
///
/// # Returns
/// * `Ok(String)` - Name of the current branch
/// * `Err` - The first failing guard's error
pub fn check<R: Repository>(repo: &R, remote: &str, guards: &[Guard]) -> Result<String> {
    let mut ordered: Vec<&Guard> = guards.iter().collect();
    ordered.sort_by_key(|guard| guard.rank());

    let mut current: Option<String> = None;
    for guard in ordered {
        match guard {
            Guard::Clean => require_clean(repo)?,
            Guard::OnBranch(expected) => {
                require_branch(&branch_of(repo, &mut current)?, expected)?;
            }
            Guard::OnFeature => require_feature(&branch_of(repo, &mut current)?)?,
            Guard::Pushed => require_pushed(repo, remote, &branch_of(repo, &mut current)?)?,
        }
    }

    branch_of(repo, &mut current)
}

fn branch_of<R: Repository>(repo: &R, cached: &mut Option<String>) -> Result<String> {
    if let Some(name) = cached {
        return Ok(name.clone());
    }
    let name = repo.current_branch()?;
    *cached = Some(name.clone());
    Ok(name)
}

/// Fail with `DirtyWorkingTree` if tracked files are modified
pub fn require_clean<R: Repository>(repo: &R) -> Result<()> {
    if repo.is_dirty()? {
        return Err(FlowError::DirtyWorkingTree {
            untracked: repo.untracked_files()?,
        });
    }
    Ok(())
}

/// Fail with `WrongBranch` unless `current` is exactly `expected`
pub fn require_branch(current: &str, expected: &str) -> Result<()> {
    if current != expected {
        return Err(FlowError::WrongBranch {
            expected: expected.to_string(),
            actual: current.to_string(),
        });
    }
    Ok(())
}

/// Fail with `WrongBranch` if `current` is master, staging or release
pub fn require_feature(current: &str) -> Result<()> {
    if !BranchContext::new(current).is_feature() {
        return Err(FlowError::WrongBranch {
            expected: "a feature".to_string(),
            actual: current.to_string(),
        });
    }
    Ok(())
}

/// Fail with `NotPushed` if the remote ref is missing or behind/ahead
pub fn require_pushed<R: Repository>(repo: &R, remote: &str, branch: &str) -> Result<()> {
    let local = repo.branch_tip(branch)?;
    match repo.remote_ref(remote, branch)? {
        Some(remote_tip) if remote_tip == local => Ok(()),
        _ => Err(FlowError::NotPushed {
            branch: branch.to_string(),
            remote: remote.to_string(),
        }),
    }
}
