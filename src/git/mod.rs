//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the version-control
//! operations the flow commands need, allowing the real repository to be
//! swapped for a recording mock in tests.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations include:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate,
//!   with merge, rebase and pull delegated to the `git` executable
//! - [mock::MockRepository]: An in-memory implementation that records calls
//!
//! # Usage
//!
//! Flow code depends on the [Repository] trait rather than concrete
//! implementations.
//!
//! ```rust
//! # use github_flow::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> Result<(), Box<dyn std::error::Error>> {
//! let branch = repo.current_branch()?;
//! if repo.is_dirty()? {
//!     println!("{} has uncommitted changes", branch);
//! }
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod mock;
pub mod repository;

pub use command::GitCommand;
pub use mock::{GitCall, MockRepository};
pub use repository::Git2Repository;

use crate::error::Result;
use git2::Oid;

/// Version-control operations used by the flow commands
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// underlying failures (`git2::Error`, a failing `git` process) to
/// [crate::error::FlowError] variants; the flow engine propagates them
/// unchanged.
///
/// ## Implementations
///
/// - [Git2Repository](repository::Git2Repository): Real repository
/// - [MockRepository](mock::MockRepository): Recording test double
pub trait Repository {
    /// Name of the branch HEAD points at
    ///
    /// # Returns
    /// * `Ok(String)` - Short branch name (e.g., "master")
    /// * `Err` - If HEAD is detached or unreadable
    fn current_branch(&self) -> Result<String>;

    /// Whether tracked files have staged or unstaged modifications.
    ///
    /// Untracked files alone do not make the tree dirty.
    fn is_dirty(&self) -> Result<bool>;

    /// Paths of untracked files, relative to the repository root
    fn untracked_files(&self) -> Result<Vec<String>>;

    /// Get the OID of a local branch's tip
    ///
    /// # Arguments
    /// * `branch_name` - The name of the branch (e.g., "master")
    ///
    /// # Returns
    /// * `Ok(Oid)` - Object ID of the branch's tip commit
    /// * `Err` - If the branch doesn't exist
    fn branch_tip(&self, branch_name: &str) -> Result<Oid>;

    /// Tip of the remote-tracking ref `<remote>/<branch>`, if it exists
    fn remote_ref(&self, remote: &str, branch_name: &str) -> Result<Option<Oid>>;

    /// Check out a local branch
    fn checkout(&self, branch_name: &str) -> Result<()>;

    /// Create a local branch at the current HEAD, without checking it out
    fn create_branch(&self, name: &str) -> Result<()>;

    /// Delete a local branch
    fn delete_branch(&self, name: &str) -> Result<()>;

    /// Delete a branch on the remote
    fn delete_remote_branch(&self, remote: &str, name: &str) -> Result<()>;

    /// Merge a branch into the current branch
    fn merge(&self, branch_name: &str) -> Result<()>;

    /// Rebase the current branch onto another branch
    fn rebase_onto(&self, upstream: &str) -> Result<()>;

    /// Pull the current branch from a remote, rebasing local commits
    fn pull_rebase(&self, remote: &str) -> Result<()>;

    /// Push a local branch to the same-named ref on the remote
    fn push_branch(&self, remote: &str, branch_name: &str) -> Result<()>;

    /// Push a tag to the remote
    fn push_tag(&self, remote: &str, tag_name: &str) -> Result<()>;

    /// Make `<remote>/<branch>` the upstream of a local branch
    fn set_upstream(&self, branch_name: &str, remote: &str) -> Result<()>;

    /// Create an annotated tag at HEAD
    ///
    /// # Returns
    /// * `Ok(())` - Success
    /// * `Err` - If the tag already exists or Git error occurs
    fn create_tag(&self, name: &str, message: &str) -> Result<()>;

    /// Get all tag names in the repository
    fn list_tags(&self) -> Result<Vec<String>>;
}
