use crate::error::{FlowError, Result};
use crate::git::GitCommand;
use git2::build::CheckoutBuilder;
use git2::{BranchType, Oid, Repository as Git2Repo, Status, StatusOptions};
use std::path::{Path, PathBuf};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    git: GitCommand,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;
        Self::from_git2(repo)
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Result<Self> {
        let workdir = repo
            .workdir()
            .ok_or_else(|| FlowError::command("Bare repositories are not supported"))?
            .to_path_buf();

        Ok(Git2Repository {
            repo,
            git: GitCommand::new(workdir),
        })
    }

    /// Root of the working tree
    pub fn workdir(&self) -> PathBuf {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.repo.path().to_path_buf())
    }

    /// URL configured for a remote, if any
    pub fn remote_url(&self, remote: &str) -> Result<Option<String>> {
        match self.repo.find_remote(remote) {
            Ok(found) => Ok(found.url().map(str::to_string)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn push_refspecs(&self, remote_name: &str, refspecs: &[String]) -> Result<()> {
        let mut remote = self.repo.find_remote(remote_name).map_err(|e| {
            FlowError::command(format!("Cannot find remote '{}': {}", remote_name, e))
        })?;

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(remote_callbacks());

        let refspec_strs: Vec<&str> = refspecs.iter().map(String::as_str).collect();
        tracing::debug!(remote = remote_name, refspecs = ?refspec_strs, "push");

        remote
            .push(&refspec_strs, Some(&mut push_options))
            .map_err(|e| {
                if e.class() == git2::ErrorClass::Net {
                    FlowError::command(format!("Network error during push: {}", e))
                } else {
                    FlowError::command(format!(
                        "Failed to push {} to '{}': {}",
                        refspec_strs.join(" "),
                        remote_name,
                        e
                    ))
                }
            })
    }
}

/// Credential and push-status callbacks for network operations.
///
/// Tries SSH keys from ~/.ssh/, then the SSH agent, then default credentials.
fn remote_callbacks<'a>() -> git2::RemoteCallbacks<'a> {
    let mut callbacks = git2::RemoteCallbacks::new();

    callbacks.credentials(|_url, username_from_url, allowed_types| {
        let username = username_from_url.unwrap_or("git");

        if allowed_types.contains(git2::CredentialType::SSH_KEY) {
            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }

            if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }
        }

        git2::Cred::default()
    });

    callbacks.push_update_reference(|refname, status| match status {
        Some(status) => Err(git2::Error::from_str(&format!(
            "Remote rejected {}: {}",
            refname, status
        ))),
        None => Ok(()),
    });

    callbacks
}

impl super::Repository for Git2Repository {
    fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(FlowError::command("HEAD is detached, check out a branch first"));
        }

        head.shorthand()
            .map(str::to_string)
            .ok_or_else(|| FlowError::command("Current branch name is not valid UTF-8"))
    }

    fn is_dirty(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(false).include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(statuses
            .iter()
            .any(|entry| entry.status() != Status::CURRENT))
    }

    fn untracked_files(&self) -> Result<Vec<String>> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(statuses
            .iter()
            .filter(|entry| entry.status().contains(Status::WT_NEW))
            .filter_map(|entry| entry.path().map(str::to_string))
            .collect())
    }

    fn branch_tip(&self, branch_name: &str) -> Result<Oid> {
        let branch = self
            .repo
            .find_branch(branch_name, BranchType::Local)
            .map_err(|e| {
                FlowError::command(format!("Cannot find branch '{}': {}", branch_name, e))
            })?;

        let commit = branch.into_reference().peel_to_commit()?;
        Ok(commit.id())
    }

    fn remote_ref(&self, remote: &str, branch_name: &str) -> Result<Option<Oid>> {
        let reference_name = format!("refs/remotes/{}/{}", remote, branch_name);

        match self.repo.find_reference(&reference_name) {
            Ok(reference) => Ok(Some(reference.peel_to_commit()?.id())),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn checkout(&self, branch_name: &str) -> Result<()> {
        let reference_name = format!("refs/heads/{}", branch_name);
        tracing::debug!(branch = branch_name, "checkout");

        let target = self.repo.revparse_single(&reference_name).map_err(|e| {
            FlowError::command(format!("Cannot find branch '{}': {}", branch_name, e))
        })?;

        self.repo
            .checkout_tree(&target, Some(CheckoutBuilder::new().safe()))?;
        self.repo.set_head(&reference_name)?;
        Ok(())
    }

    fn create_branch(&self, name: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        tracing::debug!(branch = name, at = %head.id(), "create branch");
        self.repo.branch(name, &head, false)?;
        Ok(())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        let mut branch = self.repo.find_branch(name, BranchType::Local)?;
        tracing::debug!(branch = name, "delete branch");
        branch.delete()?;
        Ok(())
    }

    fn delete_remote_branch(&self, remote: &str, name: &str) -> Result<()> {
        self.push_refspecs(remote, &[format!(":refs/heads/{}", name)])
    }

    fn merge(&self, branch_name: &str) -> Result<()> {
        self.git.run(&["merge", "--no-edit", branch_name]).map(|_| ())
    }

    fn rebase_onto(&self, upstream: &str) -> Result<()> {
        self.git.run(&["rebase", upstream]).map(|_| ())
    }

    fn pull_rebase(&self, remote: &str) -> Result<()> {
        let branch = self.current_branch()?;
        self.git
            .run(&["pull", "--rebase", remote, &branch])
            .map(|_| ())
    }

    fn push_branch(&self, remote: &str, branch_name: &str) -> Result<()> {
        self.push_refspecs(
            remote,
            &[format!("refs/heads/{0}:refs/heads/{0}", branch_name)],
        )
    }

    fn push_tag(&self, remote: &str, tag_name: &str) -> Result<()> {
        self.push_refspecs(remote, &[format!("refs/tags/{0}:refs/tags/{0}", tag_name)])
    }

    fn set_upstream(&self, branch_name: &str, remote: &str) -> Result<()> {
        let mut branch = self.repo.find_branch(branch_name, BranchType::Local)?;
        let upstream = format!("{}/{}", remote, branch_name);
        branch.set_upstream(Some(&upstream))?;
        Ok(())
    }

    fn create_tag(&self, name: &str, message: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        let signature = self.repo.signature()?;

        self.repo
            .tag(name, head.as_object(), &signature, message, false)
            .map_err(|e| FlowError::tag(format!("Cannot create tag '{}': {}", name, e)))?;

        Ok(())
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;

        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }
}
