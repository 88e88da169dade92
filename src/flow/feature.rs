//! Feature flow: start → (rebase) → publish → (pull request) → finish.

use super::guard::{self, Guard};
use crate::domain::branch::MASTER;
use crate::domain::{feature_branch_name, slugify, BranchContext};
use crate::error::{FlowError, Result};
use crate::git::Repository;
use crate::hosting::{Hosting, NewPullRequest, PullRequest};
use crate::ui::Interaction;
use crate::warning::FlowWarning;

/// How `finish` ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishOutcome {
    /// Branch finished; `merged` holds the merged pull request, if any
    Finished { merged: Option<u64> },
    /// Latest commit status was not a success; nothing was merged or deleted
    ChecksFailed { state: String },
}

/// Feature-flow command sequencer
pub struct FeatureFlow<'a, R: Repository, H: Hosting, I: Interaction> {
    repo: &'a R,
    hosting: &'a H,
    ui: &'a I,
    remote: String,
    open_browser: bool,
}

impl<'a, R: Repository, H: Hosting, I: Interaction> FeatureFlow<'a, R, H, I> {
    pub fn new(repo: &'a R, hosting: &'a H, ui: &'a I, remote: impl Into<String>) -> Self {
        FeatureFlow {
            repo,
            hosting,
            ui,
            remote: remote.into(),
            open_browser: true,
        }
    }

    /// Whether a newly created pull request is opened in the browser
    pub fn with_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }

    /// Create a feature branch off master, named after an issue and/or a
    /// human-readable name.
    ///
    /// # Returns
    /// * `Ok(String)` - Name of the new, checked out branch
    /// * `Err(EmptyName)` - If nothing usable remains after slugifying
    pub fn start(&self, update: bool) -> Result<String> {
        guard::check(self.repo, &self.remote, &[Guard::Clean])?;

        let issue_input = self.ui.input("GitHub issue number (optional)")?;
        let issue = if issue_input.is_empty() {
            None
        } else {
            Some(
                issue_input
                    .parse::<u64>()
                    .map_err(|_| FlowError::InvalidIssueNumber(issue_input.clone()))?,
            )
        };

        let issue_title = match issue {
            Some(number) => {
                self.ui.status("Connecting to GitHub...");
                let found = self.hosting.get_issue(number)?;
                self.ui.status(&format!("Issue found: {}", found.title));
                found.title
            }
            None => String::new(),
        };

        let name_input = self
            .ui
            .input("Human readable branch name [default - built from issue name]")?;
        let source = if name_input.is_empty() {
            issue_title
        } else {
            name_input
        };

        let slug = slugify(&source);
        if slug.is_empty() {
            return Err(FlowError::EmptyName);
        }
        let branch_name = feature_branch_name(issue, &slug);
        tracing::info!(branch = %branch_name, update, "feature start");

        self.repo.checkout(MASTER)?;
        if update {
            self.repo.pull_rebase(&self.remote)?;
        }
        self.repo.create_branch(&branch_name)?;
        self.repo.checkout(&branch_name)?;

        self.ui.success(&format!(
            "New branch based on master created and checked out: {}",
            branch_name
        ));
        Ok(branch_name)
    }

    /// Rebase the current feature branch onto an updated master
    pub fn rebase(&self) -> Result<()> {
        let branch = guard::check(self.repo, &self.remote, &[Guard::Clean, Guard::OnFeature])?;
        tracing::info!(branch = %branch, "feature rebase");

        self.ui.status("Updating master...");
        self.repo.checkout(MASTER)?;
        self.repo.pull_rebase(&self.remote)?;

        self.ui.status("Rebasing current branch...");
        self.repo.checkout(&branch)?;
        self.repo.rebase_onto(MASTER)?;

        self.ui.success("Done.");
        Ok(())
    }

    /// Push the current feature branch and track it, optionally opening a
    /// pull request
    pub fn publish(
        &self,
        rebase_first: bool,
        pull_request_create: bool,
    ) -> Result<Option<PullRequest>> {
        if rebase_first {
            self.rebase()?;
        }

        let branch = guard::check(self.repo, &self.remote, &[Guard::Clean, Guard::OnFeature])?;
        tracing::info!(branch = %branch, "feature publish");

        self.ui.status("Pushing to GitHub...");
        self.repo.push_branch(&self.remote, &branch)?;

        self.ui.status("Setting tracking...");
        self.repo.set_upstream(&branch, &self.remote)?;

        let pr = if pull_request_create {
            Some(self.pull_request()?)
        } else {
            None
        };

        self.ui.success("Done.");
        Ok(pr)
    }

    /// Open a pull request for the current branch against master.
    ///
    /// An open pull request with the same head is returned as is; no second
    /// one is created. A new pull request is opened in the browser unless
    /// disabled with [FeatureFlow::with_browser].
    pub fn pull_request(&self) -> Result<PullRequest> {
        let branch = guard::check(
            self.repo,
            &self.remote,
            &[Guard::Clean, Guard::OnFeature, Guard::Pushed],
        )?;
        let context = BranchContext::new(&branch);

        self.ui.status("Creating pull request...");
        let issue = context.issue_number();
        if issue.is_none() {
            self.ui.warn(&FlowWarning::NoIssueNumber {
                branch: branch.clone(),
            });
        }

        self.ui.status("Connecting to GitHub...");
        let existing = self.hosting.list_pull_requests(&branch)?;
        if let Some(pr) = existing.into_iter().next() {
            self.ui.warn(&FlowWarning::PullRequestExists {
                number: pr.number,
                url: pr.html_url.clone(),
            });
            return Ok(pr);
        }

        let mut body = self.ui.input("Pull request description")?;
        if let Some(number) = issue {
            body.push_str(&format!(" #{}", number));
        }

        let request = NewPullRequest {
            title: context.pull_request_title(),
            body,
            head: branch,
            base: MASTER.to_string(),
        };
        tracing::info!(head = %request.head, title = %request.title, "create pull request");

        let pr = self.hosting.create_pull_request(&request)?;
        self.ui
            .success(&format!("Successfully created PR: {}", pr.html_url));
        if self.open_browser {
            self.ui.open_url(&pr.html_url);
        }
        Ok(pr)
    }

    /// Finish the current feature branch.
    ///
    /// With `merge`, the pull request is merged once it is mergeable and the
    /// latest commit status (if any) is a success; a failing status stops the
    /// command before anything is merged or deleted. Afterwards master is
    /// checked out and updated, and with `delete_branch` the feature branch
    /// is removed locally (and remotely when it was merged here).
    pub fn finish(&self, delete_branch: bool, merge: bool) -> Result<FinishOutcome> {
        let branch = guard::check(
            self.repo,
            &self.remote,
            &[Guard::Clean, Guard::OnFeature, Guard::Pushed],
        )?;
        tracing::info!(branch = %branch, delete_branch, merge, "feature finish");

        let mut merged = None;
        if merge {
            let pr = self.pull_request()?;
            let pr = self.hosting.get_pull_request(pr.number)?;
            if pr.mergeable != Some(true) {
                return Err(FlowError::NotMergeable { number: pr.number });
            }

            self.ui.status("Getting checks statuses...");
            let tip = self.repo.branch_tip(&branch)?.to_string();
            if let Some(status) = self.hosting.latest_commit_status(&tip)? {
                self.ui.status(&format!(
                    "{}. See for more {}",
                    status.description.as_deref().unwrap_or("No description"),
                    status.target_url.as_deref().unwrap_or("-")
                ));

                if !status.is_success() {
                    let state = status.state.to_string();
                    self.ui.warn(&FlowWarning::ChecksFailed {
                        state: state.clone(),
                        description: status.description.clone(),
                    });
                    return Ok(FinishOutcome::ChecksFailed { state });
                }
            }

            self.ui.status("Checks passed, merging...");
            self.hosting.merge_pull_request(pr.number)?;
            self.ui.success("Merged");
            merged = Some(pr.number);

            if delete_branch {
                self.repo.delete_remote_branch(&self.remote, &branch)?;
                self.ui.success("Remote branch removed");
            }
        }

        self.repo.checkout(MASTER)?;
        self.repo.pull_rebase(&self.remote)?;
        if delete_branch {
            self.repo.delete_branch(&branch)?;
            self.ui.success("Local branch removed");
        }

        self.ui.success("Done");
        Ok(FinishOutcome::Finished { merged })
    }
}
