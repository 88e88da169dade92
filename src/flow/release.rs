//! Release flow: promote master into staging and release, publish and tag.

use chrono::NaiveDate;
use std::path::PathBuf;

use super::guard::{self, Guard};
use crate::config::Config;
use crate::domain::branch::{MASTER, RELEASE, STAGING};
use crate::domain::{next_dated_tag, read_version_file, Tag, TagStrategy};
use crate::error::Result;
use crate::git::Repository;
use crate::ui::Interaction;
use crate::warning::FlowWarning;

/// Settings the release commands read
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseSettings {
    pub remote: String,
    pub tag_strategy: TagStrategy,
    /// Already resolved against the repository root
    pub version_file: PathBuf,
    pub merge_staging_first: bool,
}

impl ReleaseSettings {
    /// Build settings from the configuration, resolving paths against `root`
    pub fn from_config(config: &Config, root: &std::path::Path) -> Self {
        ReleaseSettings {
            remote: config.remote.clone(),
            tag_strategy: config.release.tag_strategy,
            version_file: config.resolve(root, &config.release.version_file),
            merge_staging_first: config.release.merge_staging_first,
        }
    }
}

/// Something a push can send
#[derive(Debug, Clone, PartialEq, Eq)]
enum PushRef {
    Branch(String),
    Tag(String),
}

impl PushRef {
    fn name(&self) -> &str {
        match self {
            PushRef::Branch(name) | PushRef::Tag(name) => name,
        }
    }
}

/// Release-flow command sequencer
pub struct ReleaseFlow<'a, R: Repository, I: Interaction> {
    repo: &'a R,
    ui: &'a I,
    settings: ReleaseSettings,
    today: NaiveDate,
}

impl<'a, R: Repository, I: Interaction> ReleaseFlow<'a, R, I> {
    pub fn new(repo: &'a R, ui: &'a I, settings: ReleaseSettings) -> Self {
        ReleaseFlow {
            repo,
            ui,
            settings,
            today: chrono::Local::now().date_naive(),
        }
    }

    /// Use a fixed date for dated tag names
    pub fn with_date(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Merge master into staging, optionally push, optionally go back to master
    pub fn stage(&self, push: bool, master_checkout: bool) -> Result<()> {
        guard::check(self.repo, &self.settings.remote, &[Guard::Clean])?;
        tracing::info!(push, master_checkout, "stage");

        self.promote_master_into(STAGING)?;
        if push {
            self.push_confirmed(&[PushRef::Branch(STAGING.to_string())])?;
        }
        if master_checkout {
            self.repo.checkout(MASTER)?;
        }

        self.ui.success("Done.");
        Ok(())
    }

    /// Merge master into release, optionally push
    pub fn start(&self, push: bool) -> Result<()> {
        guard::check(self.repo, &self.settings.remote, &[Guard::Clean])?;
        tracing::info!(push, "release start");

        self.promote_master_into(RELEASE)?;
        if push {
            self.push_confirmed(&[PushRef::Branch(RELEASE.to_string())])?;
        }

        self.ui.success("Done.");
        Ok(())
    }

    /// Push the local release branch as is
    pub fn publish(&self) -> Result<()> {
        guard::check(self.repo, &self.settings.remote, &[Guard::Clean])?;
        tracing::info!("release publish");

        self.ui.status("Updating release...");
        self.repo.checkout(RELEASE)?;
        self.repo.push_branch(&self.settings.remote, RELEASE)?;

        self.ui.success("Done.");
        Ok(())
    }

    /// Tag the release branch and merge it back into master and staging.
    ///
    /// Must run on `release`. Pushes, when requested and confirmed, go out
    /// in the order master, tag, staging.
    pub fn finish(&self, push: bool) -> Result<Tag> {
        guard::check(
            self.repo,
            &self.settings.remote,
            &[Guard::Clean, Guard::OnBranch(RELEASE.to_string())],
        )?;

        let tag = self.next_tag()?;
        tracing::info!(tag = %tag.name, strategy = ?self.settings.tag_strategy, "release finish");

        self.repo.create_tag(&tag.name, &tag.message())?;
        self.ui.success(&format!("Created tag: {}", tag.name));

        self.ui.status("Merging...");
        self.repo.checkout(MASTER)?;
        self.repo.merge(RELEASE)?;
        if self.settings.merge_staging_first {
            self.repo.merge(STAGING)?;
        }

        self.repo.checkout(STAGING)?;
        self.repo.merge(RELEASE)?;

        if push {
            self.push_confirmed(&[
                PushRef::Branch(MASTER.to_string()),
                PushRef::Tag(tag.name.clone()),
                PushRef::Branch(STAGING.to_string()),
            ])?;
        } else {
            self.ui.manual_push(
                &self.settings.remote,
                &[MASTER.to_string(), tag.name.clone(), STAGING.to_string()],
            );
        }

        self.ui.success("Done.");
        Ok(tag)
    }

    /// Name of the tag `finish` would create
    pub fn next_tag(&self) -> Result<Tag> {
        match self.settings.tag_strategy {
            TagStrategy::FixedVersionFile => read_version_file(&self.settings.version_file),
            TagStrategy::DatedSequence => {
                let existing = self.repo.list_tags()?;
                Ok(next_dated_tag(&existing, self.today))
            }
        }
    }

    fn promote_master_into(&self, target: &str) -> Result<()> {
        let remote = &self.settings.remote;

        self.ui.status("Updating master...");
        self.repo.checkout(MASTER)?;
        self.repo.pull_rebase(remote)?;

        self.ui.status(&format!("Updating {}...", target));
        self.repo.checkout(target)?;
        self.repo.pull_rebase(remote)?;

        self.ui.status("Merging...");
        self.repo.merge(MASTER)
    }

    fn push_confirmed(&self, refs: &[PushRef]) -> Result<bool> {
        let remote = &self.settings.remote;
        let names: Vec<String> = refs.iter().map(|r| r.name().to_string()).collect();

        if !self
            .ui
            .confirm(&format!("Push {} to '{}'?", names.join(", "), remote))?
        {
            self.ui.warn(&FlowWarning::PushSkipped {
                refs: names.clone(),
                remote: remote.clone(),
            });
            self.ui.manual_push(remote, &names);
            return Ok(false);
        }

        for push_ref in refs {
            match push_ref {
                PushRef::Branch(name) => self.repo.push_branch(remote, name)?,
                PushRef::Tag(name) => self.repo.push_tag(remote, name)?,
            }
            self.ui.success(&format!("Pushed {} to '{}'", push_ref.name(), remote));
        }
        Ok(true)
    }
}
