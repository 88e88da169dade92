use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{FlowError, Result};

/// How `release-finish` names the tag it creates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TagStrategy {
    /// Read the tag name from the version file
    FixedVersionFile,
    /// `release-<YY-MM-DD>-<NN>`, numbered among same-day tags
    #[default]
    DatedSequence,
}

/// Represents a git tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
}

impl Tag {
    /// Create a new tag from a string
    pub fn new(name: impl Into<String>) -> Self {
        Tag { name: name.into() }
    }

    /// Message attached to annotated release tags
    pub fn message(&self) -> String {
        format!("Automatic tag \"{}\"", self.name)
    }
}

/// Date fragment used in dated tag names, e.g. `24-01-01`
pub fn date_stamp(date: NaiveDate) -> String {
    date.format("%y-%m-%d").to_string()
}

/// Compute the next dated release tag.
///
/// The sequence number is one more than the count of existing tags containing
/// the date stamp, so the first release of a day is `-01`.
pub fn next_dated_tag(existing: &[String], date: NaiveDate) -> Tag {
    let stamp = date_stamp(date);
    let same_day = existing.iter().filter(|tag| tag.contains(&stamp)).count();
    Tag::new(format!("release-{}-{:02}", stamp, same_day + 1))
}

/// Read the tag name from a version file, trimming surrounding whitespace
pub fn read_version_file(path: &Path) -> Result<Tag> {
    let content = fs::read_to_string(path).map_err(|e| {
        FlowError::tag(format!(
            "Cannot read version file {}: {}",
            path.display(),
            e
        ))
    })?;

    let name = content.trim();
    if name.is_empty() {
        return Err(FlowError::tag(format!(
            "Version file {} is empty",
            path.display()
        )));
    }

    Ok(Tag::new(name))
}
