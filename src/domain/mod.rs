//! Domain logic - naming rules independent of git and hosting operations

pub mod branch;
pub mod tag;

pub use branch::{feature_branch_name, slugify, BranchContext, BranchRole};
pub use tag::{next_dated_tag, read_version_file, Tag, TagStrategy};
