use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

pub const MASTER: &str = "master";
pub const STAGING: &str = "staging";
pub const RELEASE: &str = "release";

/// Role a branch plays in the flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchRole {
    Master,
    Staging,
    Release,
    Feature,
}

impl BranchRole {
    /// Derive the role from a branch name. Matching is exact and case-sensitive.
    pub fn of(name: &str) -> Self {
        match name {
            MASTER => BranchRole::Master,
            STAGING => BranchRole::Staging,
            RELEASE => BranchRole::Release,
            _ => BranchRole::Feature,
        }
    }

    pub fn is_feature(&self) -> bool {
        matches!(self, BranchRole::Feature)
    }
}

impl fmt::Display for BranchRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BranchRole::Master => MASTER,
            BranchRole::Staging => STAGING,
            BranchRole::Release => RELEASE,
            BranchRole::Feature => "feature",
        };
        f.write_str(name)
    }
}

/// Represents a git branch with its flow role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchContext {
    pub name: String,
    pub role: BranchRole,
}

impl BranchContext {
    /// Create a new branch context
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let role = BranchRole::of(&name);

        BranchContext { name, role }
    }

    pub fn is_feature(&self) -> bool {
        self.role.is_feature()
    }

    /// Issue number encoded as the leading segment of the branch name.
    ///
    /// The name is split on the first hyphen and the head parsed as an integer;
    /// anything unparsable, and zero, yields `None`.
    pub fn issue_number(&self) -> Option<u64> {
        let head = self.name.split('-').next()?;
        head.parse::<u64>().ok().filter(|number| *number != 0)
    }

    /// Pull request title derived from the branch name.
    ///
    /// Hyphens become spaces, the first character is upper-cased and the rest
    /// lower-cased: `"fix-Login"` -> `"Fix login"`.
    pub fn pull_request_title(&self) -> String {
        let spaced = self.name.replace('-', " ");
        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        }
    }
}

/// Build a feature branch name from an optional issue number and a slug
pub fn feature_branch_name(issue: Option<u64>, slug: &str) -> String {
    match issue {
        Some(number) => format!("{}-{}", number, slug),
        None => slug.to_string(),
    }
}

fn non_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s-]").expect("valid regex"))
}

fn separators() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[-\s]+").expect("valid regex"))
}

/// Turn free text into a branch-safe slug.
///
/// The text is NFKD-normalised so accented letters keep their base letter,
/// then remaining non-ASCII characters and punctuation are dropped, the text
/// is lower-cased and runs of whitespace or hyphens collapse to a single hyphen.
pub fn slugify(text: &str) -> String {
    let ascii: String = text.nfkd().filter(char::is_ascii).collect();
    let cleaned = non_word().replace_all(&ascii, "").to_lowercase();
    let slug = separators().replace_all(cleaned.trim(), "-");
    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}
