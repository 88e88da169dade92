use regex::Regex;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::cell::OnceCell;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use super::{CommitStatus, Hosting, Issue, NewPullRequest, PullRequest};
use crate::error::{FlowError, Result};

#[derive(Debug, Deserialize)]
struct GitHubRef {
    #[serde(rename = "ref")]
    ref_name: String,
}

#[derive(Debug, Deserialize)]
struct GitHubPullRequest {
    number: u64,
    title: String,
    html_url: String,
    head: GitHubRef,
    base: GitHubRef,
    #[serde(default)]
    mergeable: Option<bool>,
}

impl From<GitHubPullRequest> for PullRequest {
    fn from(pr: GitHubPullRequest) -> Self {
        PullRequest {
            number: pr.number,
            title: pr.title,
            head: pr.head.ref_name,
            base: pr.base.ref_name,
            html_url: pr.html_url,
            mergeable: pr.mergeable,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MergeResult {
    merged: bool,
    #[serde(default)]
    message: String,
}

/// Extract `(owner, repo)` from a GitHub remote URL.
///
/// Understands `git@github.com:owner/repo.git`, `ssh://git@github.com/owner/repo`
/// and `https://github.com/owner/repo(.git)`.
pub fn parse_remote_url(url: &str) -> Option<(String, String)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"github\.com[:/]([^/]+)/([^/]+?)(?:\.git)?/?$").expect("valid regex")
    });

    let caps = re.captures(url.trim())?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// GitHub REST API client.
///
/// The token is read from `token_file` on the first request, so commands
/// that never reach GitHub work without one.
pub struct GitHubClient {
    http: Client,
    api_url: String,
    owner: String,
    repo: String,
    token_file: PathBuf,
    token: OnceCell<String>,
}

impl GitHubClient {
    /// Create a client for `owner/repo`
    pub fn new(
        api_url: &str,
        owner: impl Into<String>,
        repo: impl Into<String>,
        token_file: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("github-flow/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(GitHubClient {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            owner: owner.into(),
            repo: repo.into(),
            token_file: token_file.into(),
            token: OnceCell::new(),
        })
    }

    /// Use an already loaded token instead of reading the token file
    pub fn with_token(self, token: impl Into<String>) -> Self {
        let _ = self.token.set(token.into());
        self
    }

    fn token(&self) -> Result<&str> {
        if let Some(token) = self.token.get() {
            return Ok(token.as_str());
        }

        tracing::info!(path = %self.token_file.display(), "Connecting to GitHub");
        let token = fs::read_to_string(&self.token_file)
            .map(|s| s.trim().to_string())
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| FlowError::MissingToken {
                path: self.token_file.display().to_string(),
            })?;

        Ok(self.token.get_or_init(|| token).as_str())
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_url, self.owner, self.repo, path
        )
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .bearer_auth(self.token()?)
            .header("Accept", "application/vnd.github+json")
            .send()?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => FlowError::hosting(format!("Not found: {}", url)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FlowError::hosting(format!(
                "Access denied ({}). Check your token permissions: {}",
                status, body
            )),
            _ => FlowError::hosting(format!("GitHub API error ({}): {}", status, body)),
        })
    }

    fn get<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        tracing::debug!(url = %url, "GET");
        let response = self.send(self.http.get(url).query(query))?;
        Ok(response.json()?)
    }
}

impl Hosting for GitHubClient {
    fn get_issue(&self, number: u64) -> Result<Issue> {
        self.get(&self.repo_url(&format!("issues/{}", number)), &[])
    }

    fn list_pull_requests(&self, head: &str) -> Result<Vec<PullRequest>> {
        let qualified = format!("{}:{}", self.owner, head);
        let pulls: Vec<GitHubPullRequest> = self.get(
            &self.repo_url("pulls"),
            &[("head", qualified.as_str()), ("state", "open")],
        )?;

        Ok(pulls.into_iter().map(PullRequest::from).collect())
    }

    fn create_pull_request(&self, request: &NewPullRequest) -> Result<PullRequest> {
        let url = self.repo_url("pulls");
        tracing::debug!(url = %url, head = %request.head, base = %request.base, "POST");

        let response = self.send(self.http.post(&url).json(request))?;
        let pr: GitHubPullRequest = response.json()?;
        Ok(pr.into())
    }

    fn get_pull_request(&self, number: u64) -> Result<PullRequest> {
        let pr: GitHubPullRequest = self.get(&self.repo_url(&format!("pulls/{}", number)), &[])?;
        Ok(pr.into())
    }

    fn merge_pull_request(&self, number: u64) -> Result<()> {
        let url = self.repo_url(&format!("pulls/{}/merge", number));
        tracing::debug!(url = %url, "PUT");

        let response = self.send(self.http.put(&url))?;
        let result: MergeResult = response.json()?;
        if !result.merged {
            return Err(FlowError::hosting(format!(
                "Pull request #{} was not merged: {}",
                number, result.message
            )));
        }
        Ok(())
    }

    fn latest_commit_status(&self, git_ref: &str) -> Result<Option<CommitStatus>> {
        // GitHub lists statuses newest first
        let statuses: Vec<CommitStatus> = self.get(
            &self.repo_url(&format!("commits/{}/statuses", git_ref)),
            &[("per_page", "1")],
        )?;
        Ok(statuses.into_iter().next())
    }
}
