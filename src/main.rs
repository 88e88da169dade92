use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use github_flow::config::{self, Config};
use github_flow::domain::TagStrategy;
use github_flow::flow::{FeatureFlow, FinishOutcome, ReleaseFlow, ReleaseSettings};
use github_flow::git::Git2Repository;
use github_flow::hosting::github::parse_remote_url;
use github_flow::hosting::GitHubClient;
use github_flow::ui::{self, Interaction, TerminalInteraction};
use github_flow::warning::FlowWarning;
use github_flow::FlowError;

#[derive(Parser, Debug)]
#[command(
    name = "github-flow",
    version,
    about = "Release and feature branch workflow for GitHub repositories"
)]
struct Cli {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short = 'y', long, global = true, help = "Answer yes to confirmation prompts")]
    yes: bool,

    #[arg(long, global = true, help = "Do not open new pull requests in the browser")]
    no_browser: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge master into staging
    Stage {
        /// Push staging after merging
        #[arg(long)]
        push: bool,
        /// Check out master when done
        #[arg(long, default_value_t = true, num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set)]
        master_checkout: bool,
    },

    /// Merge master into release
    ReleaseStart {
        /// Push release after merging
        #[arg(long)]
        push: bool,
    },

    /// Push the release branch
    ReleasePublish,

    /// Tag release and merge it into master and staging
    ReleaseFinish {
        /// Push master, the tag and staging
        #[arg(long)]
        push: bool,
        /// Override the configured tag naming
        #[arg(long, value_enum)]
        tag_strategy: Option<TagStrategy>,
    },

    /// Create a feature branch from master
    FeatureStart {
        /// Pull master before branching
        #[arg(long, default_value_t = true, num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set)]
        update: bool,
    },

    /// Finish the current feature branch
    FeatureFinish {
        /// Delete the branch afterwards
        #[arg(long)]
        delete_branch: bool,
        /// Merge the pull request once checks pass
        #[arg(long)]
        merge: bool,
    },

    /// Push the current feature branch and track it
    FeaturePublish {
        /// Rebase onto master before pushing
        #[arg(long, default_value_t = true, num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set)]
        rebase_first: bool,
        /// Open a pull request after pushing
        #[arg(long)]
        pull_request_create: bool,
    },

    /// Rebase the current feature branch onto master
    FeatureRebase,

    /// Open a pull request for the current feature branch
    FeaturePullRequest,
}

impl Commands {
    fn is_release(&self) -> bool {
        matches!(
            self,
            Commands::Stage { .. }
                | Commands::ReleaseStart { .. }
                | Commands::ReleasePublish
                | Commands::ReleaseFinish { .. }
        )
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("github_flow={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli) {
        ui::display_error(&format!("{:#}", e));
        if let Some(err) = e.downcast_ref::<FlowError>() {
            tracing::debug!(guard = err.is_guard_failure(), "command failed");
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = config::load_config(cli.config.as_deref()).context("Error loading config")?;
    let repo = Git2Repository::open(".").context("Not inside a git working tree")?;
    let terminal = TerminalInteraction::new(cli.yes);

    if cli.command.is_release() {
        return run_release(cli.command, &config, &repo, &terminal);
    }

    let hosting = build_hosting(&config, &repo, &terminal)?;
    let flow = FeatureFlow::new(&repo, &hosting, &terminal, config.remote.clone())
        .with_browser(config.github.open_browser && !cli.no_browser);

    match cli.command {
        Commands::FeatureStart { update } => {
            flow.start(update)?;
        }
        Commands::FeatureFinish {
            delete_branch,
            merge,
        } => {
            // A failed check is reported as a warning and is not an error.
            if let FinishOutcome::ChecksFailed { state } = flow.finish(delete_branch, merge)? {
                tracing::info!(state = %state, "finish stopped on checks");
            }
        }
        Commands::FeaturePublish {
            rebase_first,
            pull_request_create,
        } => {
            flow.publish(rebase_first, pull_request_create)?;
        }
        Commands::FeatureRebase => flow.rebase()?,
        Commands::FeaturePullRequest => {
            flow.pull_request()?;
        }
        _ => unreachable!("release commands are dispatched by run_release"),
    }

    Ok(())
}

fn run_release(
    command: Commands,
    config: &Config,
    repo: &Git2Repository,
    terminal: &TerminalInteraction,
) -> Result<()> {
    let mut settings = ReleaseSettings::from_config(config, &repo.workdir());
    if let Commands::ReleaseFinish {
        tag_strategy: Some(strategy),
        ..
    } = &command
    {
        settings.tag_strategy = *strategy;
    }
    let flow = ReleaseFlow::new(repo, terminal, settings);

    match command {
        Commands::Stage {
            push,
            master_checkout,
        } => flow.stage(push, master_checkout)?,
        Commands::ReleaseStart { push } => flow.start(push)?,
        Commands::ReleasePublish => flow.publish()?,
        Commands::ReleaseFinish { push, .. } => {
            flow.finish(push)?;
        }
        _ => unreachable!("feature commands are dispatched by run"),
    }

    Ok(())
}

/// Build the GitHub client, taking owner and repository from the
/// configuration or else from the remote URL
fn build_hosting(
    config: &Config,
    repo: &Git2Repository,
    terminal: &TerminalInteraction,
) -> Result<GitHubClient> {
    let (owner, name) = match (&config.github.owner, &config.github.repo) {
        (Some(owner), Some(name)) => (owner.clone(), name.clone()),
        _ => {
            let url = repo.remote_url(&config.remote)?;
            match url.as_deref().and_then(parse_remote_url) {
                Some((owner, name)) => (
                    config.github.owner.clone().unwrap_or(owner),
                    config.github.repo.clone().unwrap_or(name),
                ),
                None => {
                    terminal.warn(&FlowWarning::RemoteNotOnGitHub {
                        remote: config.remote.clone(),
                        url,
                    });
                    (
                        config.github.owner.clone().unwrap_or_default(),
                        config.github.repo.clone().unwrap_or_default(),
                    )
                }
            }
        }
    };
    tracing::debug!(owner = %owner, repo = %name, "github repository");

    let token_file = config.resolve(&repo.workdir(), &config.github.token_file);
    let client = GitHubClient::new(
        &config.github.api_url,
        owner,
        name,
        token_file,
        Duration::from_secs(config.github.timeout_secs),
    )?;
    Ok(client)
}
