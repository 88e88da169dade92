// tests/feature_flow_test.rs
use github_flow::flow::{FeatureFlow, FinishOutcome};
use github_flow::git::{GitCall, MockRepository, Repository};
use github_flow::hosting::{HostingCall, MockHosting, NewPullRequest, PullRequest, StatusState};
use github_flow::ui::ScriptedInteraction;
use github_flow::warning::FlowWarning;
use github_flow::FlowError;

const FEATURE: &str = "10-add-cache";

/// Repository on a pushed, clean feature branch
fn on_pushed_feature(name: &str) -> MockRepository {
    let repo = MockRepository::new();
    repo.set_head(name);
    repo.mark_pushed("origin", name);
    repo
}

fn checkout(name: &str) -> GitCall {
    GitCall::Checkout(name.to_string())
}

fn pull(branch: &str) -> GitCall {
    GitCall::PullRebase {
        remote: "origin".to_string(),
        branch: branch.to_string(),
    }
}

#[test]
fn test_start_from_issue_title() {
    let repo = MockRepository::new();
    let hosting = MockHosting::new();
    hosting.add_issue(10, "Add Cache!");
    let ui = ScriptedInteraction::new().with_answers(&["10", ""]);
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    let branch = flow.start(true).unwrap();

    assert_eq!(branch, FEATURE);
    assert_eq!(
        repo.calls(),
        vec![
            checkout("master"),
            pull("master"),
            GitCall::CreateBranch(FEATURE.to_string()),
            checkout(FEATURE),
        ]
    );
    assert_eq!(repo.head(), FEATURE);
    assert_eq!(hosting.calls(), vec![HostingCall::GetIssue(10)]);
    assert!(ui.messages().contains(&"Issue found: Add Cache!".to_string()));
}

#[test]
fn test_start_name_overrides_issue_title() {
    let repo = MockRepository::new();
    let hosting = MockHosting::new();
    hosting.add_issue(10, "Add Cache!");
    let ui = ScriptedInteraction::new().with_answers(&["10", "LRU cache for sessions"]);
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    assert_eq!(flow.start(true).unwrap(), "10-lru-cache-for-sessions");
}

#[test]
fn test_start_without_issue_skips_hosting() {
    let repo = MockRepository::new();
    let hosting = MockHosting::new();
    let ui = ScriptedInteraction::new().with_answers(&["", "Fix Login"]);
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    assert_eq!(flow.start(false).unwrap(), "fix-login");
    assert!(hosting.calls().is_empty());
    assert!(!repo.calls().contains(&pull("master")));
}

#[test]
fn test_start_empty_name_fails_before_branching() {
    let repo = MockRepository::new();
    let hosting = MockHosting::new();
    let ui = ScriptedInteraction::new().with_answers(&["", "!!! ???"]);
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    assert!(matches!(flow.start(true), Err(FlowError::EmptyName)));
    assert!(repo.calls().is_empty());
}

#[test]
fn test_start_invalid_issue_number() {
    let repo = MockRepository::new();
    let hosting = MockHosting::new();
    let ui = ScriptedInteraction::new().with_answers(&["ten"]);
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    match flow.start(true) {
        Err(FlowError::InvalidIssueNumber(input)) => assert_eq!(input, "ten"),
        other => panic!("expected InvalidIssueNumber, got {:?}", other),
    }
    assert!(repo.calls().is_empty());
}

#[test]
fn test_start_unknown_issue_propagates_hosting_error() {
    let repo = MockRepository::new();
    let hosting = MockHosting::new();
    let ui = ScriptedInteraction::new().with_answers(&["99", ""]);
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    assert!(matches!(flow.start(true), Err(FlowError::Hosting(_))));
    assert!(repo.calls().is_empty());
}

#[test]
fn test_dirty_tree_blocks_every_feature_command() {
    let repo = on_pushed_feature(FEATURE);
    repo.set_dirty(&["scratch.txt"]);
    let hosting = MockHosting::new();
    let ui = ScriptedInteraction::new()
        .with_answers(&["10", "name", "body"])
        .with_confirmations(&[true]);
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    let results = vec![
        flow.start(true).map(|_| ()),
        flow.rebase(),
        flow.publish(true, true).map(|_| ()),
        flow.pull_request().map(|_| ()),
        flow.finish(true, true).map(|_| ()),
    ];

    for result in results {
        match result {
            Err(FlowError::DirtyWorkingTree { untracked }) => {
                assert_eq!(untracked, vec!["scratch.txt".to_string()]);
            }
            other => panic!("expected DirtyWorkingTree, got {:?}", other),
        }
    }
    assert!(repo.calls().is_empty());
    assert!(hosting.calls().is_empty());
    assert!(ui.prompts().is_empty());
}

#[test]
fn test_feature_commands_refuse_fixed_branches() {
    for fixed in ["master", "staging", "release"] {
        let repo = on_pushed_feature(fixed);
        let hosting = MockHosting::new();
        let ui = ScriptedInteraction::new();
        let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

        assert!(matches!(flow.rebase(), Err(FlowError::WrongBranch { .. })));
        assert!(matches!(
            flow.publish(false, false),
            Err(FlowError::WrongBranch { .. })
        ));
        assert!(matches!(
            flow.pull_request(),
            Err(FlowError::WrongBranch { .. })
        ));
        assert!(matches!(
            flow.finish(true, true),
            Err(FlowError::WrongBranch { .. })
        ));
        assert!(repo.calls().is_empty());
    }
}

#[test]
fn test_rebase_updates_master_first() {
    let repo = on_pushed_feature(FEATURE);
    let hosting = MockHosting::new();
    let ui = ScriptedInteraction::new();
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    flow.rebase().unwrap();

    assert_eq!(
        repo.calls(),
        vec![
            checkout("master"),
            pull("master"),
            checkout(FEATURE),
            GitCall::RebaseOnto("master".to_string()),
        ]
    );
    assert_eq!(repo.head(), FEATURE);
}

#[test]
fn test_publish_pushes_and_tracks() {
    let repo = MockRepository::new();
    repo.set_head(FEATURE);
    let hosting = MockHosting::new();
    let ui = ScriptedInteraction::new();
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    assert_eq!(flow.publish(false, false).unwrap(), None);

    assert_eq!(
        repo.calls(),
        vec![
            GitCall::PushBranch {
                remote: "origin".to_string(),
                branch: FEATURE.to_string(),
            },
            GitCall::SetUpstream {
                branch: FEATURE.to_string(),
                remote: "origin".to_string(),
            },
        ]
    );
    assert!(hosting.calls().is_empty());
}

#[test]
fn test_publish_with_rebase_and_pull_request() {
    let repo = MockRepository::new();
    repo.set_head(FEATURE);
    let hosting = MockHosting::new();
    let ui = ScriptedInteraction::new().with_answers(&["Adds an LRU cache"]);
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    let pr = flow.publish(true, true).unwrap().expect("pull request");

    let calls = repo.calls();
    assert_eq!(calls[3], GitCall::RebaseOnto("master".to_string()));
    assert!(matches!(calls[4], GitCall::PushBranch { .. }));
    assert_eq!(pr.head, FEATURE);
    assert_eq!(hosting.create_count(), 1);
}

#[test]
fn test_pull_request_title_body_and_base() {
    let repo = on_pushed_feature(FEATURE);
    let hosting = MockHosting::new();
    let ui = ScriptedInteraction::new().with_answers(&["Adds an LRU cache"]);
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    let pr = flow.pull_request().unwrap();

    assert_eq!(
        hosting.calls(),
        vec![
            HostingCall::ListPullRequests(FEATURE.to_string()),
            HostingCall::CreatePullRequest(NewPullRequest {
                title: "10 add cache".to_string(),
                body: "Adds an LRU cache #10".to_string(),
                head: FEATURE.to_string(),
                base: "master".to_string(),
            }),
        ]
    );
    assert!(ui
        .messages()
        .contains(&format!("Successfully created PR: {}", pr.html_url)));
    assert!(ui.warnings().is_empty());
}

#[test]
fn test_pull_request_without_issue_number() {
    let repo = on_pushed_feature("fix-Login");
    let hosting = MockHosting::new();
    let ui = ScriptedInteraction::new().with_answers(&["Login broke"]);
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    flow.pull_request().unwrap();

    match &hosting.calls()[1] {
        HostingCall::CreatePullRequest(request) => {
            assert_eq!(request.title, "Fix login");
            assert_eq!(request.body, "Login broke");
        }
        other => panic!("expected CreatePullRequest, got {:?}", other),
    }
    assert_eq!(
        ui.warnings(),
        vec![FlowWarning::NoIssueNumber {
            branch: "fix-Login".to_string(),
        }]
    );
}

#[test]
fn test_pull_request_is_idempotent() {
    let repo = on_pushed_feature(FEATURE);
    let hosting = MockHosting::new();
    let ui = ScriptedInteraction::new().with_answers(&["first"]);
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    let first = flow.pull_request().unwrap();
    let second = flow.pull_request().unwrap();

    assert_eq!(first, second);
    assert_eq!(hosting.create_count(), 1);
    assert_eq!(
        ui.warnings(),
        vec![FlowWarning::PullRequestExists {
            number: first.number,
            url: first.html_url.clone(),
        }]
    );
}

#[test]
fn test_pull_request_requires_pushed_branch() {
    let repo = MockRepository::new();
    repo.set_head(FEATURE);
    let hosting = MockHosting::new();
    let ui = ScriptedInteraction::new();
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    match flow.pull_request() {
        Err(FlowError::NotPushed { branch, remote }) => {
            assert_eq!(branch, FEATURE);
            assert_eq!(remote, "origin");
        }
        other => panic!("expected NotPushed, got {:?}", other),
    }
    assert!(hosting.calls().is_empty());
}

#[test]
fn test_finish_without_merge_deletes_local_branch() {
    let repo = on_pushed_feature(FEATURE);
    let hosting = MockHosting::new();
    let ui = ScriptedInteraction::new();
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    let outcome = flow.finish(true, false).unwrap();

    assert_eq!(outcome, FinishOutcome::Finished { merged: None });
    assert_eq!(
        repo.calls(),
        vec![
            checkout("master"),
            pull("master"),
            GitCall::DeleteBranch(FEATURE.to_string()),
        ]
    );
    assert!(hosting.calls().is_empty());
    assert!(!repo.has_branch(FEATURE));
    assert_eq!(ui.messages().last(), Some(&"Done".to_string()));
}

#[test]
fn test_finish_keeps_branch_without_delete() {
    let repo = on_pushed_feature(FEATURE);
    let hosting = MockHosting::new();
    let ui = ScriptedInteraction::new();
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    flow.finish(false, false).unwrap();

    assert_eq!(repo.calls(), vec![checkout("master"), pull("master")]);
    assert!(repo.has_branch(FEATURE));
}

#[test]
fn test_finish_merges_when_no_status_exists() {
    let repo = on_pushed_feature(FEATURE);
    let hosting = MockHosting::new();
    let ui = ScriptedInteraction::new().with_answers(&["Adds an LRU cache"]);
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    let outcome = flow.finish(true, true).unwrap();

    assert_eq!(outcome, FinishOutcome::Finished { merged: Some(1) });
    assert_eq!(hosting.merged(), vec![1]);
    assert_eq!(
        repo.calls(),
        vec![
            GitCall::DeleteRemoteBranch {
                remote: "origin".to_string(),
                branch: FEATURE.to_string(),
            },
            checkout("master"),
            pull("master"),
            GitCall::DeleteBranch(FEATURE.to_string()),
        ]
    );
}

#[test]
fn test_finish_merges_existing_pull_request_on_success() {
    let repo = on_pushed_feature(FEATURE);
    let tip = repo.branch_tip(FEATURE).unwrap().to_string();
    let hosting = MockHosting::new();
    hosting.add_pull_request(PullRequest {
        number: 7,
        title: "10 add cache".to_string(),
        head: FEATURE.to_string(),
        base: "master".to_string(),
        html_url: "https://github.com/acme/backend/pull/7".to_string(),
        mergeable: Some(true),
    });
    hosting.set_status(&tip, StatusState::Success, "All checks passed");
    let ui = ScriptedInteraction::new();
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    let outcome = flow.finish(false, true).unwrap();

    assert_eq!(outcome, FinishOutcome::Finished { merged: Some(7) });
    assert_eq!(hosting.create_count(), 0);
    assert!(hosting
        .calls()
        .contains(&HostingCall::LatestCommitStatus(tip.clone())));
    assert!(ui.messages().contains(&format!(
        "All checks passed. See for more https://ci.example.com/{}",
        tip
    )));
    assert!(repo.has_branch(FEATURE));
}

#[test]
fn test_finish_stops_on_failing_status() {
    let repo = on_pushed_feature(FEATURE);
    let tip = repo.branch_tip(FEATURE).unwrap().to_string();
    let hosting = MockHosting::new();
    hosting.set_status(&tip, StatusState::Failure, "2 tests failed");
    let ui = ScriptedInteraction::new().with_answers(&["Adds an LRU cache"]);
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    let outcome = flow.finish(true, true).unwrap();

    assert_eq!(
        outcome,
        FinishOutcome::ChecksFailed {
            state: "failure".to_string()
        }
    );
    assert!(hosting.merged().is_empty());
    assert!(repo.calls().is_empty());
    assert_eq!(repo.head(), FEATURE);
    assert!(repo.has_branch(FEATURE));
    assert_eq!(
        ui.warnings(),
        vec![FlowWarning::ChecksFailed {
            state: "failure".to_string(),
            description: Some("2 tests failed".to_string()),
        }]
    );
}

#[test]
fn test_finish_stops_on_pending_status() {
    let repo = on_pushed_feature(FEATURE);
    let tip = repo.branch_tip(FEATURE).unwrap().to_string();
    let hosting = MockHosting::new();
    hosting.set_status(&tip, StatusState::Pending, "Build queued");
    let ui = ScriptedInteraction::new().with_answers(&["body"]);
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    assert!(matches!(
        flow.finish(true, true).unwrap(),
        FinishOutcome::ChecksFailed { .. }
    ));
    assert!(hosting.merged().is_empty());
}

#[test]
fn test_finish_refuses_unknown_mergeability() {
    let repo = on_pushed_feature(FEATURE);
    let hosting = MockHosting::new();
    hosting.set_created_mergeable(None);
    let ui = ScriptedInteraction::new().with_answers(&["body"]);
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    match flow.finish(true, true) {
        Err(FlowError::NotMergeable { number }) => assert_eq!(number, 1),
        other => panic!("expected NotMergeable, got {:?}", other),
    }
    assert!(hosting.merged().is_empty());
    assert!(repo.calls().is_empty());
}

#[test]
fn test_finish_on_unpushed_branch_fails() {
    let repo = MockRepository::new();
    repo.set_head(FEATURE);
    let hosting = MockHosting::new();
    let ui = ScriptedInteraction::new();
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    assert!(matches!(
        flow.finish(true, false),
        Err(FlowError::NotPushed { .. })
    ));
    assert!(repo.calls().is_empty());
}

#[test]
fn test_start_keeps_base_letters_of_accented_issue_title() {
    let repo = MockRepository::new();
    let hosting = MockHosting::new();
    hosting.add_issue(12, "Café Übersicht");
    let ui = ScriptedInteraction::new().with_answers(&["12", ""]);
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    assert_eq!(flow.start(true).unwrap(), "12-cafe-ubersicht");
    assert!(repo.has_branch("12-cafe-ubersicht"));
}

#[test]
fn test_start_with_only_accented_letters() {
    let repo = MockRepository::new();
    let hosting = MockHosting::new();
    let ui = ScriptedInteraction::new().with_answers(&["", "Éé"]);
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    assert_eq!(flow.start(false).unwrap(), "ee");
}

#[test]
fn test_created_pull_request_is_opened_in_browser() {
    let repo = on_pushed_feature(FEATURE);
    let hosting = MockHosting::new();
    let ui = ScriptedInteraction::new().with_answers(&["Adds an LRU cache"]);
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    let pr = flow.pull_request().unwrap();
    assert_eq!(ui.opened_urls(), vec![pr.html_url.clone()]);

    // The second call finds the open pull request and leaves the browser alone.
    flow.pull_request().unwrap();
    assert_eq!(ui.opened_urls(), vec![pr.html_url]);
}

#[test]
fn test_existing_pull_request_is_not_opened() {
    let repo = on_pushed_feature(FEATURE);
    let hosting = MockHosting::new();
    hosting.add_pull_request(PullRequest {
        number: 7,
        title: "10 add cache".to_string(),
        head: FEATURE.to_string(),
        base: "master".to_string(),
        html_url: "https://github.com/acme/backend/pull/7".to_string(),
        mergeable: Some(true),
    });
    let ui = ScriptedInteraction::new();
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    assert_eq!(flow.pull_request().unwrap().number, 7);
    assert!(ui.opened_urls().is_empty());
}

#[test]
fn test_browser_can_be_disabled() {
    let repo = on_pushed_feature(FEATURE);
    let hosting = MockHosting::new();
    let ui = ScriptedInteraction::new().with_answers(&["Adds an LRU cache"]);
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin").with_browser(false);

    flow.pull_request().unwrap();
    assert_eq!(hosting.create_count(), 1);
    assert!(ui.opened_urls().is_empty());
}

#[test]
fn test_pull_request_from_zero_prefixed_branch_has_no_issue_suffix() {
    let repo = on_pushed_feature("0-x");
    let hosting = MockHosting::new();
    let ui = ScriptedInteraction::new().with_answers(&["Tweak"]);
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    flow.pull_request().unwrap();

    match &hosting.calls()[1] {
        HostingCall::CreatePullRequest(request) => assert_eq!(request.body, "Tweak"),
        other => panic!("expected CreatePullRequest, got {:?}", other),
    }
    assert_eq!(
        ui.warnings(),
        vec![FlowWarning::NoIssueNumber {
            branch: "0-x".to_string(),
        }]
    );
}

#[test]
fn test_pull_request_reports_connecting_before_hosting_calls() {
    let repo = on_pushed_feature(FEATURE);
    let hosting = MockHosting::new();
    let ui = ScriptedInteraction::new().with_answers(&["body"]);
    let flow = FeatureFlow::new(&repo, &hosting, &ui, "origin");

    flow.pull_request().unwrap();

    let messages = ui.messages();
    let connecting = messages
        .iter()
        .position(|m| m == "Connecting to GitHub...")
        .expect("connecting status");
    let created = messages
        .iter()
        .position(|m| m.starts_with("Successfully created PR"))
        .unwrap();
    assert!(connecting < created);
}
