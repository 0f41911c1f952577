// ABOUTME: Integration tests for the commit context.
// ABOUTME: Reads GitHub Actions variables and event payloads, and resolves pull request heads.

mod support;

use deployment_gate::context::{CommitContext, ContextError, PullRequest};
use std::fs;
use support::FakePlatform;

fn event_file(json: &str) -> tempfile::NamedTempFile {
    let file = tempfile::NamedTempFile::new().unwrap();
    fs::write(file.path(), json).unwrap();
    file
}

mod from_env {
    use super::*;

    #[test]
    fn reads_repository_sha_and_event() {
        let event = event_file(r#"{"pull_request": {"number": 12}}"#);
        let event_path = event.path().to_str().unwrap();

        temp_env::with_vars(
            [
                ("GITHUB_REPOSITORY", Some("acme/site")),
                ("GITHUB_SHA", Some("merge-sha")),
                ("GITHUB_EVENT_PATH", Some(event_path)),
            ],
            || {
                let context = CommitContext::from_env().unwrap();
                assert_eq!(context.repo.to_string(), "acme/site");
                assert_eq!(context.sha.as_deref(), Some("merge-sha"));
                assert_eq!(context.pull_request, PullRequest::Numbered(12));
            },
        );
    }

    #[test]
    fn missing_repository_fails() {
        temp_env::with_vars_unset(["GITHUB_REPOSITORY"], || {
            assert!(matches!(
                CommitContext::from_env(),
                Err(ContextError::MissingRepository)
            ));
        });
    }

    #[test]
    fn empty_sha_counts_as_missing() {
        temp_env::with_vars(
            [
                ("GITHUB_REPOSITORY", Some("acme/site")),
                ("GITHUB_SHA", Some("")),
                ("GITHUB_EVENT_PATH", None),
            ],
            || {
                let context = CommitContext::from_env().unwrap();
                assert_eq!(context.sha, None);
                assert_eq!(context.pull_request, PullRequest::Absent);
            },
        );
    }
}

mod resolve_commit_sha {
    use super::*;

    #[tokio::test]
    async fn push_uses_triggering_sha() {
        let context = CommitContext::from_parts("acme/site", Some("push-sha".into()), None).unwrap();
        let sha = context
            .resolve_commit_sha(&FakePlatform::new())
            .await
            .unwrap();
        assert_eq!(sha, "push-sha");
    }

    #[tokio::test]
    async fn pull_request_uses_head_sha() {
        let event = event_file(r#"{"pull_request": {"number": 7}}"#);
        let context =
            CommitContext::from_parts("acme/site", Some("merge-sha".into()), Some(event.path()))
                .unwrap();
        let platform = FakePlatform::new().pull_request(7, "head-sha");

        let sha = context.resolve_commit_sha(&platform).await.unwrap();
        assert_eq!(sha, "head-sha");
    }

    #[tokio::test]
    async fn pull_request_without_number_fails() {
        let event = event_file(r#"{"pull_request": {}}"#);
        let context =
            CommitContext::from_parts("acme/site", Some("merge-sha".into()), Some(event.path()))
                .unwrap();

        let err = context
            .resolve_commit_sha(&FakePlatform::new())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing information: Pull request detected but no PR number was found in payload. Exiting..."
        );
    }

    #[tokio::test]
    async fn unavailable_pull_request_fails_with_cause() {
        let event = event_file(r#"{"pull_request": {"number": 99}}"#);
        let context =
            CommitContext::from_parts("acme/site", Some("merge-sha".into()), Some(event.path()))
                .unwrap();

        let err = context
            .resolve_commit_sha(&FakePlatform::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ContextError::PullRequestHead(_)));
        assert_eq!(
            std::error::Error::source(&err).map(|e| e.to_string()),
            Some("Could not get information about the current pull request".to_string())
        );
    }

    #[tokio::test]
    async fn no_sha_at_all_fails() {
        let context = CommitContext::from_parts("acme/site", None, None).unwrap();
        let err = context
            .resolve_commit_sha(&FakePlatform::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ContextError::MissingSha));
    }
}

#[test]
fn malformed_payload_is_reported() {
    let event = event_file("not json");
    let err = CommitContext::from_parts("acme/site", None, Some(event.path())).unwrap_err();
    assert!(matches!(err, ContextError::ParseEvent { .. }));
}
