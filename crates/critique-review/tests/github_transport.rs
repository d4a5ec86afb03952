mod common;

use common::StubServer;
use critique_core::{PullRequestRef, RepositoryRef, Secret};
use critique_review::github::{CommentPublisher, GitHubClient};

#[tokio::test]
async fn not_found_surfaces_status_code() {
    let server = StubServer::respond_once(
        "404 Not Found",
        r#"{"message":"Not Found","documentation_url":"https://docs.github.com/rest"}"#,
    );
    let client = GitHubClient::new(&Secret::new("ghs_test"), Some(&server.url)).unwrap();
    let repo = RepositoryRef::parse("octo/demo").unwrap();

    let err = client
        .publish(&repo, PullRequestRef(7), "## Review\n\nLooks good")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("Not Found"));

    let request = server.request();
    assert!(request
        .request_line
        .starts_with("POST /repos/octo/demo/issues/7/comments"));
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["body"], "## Review\n\nLooks good");
}

const CREATED_COMMENT: &str = r###"{
  "id": 1,
  "node_id": "MDEyOklzc3VlQ29tbWVudDE=",
  "url": "https://api.github.com/repos/octo/demo/issues/comments/1",
  "html_url": "https://github.com/octo/demo/pull/7#issuecomment-1",
  "issue_url": "https://api.github.com/repos/octo/demo/issues/7",
  "body": "## Review\n\nLooks good",
  "user": {
    "login": "github-actions[bot]",
    "id": 41898282,
    "node_id": "MDM6Qm90NDE4OTgyODI=",
    "avatar_url": "https://avatars.githubusercontent.com/in/15368?v=4",
    "gravatar_id": "",
    "url": "https://api.github.com/users/github-actions%5Bbot%5D",
    "html_url": "https://github.com/apps/github-actions",
    "followers_url": "https://api.github.com/users/github-actions%5Bbot%5D/followers",
    "following_url": "https://api.github.com/users/github-actions%5Bbot%5D/following{/other_user}",
    "gists_url": "https://api.github.com/users/github-actions%5Bbot%5D/gists{/gist_id}",
    "starred_url": "https://api.github.com/users/github-actions%5Bbot%5D/starred{/owner}{/repo}",
    "subscriptions_url": "https://api.github.com/users/github-actions%5Bbot%5D/subscriptions",
    "organizations_url": "https://api.github.com/users/github-actions%5Bbot%5D/orgs",
    "repos_url": "https://api.github.com/users/github-actions%5Bbot%5D/repos",
    "events_url": "https://api.github.com/users/github-actions%5Bbot%5D/events{/privacy}",
    "received_events_url": "https://api.github.com/users/github-actions%5Bbot%5D/received_events",
    "type": "Bot",
    "site_admin": false
  },
  "created_at": "2024-05-01T12:00:00Z",
  "updated_at": "2024-05-01T12:00:00Z",
  "author_association": "NONE",
  "performed_via_github_app": null
}"###;

#[tokio::test]
async fn created_comment_returns_html_url() {
    let server = StubServer::respond_once("201 Created", CREATED_COMMENT);
    let client = GitHubClient::new(&Secret::new("ghs_test"), Some(&server.url)).unwrap();
    let repo = RepositoryRef::parse("octo/demo").unwrap();

    let url = client
        .publish(&repo, PullRequestRef(7), "## Review\n\nLooks good")
        .await
        .unwrap();
    assert_eq!(url, "https://github.com/octo/demo/pull/7#issuecomment-1");

    let request = server.single_request();
    assert!(request
        .request_line
        .starts_with("POST /repos/octo/demo/issues/7/comments "));
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body, serde_json::json!({"body": "## Review\n\nLooks good"}));
}
