mod common;

use common::StubServer;
use critique_core::{CritiqueError, DiffResult, LlmConfig, ResponseSchema, Secret};
use critique_review::llm::{LlmClient, ReviewModel};

fn client_for(server: &StubServer, schema: ResponseSchema) -> LlmClient {
    let config = LlmConfig {
        model: "gpt-3.5-turbo".into(),
        endpoint: format!("{}/v1/chat/completions", server.url),
        response_schema: schema,
    };
    LlmClient::new(&config, Secret::new("sk-test")).unwrap()
}

#[tokio::test]
async fn review_sends_single_user_message_with_bearer_token() {
    let server = StubServer::respond_once(
        "200 OK",
        r#"{"choices":[{"message":{"role":"assistant","content":"Looks good"}}]}"#,
    );
    let client = client_for(&server, ResponseSchema::Choices);

    let review = client
        .review(&DiffResult::new("+fn added() {}"), "English")
        .await
        .unwrap();
    assert_eq!(review.as_str(), "Looks good");

    let request = server.request();
    assert!(request.request_line.starts_with("POST /v1/chat/completions"));
    assert_eq!(request.header("authorization"), Some("Bearer sk-test"));
    assert!(request
        .header("content-type")
        .is_some_and(|v| v.starts_with("application/json")));

    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["model"], "gpt-3.5-turbo");
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "user");
    let content = messages[0]["content"].as_str().unwrap();
    assert!(content.contains("+fn added() {}"));
    assert!(content.contains("in English"));
}

#[tokio::test]
async fn non_success_status_carries_code_and_body() {
    let server = StubServer::respond_once(
        "429 Too Many Requests",
        r#"{"error":{"message":"Rate limit reached"}}"#,
    );
    let client = client_for(&server, ResponseSchema::Choices);

    let err = client
        .review(&DiffResult::new("+x"), "English")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(429));
    assert!(err.to_string().contains("429"));
    assert!(err.to_string().contains("Rate limit reached"));
    server.request();
}

#[tokio::test]
async fn empty_choices_fail_explicitly() {
    let server = StubServer::respond_once("200 OK", r#"{"choices":[]}"#);
    let client = client_for(&server, ResponseSchema::Choices);

    let err = client
        .review(&DiffResult::new("+x"), "English")
        .await
        .unwrap_err();
    assert!(matches!(err, CritiqueError::EmptyCompletion));
    server.request();
}

#[tokio::test]
async fn flat_message_schema_is_supported() {
    let server = StubServer::respond_once("200 OK", r#"{"message":"Rename foo"}"#);
    let client = client_for(&server, ResponseSchema::Message);

    let review = client
        .review(&DiffResult::new("+x"), "English")
        .await
        .unwrap();
    assert_eq!(review.as_str(), "Rename foo");
    server.request();
}

#[tokio::test]
async fn undecodable_body_is_a_transport_error() {
    let server = StubServer::respond_once("200 OK", "not json");
    let client = client_for(&server, ResponseSchema::Choices);

    let err = client
        .review(&DiffResult::new("+x"), "English")
        .await
        .unwrap_err();
    assert!(matches!(err, CritiqueError::Http { .. }));
    server.request();
}
