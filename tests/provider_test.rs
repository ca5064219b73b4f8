//! Provider tests against mocked Google and OpenAI endpoints

use httpmock::prelude::*;
use serde_json::json;

use lss_training_assistant::models::types::ChatMessage;
use lss_training_assistant::providers::openai::OpenAiClient;
use lss_training_assistant::providers::sheets::{AuthorizedUser, SheetsClient};

fn creds() -> AuthorizedUser {
    AuthorizedUser::from_json(
        r#"{"client_id":"id-1","client_secret":"secret-1","refresh_token":"rt-1"}"#,
    )
    .unwrap()
}

#[tokio::test]
async fn test_openai_chat_returns_assistant_content() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer sk-test")
                .json_body_partial(r#"{"model": "gpt-4-turbo-preview", "temperature": 0.1}"#);
            then.status(200).json_body(json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "De omzet was €2.500,00."}}
                ]
            }));
        })
        .await;

    let client = OpenAiClient::with_base_url("sk-test", server.base_url());
    let answer = client
        .chat(&[
            ChatMessage::system("Je bent een assistent."),
            ChatMessage::user("Wat was de omzet in januari?"),
        ])
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(answer, "De omzet was €2.500,00.");
}

#[tokio::test]
async fn test_openai_auth_error_is_not_retried() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(401).json_body(json!({"error": {"message": "invalid key"}}));
        })
        .await;

    let client = OpenAiClient::with_base_url("sk-bad", server.base_url());
    let err = client.chat(&[ChatMessage::user("test")]).await.unwrap_err();

    assert_eq!(mock.hits_async().await, 1);
    assert_eq!(err.code_str(), "OPENAI_REQUEST_FAILED");
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_openai_empty_completion_is_invalid() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({"choices": []}));
        })
        .await;

    let client = OpenAiClient::with_base_url("sk-test", server.base_url());
    let err = client.chat(&[ChatMessage::user("test")]).await.unwrap_err();

    assert_eq!(err.code_str(), "OPENAI_INVALID_RESPONSE");
}

#[tokio::test]
async fn test_sheets_refreshes_token_and_fetches_values() {
    let server = MockServer::start_async().await;

    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/token")
                .body_contains("grant_type=refresh_token")
                .body_contains("refresh_token=rt-1");
            then.status(200).json_body(json!({
                "access_token": "ya29.test",
                "expires_in": 3599,
                "token_type": "Bearer"
            }));
        })
        .await;

    let values_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path_contains("/v4/spreadsheets/sheet-1/values/")
                .query_param("valueRenderOption", "FORMATTED_VALUE")
                .header("authorization", "Bearer ya29.test");
            then.status(200).json_body(json!({
                "range": "Inschrijvingen!A1:Z50000",
                "values": [
                    ["Datum Inschrijving", "Training", "Omzet", "Type"],
                    ["05-01-2024", "Green Belt", "€ 1.250,00", "Lean"]
                ]
            }));
        })
        .await;

    let client = SheetsClient::with_base_urls(
        creds(),
        None,
        server.base_url(),
        server.url("/token"),
    );

    let rows = client
        .values_get("sheet-1", "'Inschrijvingen'!A1:Z50000")
        .await
        .unwrap();

    token_mock.assert_async().await;
    values_mock.assert_async().await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][2], "€ 1.250,00");
}

#[tokio::test]
async fn test_sheets_token_is_cached_across_requests() {
    let server = MockServer::start_async().await;

    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/token");
            then.status(200).json_body(json!({
                "access_token": "ya29.test",
                "expires_in": 3600
            }));
        })
        .await;

    let values_mock = server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/v4/spreadsheets/sheet-1/values/");
            then.status(200).json_body(json!({
                "values": [["Datum Inschrijving"], ["x"]]
            }));
        })
        .await;

    let client = SheetsClient::with_base_urls(
        creds(),
        None,
        server.base_url(),
        server.url("/token"),
    );

    client.values_get("sheet-1", "A1:B2").await.unwrap();
    client.values_get("sheet-1", "A1:B2").await.unwrap();

    assert_eq!(token_mock.hits_async().await, 1);
    assert_eq!(values_mock.hits_async().await, 2);
}

#[tokio::test]
async fn test_sheets_empty_values_is_an_error() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/token");
            then.status(200).json_body(json!({"access_token": "ya29.test"}));
        })
        .await;

    server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/values/");
            then.status(200).json_body(json!({"range": "Leeg!A1:B2"}));
        })
        .await;

    let client = SheetsClient::with_base_urls(
        creds(),
        None,
        server.base_url(),
        server.url("/token"),
    );

    let err = client.values_get("sheet-1", "Leeg!A1:B2").await.unwrap_err();
    assert_eq!(err.code_str(), "DATA_EMPTY");
}

#[tokio::test]
async fn test_sheets_rejected_refresh_surfaces_auth_error() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/token");
            then.status(400).json_body(json!({"error": "invalid_grant"}));
        })
        .await;

    let client = SheetsClient::with_base_urls(
        creds(),
        None,
        server.base_url(),
        server.url("/token"),
    );

    let err = client.values_get("sheet-1", "A1:B2").await.unwrap_err();
    assert_eq!(err.code_str(), "AUTH_REFRESH_FAILED");
}
