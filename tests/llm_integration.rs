//! Integration tests against live model endpoints.
//!
//! These tests make real network calls.
//! Run with: LITELLM_API_BASE=http://localhost:4000 cargo test --test llm_integration -- --ignored

use promptforge::config::{ChatConfig, RunnerConfig};
use promptforge::llm::{
    GenerationRequest, LiteLlmClient, LlmProvider, Message, ModelRunner, OllamaClient,
};

fn create_chat_client() -> LiteLlmClient {
    let config = ChatConfig::from_env()
        .expect("LITELLM_API_BASE environment variable must be set for integration tests");
    LiteLlmClient::new(config).expect("client should build")
}

fn create_runner() -> OllamaClient {
    let config = RunnerConfig::from_env().expect("runner config should load");
    OllamaClient::new(config).expect("client should build")
}

#[tokio::test]
#[ignore] // Run with: cargo test --test llm_integration -- --ignored
async fn test_simple_generation() {
    let client = create_chat_client();

    let request = GenerationRequest::new(
        "",
        vec![
            Message::system("You are a helpful assistant. Reply concisely."),
            Message::user("What is 2 + 2? Reply with just the number."),
        ],
    )
    .with_max_tokens(10)
    .with_temperature(0.0);

    let response = client.generate(request).await;
    assert!(response.is_ok(), "Generation failed: {:?}", response.err());

    let response = response.expect("Should have response");
    let content = response.first_content().expect("Should have content");
    assert!(
        content.contains('4'),
        "Response should contain '4', got: {}",
        content
    );
}

#[tokio::test]
#[ignore]
async fn test_marker_formatted_reply() {
    let client = create_chat_client();

    let request = GenerationRequest::new(
        "",
        vec![Message::user(
            "Reply with the word hello wrapped exactly as <START>hello<END> and nothing else.",
        )],
    )
    .with_temperature(0.0);

    let response = client.generate(request).await.expect("generation should succeed");
    let content = response.first_content().expect("Should have content");
    let blocks = promptforge::utils::extract_marked_blocks(content);
    assert_eq!(blocks.len(), 1);
    assert!(blocks[0].to_lowercase().contains("hello"));
}

#[tokio::test]
#[ignore] // Requires a local model server with at least one model
async fn test_local_server_models_and_run() {
    let runner = create_runner();
    assert!(runner.check_connection().await, "server should be reachable");

    let models = runner.list_models().await.expect("should list models");
    let model = models.first().expect("at least one model installed");

    let output = runner
        .run_prompt(&model.name, "Reply with the single word: ready")
        .await
        .expect("run should succeed");
    assert!(!output.is_empty());
    assert!(!output.contains("<think>"));
}
