#[cfg(test)]
mod tests {
    use crate::ai::{generate, AIError, CompletionClient, OpenAIClient, SYSTEM_PROMPT};
    use crate::config::AIConfig;
    use crate::prompt::Prompt;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;
    use std::path::PathBuf;

    async fn setup_test_server() -> (ServerGuard, AIConfig) {
        let server = Server::new_async().await;

        let config = AIConfig {
            api_key: Some("test_key".to_string()),
            model: "gpt-test".to_string(),
            max_tokens: 1000,
            api_url: format!("{}/v1/chat/completions", server.url()),
            timeout_secs: 5,
            ..AIConfig::default()
        };

        (server, config)
    }

    fn completion(content: &str) -> String {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_sends_chat_request_and_returns_content() {
        let (mut server, config) = setup_test_server().await;

        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test_key")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-test",
                "max_tokens": 1000,
                "temperature": 0.7,
                "messages": [
                    { "role": "system", "content": SYSTEM_PROMPT },
                    { "role": "user", "content": "write tests" }
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion("def test_x(): pass"))
            .create_async()
            .await;

        let client = OpenAIClient::new(config).unwrap();
        let text = client.complete("write tests").await.unwrap();

        assert_eq!(text, "def test_x(): pass");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_authentication_error() {
        let (mut server, config) = setup_test_server().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(401)
            .create_async()
            .await;

        let result = OpenAIClient::new(config).unwrap().complete("p").await;
        assert!(matches!(result, Err(AIError::AuthenticationError(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_limit_is_reported_once() {
        let (mut server, config) = setup_test_server().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .expect(1)
            .create_async()
            .await;

        let result = OpenAIClient::new(config).unwrap().complete("p").await;
        assert!(matches!(result, Err(AIError::RateLimitError(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_includes_body() {
        let (mut server, config) = setup_test_server().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        match OpenAIClient::new(config).unwrap().complete("p").await {
            Err(AIError::APIError(msg)) => assert!(msg.contains("upstream exploded")),
            other => panic!("expected APIError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let (mut server, config) = setup_test_server().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let result = OpenAIClient::new(config).unwrap().complete("p").await;
        assert!(matches!(result, Err(AIError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let config = AIConfig {
            api_key: Some("test_key".to_string()),
            api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            timeout_secs: 2,
            ..AIConfig::default()
        };

        let result = OpenAIClient::new(config).unwrap().complete("p").await;
        assert!(matches!(result, Err(AIError::NetworkError(_))));
    }

    #[tokio::test]
    async fn test_generate_normalizes_fenced_output() {
        let (mut server, config) = setup_test_server().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(completion("```python\nassert \u{201C}a\u{201D} == 'a'\n```"))
            .create_async()
            .await;

        let client = OpenAIClient::new(config).unwrap();
        let prompt = Prompt::new(PathBuf::from("app.py"), "prompt".to_string());

        assert_eq!(
            generate(&client, &prompt).await.as_deref(),
            Some("assert \"a\" == 'a'")
        );
    }

    #[tokio::test]
    async fn test_generate_swallows_failures() {
        let (mut server, config) = setup_test_server().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(503)
            .create_async()
            .await;

        let client = OpenAIClient::new(config).unwrap();
        let prompt = Prompt::new(PathBuf::from("app.py"), "prompt".to_string());

        assert!(generate(&client, &prompt).await.is_none());
    }

    #[tokio::test]
    async fn test_generate_treats_blank_output_as_failure() {
        let (mut server, config) = setup_test_server().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(completion("   \n"))
            .create_async()
            .await;

        let client = OpenAIClient::new(config).unwrap();
        let prompt = Prompt::new(PathBuf::from("app.py"), "prompt".to_string());

        assert!(generate(&client, &prompt).await.is_none());
    }

    #[tokio::test]
    async fn test_generate_treats_lone_fence_as_failure() {
        let (mut server, config) = setup_test_server().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(completion("```"))
            .create_async()
            .await;

        let client = OpenAIClient::new(config).unwrap();
        let prompt = Prompt::new(PathBuf::from("app.py"), "prompt".to_string());

        assert!(generate(&client, &prompt).await.is_none());
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        // Accepts connections into the backlog but never answers.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let config = AIConfig {
            api_key: Some("test_key".to_string()),
            api_url: format!(
                "http://{}/v1/chat/completions",
                listener.local_addr().unwrap()
            ),
            timeout_secs: 1,
            ..AIConfig::default()
        };

        let result = OpenAIClient::new(config).unwrap().complete("p").await;
        match result {
            Err(AIError::NetworkError(msg)) => assert!(msg.contains("timed out"), "{}", msg),
            other => panic!("expected NetworkError, got {:?}", other),
        }
        drop(listener);
    }
}
