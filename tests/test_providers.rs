use menu_analyzer::{AnalyzerError, DishAnalysis, ProviderConfig, ProviderFactory, ProviderKind};
use mockito::Server;
use serde_json::{json, Value};

fn dishes_payload() -> Value {
    json!({
        "dishes": [
            {
                "name": "Caprese Salad",
                "is_vegetarian": true,
                "is_vegan": false,
                "confidence": 91,
                "reasoning": "Fresh mozzarella",
                "ingredients": ["tomato", "mozzarella", "basil"]
            },
            {
                "name": "Chana Masala",
                "is_vegetarian": true,
                "is_vegan": true,
                "confidence": 87.5,
                "reasoning": "Chickpeas in a tomato sauce",
                "ingredients": ["chickpeas", "onion"]
            },
            {
                "name": "Beef Burrito",
                "is_vegetarian": false,
                "is_vegan": false,
                "confidence": 99,
                "reasoning": "Beef",
                "ingredients": ["beef", "tortilla"]
            }
        ]
    })
}

/// The path each vendor is called on and its response envelope around `content`
fn vendor_response(kind: ProviderKind, content: &str) -> (&'static str, Value) {
    match kind {
        ProviderKind::DeepSeek | ProviderKind::OpenAI => (
            "/v1/chat/completions",
            json!({"choices": [{"message": {"role": "assistant", "content": content}}]}),
        ),
        ProviderKind::Gemini => (
            "/v1beta/models/gemini-pro:generateContent",
            json!({"candidates": [{"content": {"parts": [{"text": content}]}}]}),
        ),
        ProviderKind::Qwen => (
            "/api/v1/services/aigc/text-generation/generation",
            json!({"output": {"choices": [{"message": {"content": content}}]}}),
        ),
        ProviderKind::Anthropic => (
            "/v1/messages",
            json!({"content": [{"type": "text", "text": content}]}),
        ),
    }
}

fn config_for(server: &Server) -> ProviderConfig {
    ProviderConfig {
        base_url: Some(server.url()),
        ..ProviderConfig::with_api_key("test-key")
    }
}

fn expected_dishes() -> Vec<DishAnalysis> {
    serde_json::from_value(dishes_payload()["dishes"].clone()).unwrap()
}

#[tokio::test]
async fn test_every_provider_returns_the_same_records() {
    let content = dishes_payload().to_string();

    for kind in ProviderKind::ALL {
        let mut server = Server::new_async().await;
        let (path, body) = vendor_response(kind, &content);
        let mock = server
            .mock("POST", path)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(1)
            .create_async()
            .await;

        let provider = ProviderFactory::create(kind, &config_for(&server)).unwrap();
        assert_eq!(provider.provider_name(), kind.as_str());

        let dishes = provider.analyze_menu("Caprese Salad\nChana Masala\nBeef Burrito").await;
        assert_eq!(dishes.unwrap(), expected_dishes(), "provider {}", kind);
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn test_every_provider_rejects_missing_dishes() {
    let content = json!({"items": []}).to_string();

    for kind in ProviderKind::ALL {
        let mut server = Server::new_async().await;
        let (path, body) = vendor_response(kind, &content);
        let _mock = server
            .mock("POST", path)
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let provider = ProviderFactory::create(kind, &config_for(&server)).unwrap();
        let err = provider.analyze_menu("Soup of the day").await.unwrap_err();
        match err {
            AnalyzerError::Schema { vendor, .. } => assert_eq!(vendor, kind.as_str()),
            other => panic!("provider {}: expected schema error, got {}", kind, other),
        }
    }
}

#[tokio::test]
async fn test_every_provider_reports_http_status() {
    for kind in ProviderKind::ALL {
        let mut server = Server::new_async().await;
        let (path, _) = vendor_response(kind, "");
        let _mock = server
            .mock("POST", path)
            .with_status(429)
            .with_body(r#"{"error":{"message":"rate limited"}}"#)
            .create_async()
            .await;

        let provider = ProviderFactory::create(kind, &config_for(&server)).unwrap();
        let err = provider.analyze_menu("Soup of the day").await.unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with(kind.as_str()), "{}", message);
        assert!(message.contains("429"), "{}", message);
        assert!(message.contains("rate limited"), "{}", message);
    }
}

#[test]
fn test_missing_key_for_every_provider() {
    for kind in ProviderKind::ALL {
        let err = ProviderFactory::create(kind, &ProviderConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, AnalyzerError::Configuration { .. }));
        assert!(err.to_string().contains(kind.api_key_env()));
    }
}

#[test]
fn test_unsupported_provider_identifier() {
    let err = "mistral".parse::<ProviderKind>().unwrap_err();
    assert_eq!(err.to_string(), "Unsupported LLM provider: mistral");
}
