//! Google Gemini provider with search grounding

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{
    Completion, CompletionError, CompletionProvider, CompletionRequest, GenerationConfig,
    ProviderInfo,
};
use crate::config::CompletionConfig;
use crate::types::WebSource;

pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    generation: GenerationConfig,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: &CompletionConfig) -> Result<Self, CompletionError> {
        Self::with_api_key(config, config.resolve_api_key())
    }

    /// Build with an already resolved key; `None` fails with
    /// [`CompletionError::MissingApiKey`].
    pub fn with_api_key(
        config: &CompletionConfig,
        api_key: Option<String>,
    ) -> Result<Self, CompletionError> {
        let api_key = api_key.ok_or(CompletionError::MissingApiKey)?;
        let base_url = config.endpoint.trim_end_matches('/').to_string();

        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .map_err(|source| CompletionError::Transport {
                endpoint: base_url.clone(),
                source,
            })?;

        tracing::info!(
            model = %config.model,
            connect_timeout_secs = config.connect_timeout_secs,
            "Creating GeminiProvider"
        );

        Ok(Self {
            api_key,
            model: config.model.clone(),
            base_url,
            generation: GenerationConfig::from(config),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// JSON body for a `generateContent` call.
    pub fn request_body(
        request: &CompletionRequest,
        generation: &GenerationConfig,
    ) -> serde_json::Value {
        let mut body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }]
            }],
            "generationConfig": {
                "temperature": generation.temperature,
                "topP": generation.top_p,
                "topK": generation.top_k,
                "maxOutputTokens": generation.max_tokens,
            }
        });

        if request.web_search {
            body["tools"] = json!([{ "google_search": {} }]);
        }

        if let Some(ref system) = request.system_instruction {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }

        body
    }

    /// Parse a response body as JSON, returning a clear error if the server returned HTML
    /// (e.g. a gateway error page) instead of valid JSON.
    pub fn parse_response_body(body: &str, endpoint: &str) -> Result<Completion, CompletionError> {
        let trimmed = body.trim_start();
        if trimmed.starts_with('<') {
            let preview: String = trimmed.chars().take(200).collect();
            return Err(CompletionError::MalformedResponse(format!(
                "{} returned HTML instead of JSON: {}",
                endpoint, preview
            )));
        }

        let response: GeminiResponse = serde_json::from_str(body).map_err(|e| {
            let preview: String = body.chars().take(300).collect();
            CompletionError::MalformedResponse(format!(
                "failed to parse JSON from {}: {}. Response body: {}",
                endpoint, e, preview
            ))
        })?;

        response.into_completion()
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
        let endpoint = self.endpoint();
        let body = Self::request_body(request, &self.generation);

        tracing::debug!(
            model = %self.model,
            prompt_len = request.prompt.len(),
            web_search = request.web_search,
            has_system_instruction = request.system_instruction.is_some(),
            "Sending generateContent request"
        );

        let transport = |source: reqwest::Error| CompletionError::Transport {
            endpoint: endpoint.clone(),
            source,
        };

        let response = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let text = response.text().await.map_err(transport)?;

        if !status.is_success() {
            return Err(CompletionError::Service {
                status: status.as_u16(),
                body: text,
            });
        }

        let completion = Self::parse_response_body(&text, &endpoint)?;
        tracing::debug!(
            text_len = completion.text.len(),
            citations = completion.citations.len(),
            "Gemini response received"
        );
        Ok(completion)
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Google".to_string(),
            model: self.model.clone(),
        }
    }
}

/// Response structures
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

impl GeminiResponse {
    fn into_completion(self) -> Result<Completion, CompletionError> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(CompletionError::EmptyResponse)?;

        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if text.is_empty() {
            return Err(CompletionError::EmptyResponse);
        }

        let citations = candidate
            .grounding_metadata
            .map(|metadata| metadata.grounding_chunks)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|chunk| chunk.web)
            .collect();

        Ok(Completion { text, citations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "https://example.test/models/m:generateContent";

    fn generation() -> GenerationConfig {
        GenerationConfig::from(&CompletionConfig::default())
    }

    #[test]
    fn test_request_body_with_search_and_system_instruction() {
        let request = CompletionRequest {
            prompt: "what is rust".into(),
            system_instruction: Some("Be brief.".into()),
            web_search: true,
        };
        let body = GeminiProvider::request_body(&request, &generation());

        assert_eq!(body["contents"][0]["parts"][0]["text"], "what is rust");
        assert!(body["tools"][0]["google_search"].is_object());
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be brief.");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
    }

    #[test]
    fn test_request_body_omits_absent_fields() {
        let request = CompletionRequest {
            prompt: "hi".into(),
            system_instruction: None,
            web_search: false,
        };
        let body = GeminiProvider::request_body(&request, &generation());
        assert!(body.get("systemInstruction").is_none());
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_parse_text_and_grounding() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Paris "}, {"text": "is the capital."}]},
                "groundingMetadata": {
                    "groundingChunks": [
                        {"web": {"uri": "https://a.example", "title": "A"}},
                        {"retrievedContext": {}},
                        {"web": {"title": "no uri"}}
                    ]
                }
            }]
        }"#;

        let completion = GeminiProvider::parse_response_body(body, ENDPOINT).unwrap();
        assert_eq!(completion.text, "Paris is the capital.");
        assert_eq!(completion.citations.len(), 2);
        assert_eq!(completion.citations[0], WebSource::new("https://a.example", "A"));
        assert_eq!(completion.citations[1].uri, "");
    }

    #[test]
    fn test_parse_without_grounding() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "GRAPH::x"}]}}]}"#;
        let completion = GeminiProvider::parse_response_body(body, ENDPOINT).unwrap();
        assert_eq!(completion.text, "GRAPH::x");
        assert!(completion.citations.is_empty());
    }

    #[test]
    fn test_reply_without_text_is_rejected() {
        let no_candidates = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        assert!(matches!(
            GeminiProvider::parse_response_body(no_candidates, ENDPOINT),
            Err(CompletionError::EmptyResponse)
        ));

        let no_text = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        assert!(matches!(
            GeminiProvider::parse_response_body(no_text, ENDPOINT),
            Err(CompletionError::EmptyResponse)
        ));

        let blank_parts = r#"{"candidates": [{"content": {"parts": [{"text": ""}, {"text": ""}]}}]}"#;
        assert!(matches!(
            GeminiProvider::parse_response_body(blank_parts, ENDPOINT),
            Err(CompletionError::EmptyResponse)
        ));
    }

    #[test]
    fn test_html_and_garbage_bodies() {
        let html = "<!DOCTYPE html><html><body>502 Bad Gateway</body></html>";
        match GeminiProvider::parse_response_body(html, ENDPOINT) {
            Err(CompletionError::MalformedResponse(msg)) => assert!(msg.contains("HTML")),
            other => panic!("expected malformed response, got {:?}", other.map(|c| c.text)),
        }

        assert!(matches!(
            GeminiProvider::parse_response_body("{", ENDPOINT),
            Err(CompletionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_missing_api_key() {
        let config = CompletionConfig::default();
        let missing = config.resolve_api_key_with(|_| None);
        assert!(matches!(
            GeminiProvider::with_api_key(&config, missing),
            Err(CompletionError::MissingApiKey)
        ));
        assert!(GeminiProvider::with_api_key(&config, Some("k".into())).is_ok());
    }

    #[test]
    fn test_endpoint_uses_model() {
        let config = CompletionConfig {
            api_key: "test-key".into(),
            endpoint: "https://example.test/v1beta/".into(),
            ..Default::default()
        };
        let provider = GeminiProvider::new(&config).unwrap();
        assert_eq!(
            provider.endpoint(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(provider.info().name, "Google");
    }
}
