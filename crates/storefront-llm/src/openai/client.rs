// OpenAI-specific client implementation

use crate::streaming::{parse_chat_sse_stream, EventStream};
use crate::traits::{ChatClient, ChatRequest};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{Map, Value};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI client (HTTP direct, no SDK)
pub struct OpenAIClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenAIClient {
    /// Create new client with API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key format")?,
        );
        
        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;
        
        Ok(Self {
            http_client,
            base_url: OPENAI_API_BASE.to_string(),
        })
    }
    
    /// Point the client at an OpenAI-compatible endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
    
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
    
    /// Build the streaming chat completion payload
    fn build_chat_request(&self, request: &ChatRequest) -> Value {
        let mut obj = Map::new();
        obj.insert("model".to_string(), Value::from(request.model.as_str()));
        obj.insert("messages".to_string(), serde_json::json!(request.messages));
        obj.insert("stream".to_string(), Value::Bool(true));
        
        let options = &request.options;
        if let Some(temp) = options.temperature {
            obj.insert("temperature".to_string(), serde_json::json!(temp));
        }
        if let Some(ref user) = options.user {
            obj.insert("user".to_string(), serde_json::json!(user));
        }
        
        Value::Object(obj)
    }
    
    async fn post_completion(&self, payload: &Value) -> Result<reqwest::Response> {
        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .json(payload)
            .send()
            .await
            .context("Failed to send request")?;
        
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "OpenAI API returned an error");
            anyhow::bail!("OpenAI API error ({}): {}", status, error_text);
        }
        
        Ok(response)
    }
}

#[async_trait]
impl ChatClient for OpenAIClient {
    async fn chat_stream(&self, request: ChatRequest) -> Result<EventStream> {
        let payload = self.build_chat_request(&request);
        let response = self.post_completion(&payload).await?;
        Ok(parse_chat_sse_stream(response))
    }
}
