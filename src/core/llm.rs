use crate::config::Settings;
use crate::core::response::extract_text;
use crate::core::TextGenerator;
use crate::error::{ConciergeError, ConciergeResult};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    JsonObject,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

/// Client for an OpenAI-compatible chat-completions endpoint.
///
/// Replies are decoded as raw JSON and handed to [`extract_text`], so
/// gateways that return slightly different shapes still work.
#[derive(Clone)]
pub struct LLMClient {
    client: Client,
    api_key: Option<String>,
    settings: Settings,
}

impl LLMClient {
    pub fn new(api_key: Option<String>, settings: Settings) -> Self {
        Self {
            client: Client::new(),
            api_key,
            settings,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.llm.base_url.trim_end_matches('/')
        )
    }

    fn request(
        &self,
        messages: Vec<ChatMessage>,
        stream: bool,
        response_format: Option<ResponseFormat>,
    ) -> ChatRequest {
        ChatRequest {
            model: self.settings.llm.model.clone(),
            messages,
            max_tokens: self.settings.llm.max_tokens,
            temperature: self.settings.llm.temperature,
            stream,
            response_format,
        }
    }

    async fn send(&self, request: &ChatRequest) -> ConciergeResult<reqwest::Response> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ConciergeError::Config("OPENAI_API_KEY is not set".to_string()))?;

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                "[LLMClient] API returned error status {}: {}",
                status,
                error_text
            );
            return Err(ConciergeError::Llm(format!(
                "API error {}: {}",
                status, error_text
            )));
        }

        Ok(response)
    }

    pub async fn chat(&self, messages: Vec<ChatMessage>) -> ConciergeResult<String> {
        self.chat_with_format(messages, None).await
    }

    pub async fn chat_with_format(
        &self,
        messages: Vec<ChatMessage>,
        response_format: Option<ResponseFormat>,
    ) -> ConciergeResult<String> {
        let request = self.request(messages, false, response_format);
        let response = self.send(&request).await?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| ConciergeError::Parse(format!("Response decode error: {}", e)))?;

        extract_text(&body)
            .ok_or_else(|| ConciergeError::Parse("Model reply contained no text".to_string()))
    }

    /// Start a streaming completion. The HTTP exchange is opened before
    /// returning so connection and status failures surface as errors here.
    pub async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
    ) -> ConciergeResult<mpsc::Receiver<String>> {
        let request = self.request(messages, true, None);
        let response = self.send(&request).await?;

        let (tx, rx) = mpsc::channel(self.settings.system.channel_buffer_size.max(1));
        tokio::spawn(forward_sse(response, tx));
        Ok(rx)
    }
}

/// Read `data:` lines from a server-sent event body and forward each text delta.
async fn forward_sse(response: reqwest::Response, tx: mpsc::Sender<String>) {
    let mut stream = response.bytes_stream();
    let mut lines = SseLines::default();

    while let Some(chunk) = stream.next().await {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("[LLMClient] Stream error: {}", e);
                return;
            }
        };

        for line in lines.push(&bytes) {
            match parse_sse_line(line.trim()) {
                SseLine::Done => return,
                SseLine::Text(text) => {
                    if tx.send(text).await.is_err() {
                        return;
                    }
                }
                SseLine::Skip => {}
            }
        }
    }

    if let Some(line) = lines.finish() {
        if let SseLine::Text(text) = parse_sse_line(line.trim()) {
            let _ = tx.send(text).await;
        }
    }
}

/// Splits a byte stream into lines. Bytes are only decoded once a full
/// line is buffered, so a UTF-8 character split across network chunks
/// survives intact.
#[derive(Debug, Default)]
struct SseLines {
    buffer: Vec<u8>,
}

impl SseLines {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if let Some(line) = decode_line(line) {
                lines.push(line);
            }
        }
        lines
    }

    fn finish(self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        decode_line(self.buffer)
    }
}

fn decode_line(line: Vec<u8>) -> Option<String> {
    match String::from_utf8(line) {
        Ok(line) => Some(line),
        Err(e) => {
            tracing::warn!("[LLMClient] Dropping stream line that is not UTF-8: {}", e);
            None
        }
    }
}

#[derive(Debug, PartialEq)]
enum SseLine {
    Text(String),
    Done,
    Skip,
}

fn parse_sse_line(line: &str) -> SseLine {
    let Some(payload) = line.strip_prefix("data:") else {
        return SseLine::Skip;
    };
    let payload = payload.trim();

    if payload == "[DONE]" {
        return SseLine::Done;
    }

    match serde_json::from_str::<Value>(payload) {
        Ok(chunk) => extract_text(&chunk).map_or(SseLine::Skip, SseLine::Text),
        Err(e) => {
            tracing::debug!("[LLMClient] Ignoring undecodable stream line: {}", e);
            SseLine::Skip
        }
    }
}

#[async_trait]
impl TextGenerator for LLMClient {
    async fn generate(&self, prompt: &str) -> ConciergeResult<String> {
        self.chat(vec![ChatMessage::user(prompt)]).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> ConciergeResult<String> {
        self.chat(vec![ChatMessage::system(system), ChatMessage::user(prompt)])
            .await
    }

    async fn generate_json(&self, system: &str, prompt: &str) -> ConciergeResult<String> {
        self.chat_with_format(
            vec![ChatMessage::system(system), ChatMessage::user(prompt)],
            Some(ResponseFormat::JsonObject),
        )
        .await
    }

    async fn generate_stream(&self, prompt: &str) -> ConciergeResult<mpsc::Receiver<String>> {
        self.stream_chat(vec![ChatMessage::user(prompt)]).await
    }
}
