use std::time::Duration;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::mpsc;

use crate::core::{AppConfig, RelayError};

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

/// A single entry of the transcript in the shape the chat completion
/// API expects.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: Some(content.to_string()),
        }
    }
}

/// A session with the completion provider: the credential plus the
/// configured transport. Cloning is cheap and shares the underlying
/// connection pool.
#[derive(Clone)]
pub struct Provider {
    client: reqwest::Client,
    api_hostname: String,
    api_key: String,
    model: String,
}

impl Provider {
    pub fn new(api_key: &str, config: &AppConfig) -> Result<Self, RelayError> {
        let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(60 * 10));

        builder = match &config.proxy_url {
            Some(proxy_url) => {
                let proxy = reqwest::Proxy::all(proxy_url).map_err(RelayError::ClientBuild)?;
                builder.proxy(proxy)
            }
            // Ignore any system proxy settings too
            None => builder.no_proxy(),
        };

        let client = builder.build().map_err(RelayError::ClientBuild)?;

        Ok(Self {
            client,
            api_hostname: config.openai_api_hostname.clone(),
            api_key: api_key.to_string(),
            model: config.openai_model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Opens a streamed chat completion using `messages` as the
    /// context. Fails without consuming anything if the provider
    /// can't be reached or rejects the request.
    pub async fn completion_stream(
        &self,
        messages: &[Message],
    ) -> Result<CompletionStream, RelayError> {
        let payload = json!({
            "model": self.model,
            "messages": messages,
            "stream": true,
        });
        let url = format!(
            "{}/v1/chat/completions",
            self.api_hostname.trim_end_matches("/")
        );
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::UpstreamStatus { status, body });
        }

        Ok(CompletionStream { response })
    }
}

#[derive(Debug, Deserialize)]
struct Delta {
    role: Option<Role>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionChunkChoice {
    delta: Delta,
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<CompletionChunkChoice>,
    // Sent instead of `choices` when the provider fails after the
    // stream has started
    error: Option<Value>,
}

/// Accumulates the deltas of a stream into the final message
struct Reply {
    role: Role,
    content: Option<String>,
    fragments: usize,
}

impl Reply {
    fn new() -> Self {
        Self {
            role: Role::Assistant,
            content: None,
            fragments: 0,
        }
    }

    /// Handles a single SSE event. Returns `true` once the provider
    /// signals the end of the stream.
    fn handle_event(
        &mut self,
        event: &str,
        tx: &mpsc::UnboundedSender<String>,
    ) -> Result<bool, RelayError> {
        let data = event
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\n");

        // Comments, keep-alives and other event fields
        if data.is_empty() {
            return Ok(false);
        }

        if data == "[DONE]" {
            return Ok(true);
        }

        let chunk = serde_json::from_str::<CompletionChunk>(&data).inspect_err(|e| {
            tracing::error!("Parsing completion chunk failed for {}\nError:{}", data, e)
        })?;

        if let Some(error) = chunk.error {
            let message = error["message"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(RelayError::UpstreamEvent(message));
        }

        let Some(choice) = chunk.choices.into_iter().next() else {
            return Ok(false);
        };

        if let Some(role) = choice.delta.role {
            self.role = role;
        }

        if let Some(fragment) = choice.delta.content.filter(|c| !c.is_empty()) {
            tracing::trace!("{}", fragment);
            self.content
                .get_or_insert_with(String::new)
                .push_str(&fragment);
            self.fragments += 1;
            // The caller may have gone away. Keep consuming so the
            // reply can still be recorded.
            let _ = tx.send(fragment);
        }

        Ok(false)
    }

    fn finish(self) -> Message {
        tracing::debug!("Completion finished after {} fragments", self.fragments);
        Message {
            role: self.role,
            content: self.content,
        }
    }
}

/// Splits a byte stream into SSE events. Lines may end in `\r\n`,
/// `\n` or `\r`; they are stored as `\n` so an event always ends at
/// the first blank line.
#[derive(Default)]
struct EventBuffer {
    bytes: Vec<u8>,
    // A `\r` ended the last chunk and a `\n` may still follow it
    after_cr: bool,
}

impl EventBuffer {
    fn push(&mut self, chunk: &[u8]) {
        for &b in chunk {
            match b {
                b'\r' => {
                    self.bytes.push(b'\n');
                    self.after_cr = true;
                }
                b'\n' if self.after_cr => self.after_cr = false,
                _ => {
                    self.bytes.push(b);
                    self.after_cr = false;
                }
            }
        }
    }

    /// The next complete event, without its trailing blank line
    fn next_event(&mut self) -> Option<String> {
        let end = self.bytes.windows(2).position(|w| w == b"\n\n")?;
        let event = self.bytes.drain(..end + 2).collect::<Vec<u8>>();
        Some(String::from_utf8_lossy(&event[..end]).to_string())
    }

    /// Whatever is left once the stream has ended
    fn remainder(self) -> Option<String> {
        if self.bytes.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.bytes).to_string())
        }
    }
}

/// An open completion stream that hasn't been consumed yet
pub struct CompletionStream {
    response: reqwest::Response,
}

impl CompletionStream {
    /// Forwards every content fragment to `tx` in the order they
    /// arrive and returns the finalized assistant message once the
    /// provider is done.
    pub async fn relay(self, tx: mpsc::UnboundedSender<String>) -> Result<Message, RelayError> {
        let mut stream = self.response.bytes_stream();
        let mut reply = Reply::new();
        let mut buffer = EventBuffer::default();

        // Events can be split across network frames (and multi-byte
        // characters across chunks) so only complete events are
        // decoded.
        while let Some(chunk) = stream.next().await {
            buffer.push(&chunk?);

            while let Some(event) = buffer.next_event() {
                if reply.handle_event(&event, &tx)? {
                    return Ok(reply.finish());
                }
            }
        }

        // Trailing event without the final blank line
        if let Some(event) = buffer.remainder() {
            reply.handle_event(&event, &tx)?;
        }

        Ok(reply.finish())
    }
}
