use crate::backend::{CompletionBackend, CompletionResult};
use async_trait::async_trait;
use inkline_common::{CancellationScope, CompletionError};
use inkline_prompt::{CompletionRequest, Role};

#[derive(Debug)]
pub struct AnthropicBackend {
    pub model: String,
    pub api_key: String,
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

/// Build the messages-API request body. The inject prefix rides as an
/// assistant prefill so the model continues from it.
pub fn request_body(req: &CompletionRequest, model: &str) -> serde_json::Value {
    let mut messages: Vec<serde_json::Value> = req
        .messages
        .iter()
        .map(|m| {
            serde_json::json!({
                "role": role_str(m.role),
                "content": m.content,
            })
        })
        .collect();
    if !req.inject_prefix.is_empty() {
        messages.push(serde_json::json!({
            "role": "assistant",
            "content": req.inject_prefix,
        }));
    }

    let mut body = serde_json::json!({
        "model": model,
        "max_tokens": req.max_tokens,
        "messages": messages,
    });
    if !req.stop_sequences.is_empty() {
        body["stop_sequences"] = serde_json::json!(req.stop_sequences);
    }
    body
}

pub fn parse_response(json: &serde_json::Value) -> Result<CompletionResult, CompletionError> {
    let text = json["content"][0]["text"]
        .as_str()
        .ok_or_else(|| {
            CompletionError::Transport("invalid response: missing content[0].text".to_string())
        })?
        .to_string();
    let stop_reason = json["stop_reason"].as_str().unwrap_or("").to_string();
    Ok(CompletionResult { text, stop_reason })
}

#[async_trait]
impl CompletionBackend for AnthropicBackend {
    async fn complete(
        &self,
        req: &CompletionRequest,
        cancel: &CancellationScope,
    ) -> Result<CompletionResult, CompletionError> {
        if cancel.is_cancelled() {
            return Err(CompletionError::Cancelled);
        }

        let client = reqwest::Client::new();
        let body = request_body(req, &self.model);

        let send = client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send();

        let resp = tokio::select! {
            _ = cancel.cancelled() => return Err(CompletionError::Cancelled),
            resp = send => resp.map_err(|e| CompletionError::Transport(e.to_string()))?,
        };

        let status = resp.status();
        let json: serde_json::Value = tokio::select! {
            _ = cancel.cancelled() => return Err(CompletionError::Cancelled),
            json = resp.json() => json.map_err(|e| CompletionError::Transport(e.to_string()))?,
        };

        if !status.is_success() {
            let msg = json["error"]["message"].as_str().unwrap_or("unknown API error");
            tracing::debug!(status = %status, "anthropic API error: {msg}");
            return Err(CompletionError::Transport(format!(
                "anthropic API error ({}): {}",
                status, msg
            )));
        }

        parse_response(&json)
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}
