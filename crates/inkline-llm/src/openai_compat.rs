use crate::backend::{CompletionBackend, CompletionResult};
use async_trait::async_trait;
use inkline_common::{CancellationScope, CompletionError};
use inkline_prompt::{CompletionRequest, Role};

#[derive(Debug)]
pub struct OpenAiCompatBackend {
    pub model: String,
    pub api_key: String,
    pub base_url: String,
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

/// Chat-completions body. There is no prefill on this API, so a non-empty
/// inject prefix is sent as a trailing assistant turn; most compatible
/// servers continue from it.
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
        body["stop"] = serde_json::json!(req.stop_sequences);
    }
    body
}

pub fn parse_response(json: &serde_json::Value) -> Result<CompletionResult, CompletionError> {
    let text = json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| {
            CompletionError::Transport(
                "invalid response: missing choices[0].message.content".to_string(),
            )
        })?
        .to_string();
    let stop_reason = json["choices"][0]["finish_reason"]
        .as_str()
        .unwrap_or("")
        .to_string();
    Ok(CompletionResult { text, stop_reason })
}

#[async_trait]
impl CompletionBackend for OpenAiCompatBackend {
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
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
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
            tracing::debug!(status = %status, "openai-compat API error: {msg}");
            return Err(CompletionError::Transport(format!(
                "openai-compat API error ({}): {}",
                status, msg
            )));
        }

        parse_response(&json)
    }

    fn name(&self) -> &str {
        "openai_compat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkline_prompt::PromptMessage;

    fn req() -> CompletionRequest {
        CompletionRequest {
            messages: vec![PromptMessage {
                role: Role::User,
                content: "complete this".to_string(),
            }],
            inject_prefix: String::new(),
            stop_sequences: vec![],
            max_tokens: 64,
        }
    }

    #[test]
    fn test_request_body_omits_stop_when_empty() {
        let body = request_body(&req(), "gpt-4o-mini");
        assert_eq!(body["model"], "gpt-4o-mini");
        assert!(body.get("stop").is_none());
    }

    #[test]
    fn test_parse_response() {
        let json = serde_json::json!({
            "choices": [{
                "message": {"role": "assistant", "content": "y * 2"},
                "finish_reason": "stop",
            }],
        });
        let result = parse_response(&json).unwrap();
        assert_eq!(result.text, "y * 2");
        assert_eq!(result.stop_reason, "stop");
    }

    #[test]
    fn test_parse_response_missing_choices() {
        let json = serde_json::json!({"choices": []});
        assert!(parse_response(&json).is_err());
    }
}
