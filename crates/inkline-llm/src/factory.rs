use crate::anthropic::AnthropicBackend;
use crate::backend::CompletionBackend;
use crate::openai_compat::OpenAiCompatBackend;
use inkline_common::config::EndpointConfig;
use inkline_common::CompletionError;
use std::process::Command;
use std::sync::Arc;

/// Resolve the API key: `api_key_cmd` (shell command printing the key)
/// wins over a direct `api_key` value.
fn resolve_api_key(config: &EndpointConfig) -> Result<String, CompletionError> {
    if let Some(cmd) = &config.api_key_cmd {
        let output = Command::new("sh")
            .arg("-c")
            .arg(cmd)
            .output()
            .map_err(|e| {
                CompletionError::ProviderUnavailable(format!("failed to execute api_key_cmd: {e}"))
            })?;

        if !output.status.success() {
            return Err(CompletionError::ProviderUnavailable(format!(
                "api_key_cmd failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let key = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if key.is_empty() {
            return Err(CompletionError::ProviderUnavailable(
                "api_key_cmd returned empty key".to_string(),
            ));
        }
        return Ok(key);
    }

    match &config.api_key {
        Some(key) if !key.is_empty() => Ok(key.clone()),
        _ => Err(CompletionError::ProviderUnavailable(
            "no api_key or api_key_cmd configured".to_string(),
        )),
    }
}

/// Create a backend from endpoint config.
pub fn create_backend(config: &EndpointConfig) -> Result<Arc<dyn CompletionBackend>, CompletionError> {
    let api_key = resolve_api_key(config)?;

    match config.backend_type.as_str() {
        "anthropic" => Ok(Arc::new(AnthropicBackend {
            api_key,
            model: config.model.clone(),
        })),
        "openai-compat" => {
            let base_url = config.base_url.clone().ok_or_else(|| {
                CompletionError::ProviderUnavailable("openai-compat requires base_url".to_string())
            })?;
            Ok(Arc::new(OpenAiCompatBackend {
                api_key,
                model: config.model.clone(),
                base_url,
            }))
        }
        other => Err(CompletionError::ProviderUnavailable(format!(
            "unknown backend type: {other}"
        ))),
    }
}

/// Seam for the coordinator: backends are created per cycle from the
/// freshly loaded config, so credential or model edits apply on the next
/// trigger.
pub trait BackendFactory: Send + Sync {
    fn create(&self, config: &EndpointConfig) -> Result<Arc<dyn CompletionBackend>, CompletionError>;
}

pub struct LlmBackendFactory;

impl BackendFactory for LlmBackendFactory {
    fn create(&self, config: &EndpointConfig) -> Result<Arc<dyn CompletionBackend>, CompletionError> {
        create_backend(config)
    }
}
