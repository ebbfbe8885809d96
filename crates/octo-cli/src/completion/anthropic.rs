//! Anthropic-compatible streaming completion client: opens a messages-API
//! SSE stream and translates `content_block_delta`/`message_delta` events
//! into [`StreamEvent`]s.

use async_trait::async_trait;
use futures::StreamExt;
use octo_loop::CompletionClient;
use octo_loop::CompletionRequest;
use octo_loop::LoopError;
use octo_loop::StreamEvent;
use octo_providers::AnthropicRequestOptions;
use octo_providers::ReasoningEffort;
use serde_json::Value;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct AnthropicClient {
    pub http: reqwest::Client,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    async fn stream(
        &self,
        request: CompletionRequest,
        abort: CancellationToken,
    ) -> Result<mpsc::Receiver<StreamEvent>, LoopError> {
        let tools: Vec<Value> = request
            .tools
            .iter()
            .map(|(name, schema)| {
                json!({
                    "name": name,
                    "description": "",
                    "input_schema": schema,
                })
            })
            .collect();

        let effort = request.reasoning_effort.unwrap_or(ReasoningEffort::Low);
        let options = AnthropicRequestOptions::new(effort, request.context_window_tokens);

        let mut body = json!({
            "model": self.model,
            "system": request.system_prompt,
            "messages": request.messages,
            "max_tokens": options.max_tokens,
            "stream": true,
            "tool_choice": {"type": "auto", "disable_parallel_tool_use": options.disable_parallel_tool_use},
        });
        if !tools.is_empty() {
            body["tools"] = Value::Array(tools);
        }
        if request.reasoning_effort.is_some() {
            body["thinking"] = json!({"type": "enabled", "budget_tokens": options.thinking_budget_tokens});
        }

        let curl_repro = || crate::curl::CurlRequest {
            method: "POST",
            url: self.base_url.clone(),
            headers: vec![
                ("x-api-key".to_string(), self.api_key.clone()),
                ("anthropic-version".to_string(), "2023-06-01".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body: body.to_string(),
        }
        .to_curl();

        let response = self
            .http
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
            .map_err(|e| LoopError::Stream {
                message: format!("{e}\nreproduce with:\n{}", curl_repro()),
            })?;

        let response = response.error_for_status().map_err(|e| LoopError::Stream {
            message: format!("{e}\nreproduce with:\n{}", curl_repro()),
        })?;

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(pump(response, tx, abort));
        Ok(rx)
    }
}

async fn pump(response: reqwest::Response, tx: mpsc::Sender<StreamEvent>, abort: CancellationToken) {
    let mut byte_stream = response.bytes_stream();
    let mut buffer = String::new();
    let mut current_tool_id: Option<String> = None;
    let mut current_tool_name: Option<String> = None;
    let mut current_thinking = String::new();

    loop {
        let chunk = tokio::select! {
            biased;
            _ = abort.cancelled() => break,
            chunk = byte_stream.next() => chunk,
        };
        let Some(chunk) = chunk else { break };
        let Ok(chunk) = chunk else { break };
        buffer.push_str(&String::from_utf8_lossy(&chunk));

        while let Some(pos) = buffer.find("\n\n") {
            let block = buffer[..pos].to_string();
            buffer.drain(..pos + 2);
            let Some(data) = block.lines().find_map(|l| l.strip_prefix("data: ")) else {
                continue;
            };
            let Ok(event) = serde_json::from_str::<Value>(data) else { continue };
            let keep_going = handle_event(
                &event,
                &tx,
                &mut current_tool_id,
                &mut current_tool_name,
                &mut current_thinking,
            )
            .await;
            if !keep_going {
                return;
            }
        }
    }
    let _ = tx.send(StreamEvent::Done).await;
}

async fn handle_event(
    event: &Value,
    tx: &mpsc::Sender<StreamEvent>,
    current_tool_id: &mut Option<String>,
    current_tool_name: &mut Option<String>,
    current_thinking: &mut String,
) -> bool {
    let send = |ev: StreamEvent| {
        let tx = tx.clone();
        async move { tx.send(ev).await.is_ok() }
    };

    match event.get("type").and_then(|v| v.as_str()) {
        Some("content_block_start") => {
            if let Some(block) = event.get("content_block") {
                if block.get("type").and_then(|v| v.as_str()) == Some("tool_use") {
                    *current_tool_id = block.get("id").and_then(|v| v.as_str()).map(|s| s.to_string());
                    *current_tool_name = block.get("name").and_then(|v| v.as_str()).map(|s| s.to_string());
                    return send(StreamEvent::ToolCallDelta {
                        id: current_tool_id.clone(),
                        name: current_tool_name.take(),
                        arguments_fragment: None,
                    })
                    .await;
                }
            }
            true
        }
        Some("content_block_delta") => {
            let Some(delta) = event.get("delta") else { return true };
            match delta.get("type").and_then(|v| v.as_str()) {
                Some("text_delta") => {
                    let text = delta.get("text").and_then(|v| v.as_str()).unwrap_or_default();
                    send(StreamEvent::ContentDelta(text.to_string())).await
                }
                Some("thinking_delta") => {
                    let text = delta.get("thinking").and_then(|v| v.as_str()).unwrap_or_default();
                    current_thinking.push_str(text);
                    send(StreamEvent::ReasoningDelta(text.to_string())).await
                }
                Some("signature_delta") => {
                    let signature = delta.get("signature").and_then(|v| v.as_str()).unwrap_or_default();
                    let extras = json!({"thinking": current_thinking.clone(), "signature": signature});
                    send(StreamEvent::ProviderExtras(extras)).await
                }
                Some("input_json_delta") => {
                    let partial = delta.get("partial_json").and_then(|v| v.as_str()).unwrap_or_default();
                    send(StreamEvent::ToolCallDelta {
                        id: current_tool_id.clone(),
                        name: None,
                        arguments_fragment: Some(partial.to_string()),
                    })
                    .await
                }
                _ => true,
            }
        }
        Some("message_delta") => {
            let Some(usage) = event.get("usage") else { return true };
            let input_tokens = usage.get("input_tokens").and_then(|v| v.as_i64()).unwrap_or(0);
            let output_tokens = usage.get("output_tokens").and_then(|v| v.as_i64()).unwrap_or(0);
            send(StreamEvent::Usage {
                input_tokens,
                output_tokens,
            })
            .await
        }
        Some("message_stop") => {
            let _ = tx.send(StreamEvent::Done).await;
            false
        }
        _ => true,
    }
}
