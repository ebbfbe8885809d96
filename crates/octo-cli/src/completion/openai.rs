//! OpenAI-compatible streaming completion client: opens a
//! `stream:true` chat-completions request over `reqwest` and translates
//! server-sent-event chunks into [`StreamEvent`]s.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::StreamExt;
use octo_loop::CompletionClient;
use octo_loop::CompletionRequest;
use octo_loop::LoopError;
use octo_loop::StreamEvent;
use octo_providers::OpenAiRequestOptions;
use serde_json::Value;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct OpenAiClient {
    pub http: reqwest::Client,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

#[async_trait]
impl CompletionClient for OpenAiClient {
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
                    "type": "function",
                    "function": {
                        "name": name,
                        "description": "",
                        "parameters": schema,
                    }
                })
            })
            .collect();

        let options = OpenAiRequestOptions {
            reasoning_effort: request.reasoning_effort,
            ..OpenAiRequestOptions::default()
        };

        let mut body = json!({
            "model": self.model,
            "messages": request.messages,
            "stream": options.stream,
            "stream_options": {"include_usage": options.stream_options_include_usage},
            "parallel_tool_calls": options.parallel_tool_calls,
        });
        if !tools.is_empty() {
            body["tools"] = Value::Array(tools);
        }
        if let Some(effort) = options.reasoning_effort {
            body["reasoning_effort"] = json!(effort);
        }

        let curl_repro = || crate::curl::CurlRequest {
            method: "POST",
            url: self.base_url.clone(),
            headers: vec![
                ("Authorization".to_string(), format!("Bearer {}", self.api_key)),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body: body.to_string(),
        }
        .to_curl();

        let response = self
            .http
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
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

/// Per-tool-call-index accumulation; OpenAI streams tool calls by array
/// index rather than by id, so the first chunk for an index carries the id
/// and name and later ones carry only `arguments` fragments.
async fn pump(response: reqwest::Response, tx: mpsc::Sender<StreamEvent>, abort: CancellationToken) {
    let mut byte_stream = response.bytes_stream();
    let mut buffer = String::new();
    let mut seen_ids: HashMap<u64, String> = HashMap::new();

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
            let line = buffer[..pos].to_string();
            buffer.drain(..pos + 2);
            let Some(data) = line.strip_prefix("data: ").or_else(|| line.strip_prefix("data:")) else {
                continue;
            };
            if data.trim() == "[DONE]" {
                let _ = tx.send(StreamEvent::Done).await;
                return;
            }
            let Ok(event) = serde_json::from_str::<Value>(data) else {
                continue;
            };
            if !emit_events(&event, &tx, &mut seen_ids).await {
                return;
            }
        }
    }
    let _ = tx.send(StreamEvent::Done).await;
}

async fn emit_events(event: &Value, tx: &mpsc::Sender<StreamEvent>, seen_ids: &mut HashMap<u64, String>) -> bool {
    let Some(choice) = event.get("choices").and_then(|c| c.get(0)) else {
        if let Some(usage) = event.get("usage") {
            let input_tokens = usage.get("prompt_tokens").and_then(|v| v.as_i64()).unwrap_or(0);
            let output_tokens = usage.get("completion_tokens").and_then(|v| v.as_i64()).unwrap_or(0);
            return tx
                .send(StreamEvent::Usage {
                    input_tokens,
                    output_tokens,
                })
                .await
                .is_ok();
        }
        return true;
    };
    let Some(delta) = choice.get("delta") else { return true };

    if let Some(content) = delta.get("content").and_then(|v| v.as_str()) {
        if tx.send(StreamEvent::ContentDelta(content.to_string())).await.is_err() {
            return false;
        }
    }
    if let Some(calls) = delta.get("tool_calls").and_then(|v| v.as_array()) {
        for call in calls {
            let index = call.get("index").and_then(|v| v.as_u64()).unwrap_or(0);
            let id = call.get("id").and_then(|v| v.as_str()).map(|s| s.to_string());
            if let Some(id) = &id {
                seen_ids.insert(index, id.clone());
            }
            let name = call
                .get("function")
                .and_then(|f| f.get("name"))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());
            let arguments_fragment = call
                .get("function")
                .and_then(|f| f.get("arguments"))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());
            let ok = tx
                .send(StreamEvent::ToolCallDelta {
                    id: id.or_else(|| seen_ids.get(&index).cloned()),
                    name,
                    arguments_fragment,
                })
                .await
                .is_ok();
            if !ok {
                return false;
            }
        }
    }
    if let Some(usage) = event.get("usage") {
        let input_tokens = usage.get("prompt_tokens").and_then(|v| v.as_i64()).unwrap_or(0);
        let output_tokens = usage.get("completion_tokens").and_then(|v| v.as_i64()).unwrap_or(0);
        if tx
            .send(StreamEvent::Usage {
                input_tokens,
                output_tokens,
            })
            .await
            .is_err()
        {
            return false;
        }
    }
    true
}
