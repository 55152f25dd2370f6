use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{Completion, LlmProvider, Message, Sampling, ToolCall, ToolSpec};
use super::groq::wire_tools;

pub struct OllamaProvider {
    url: String,
    model: String,
    sampling: Sampling,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(url: String, model: String, sampling: Sampling) -> Self {
        Self {
            url,
            model,
            sampling,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn chat(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> anyhow::Result<Completion> {
        let mut body = json!({
            "model": self.model,
            "messages": ollama_messages(system_prompt, messages),
            "stream": false,
            "options": {
                "num_predict": self.sampling.max_tokens,
                "temperature": self.sampling.temperature,
            },
        });
        if !tools.is_empty() {
            body["tools"] = wire_tools(tools);
        }

        let resp = self
            .client
            .post(format!("{}/api/chat", self.url.trim_end_matches('/')))
            .json(&body)
            .send()
            .await
            .context("failed to call Ollama API")?;

        let status = resp.status();
        let data: Value = resp
            .json()
            .await
            .context("failed to parse Ollama response")?;

        if !status.is_success() {
            anyhow::bail!("Ollama API error ({}): {}", status, data);
        }

        parse_completion(&data)
    }
}

// Ollama wants tool-call arguments as an object, not a JSON string.
fn ollama_messages(system_prompt: &str, messages: &[Message]) -> Vec<Value> {
    let mut out = vec![json!({
        "role": "system",
        "content": system_prompt,
    })];

    for msg in messages {
        let mut m = json!({
            "role": msg.role,
            "content": msg.content.as_deref().unwrap_or_default(),
        });
        if !msg.tool_calls.is_empty() {
            m["tool_calls"] = msg
                .tool_calls
                .iter()
                .map(|c| {
                    let args: Value =
                        serde_json::from_str(&c.arguments).unwrap_or_else(|_| json!({}));
                    json!({ "function": { "name": c.name, "arguments": args } })
                })
                .collect();
        }
        out.push(m);
    }
    out
}

fn parse_completion(data: &Value) -> anyhow::Result<Completion> {
    let message = &data["message"];
    if message.is_null() {
        anyhow::bail!("missing message in Ollama response");
    }

    if let Some(call) = message["tool_calls"].get(0) {
        let name = call["function"]["name"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("tool call without a function name"))?;
        let arguments = match &call["function"]["arguments"] {
            Value::Null => "{}".to_string(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        // Ollama does not id its tool calls
        return Ok(Completion::ToolCall(ToolCall {
            id: format!("call_{}", Uuid::new_v4().simple()),
            name: name.to_string(),
            arguments,
        }));
    }

    match message["content"].as_str() {
        Some(text) if !text.trim().is_empty() => Ok(Completion::Text(text.to_string())),
        _ => anyhow::bail!("missing content in Ollama response"),
    }
}
