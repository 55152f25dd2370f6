use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Completion, LlmProvider, Message, Sampling, ToolCall, ToolSpec};

const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

pub struct GroqProvider {
    api_key: String,
    model: String,
    sampling: Sampling,
    client: reqwest::Client,
}

impl GroqProvider {
    pub fn new(api_key: String, model: String, sampling: Sampling) -> Self {
        Self {
            api_key,
            model,
            sampling,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    async fn chat(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> anyhow::Result<Completion> {
        let mut body = json!({
            "model": self.model,
            "messages": wire_messages(system_prompt, messages),
            "max_tokens": self.sampling.max_tokens,
            "temperature": self.sampling.temperature,
        });
        if !tools.is_empty() {
            body["tools"] = wire_tools(tools);
            body["tool_choice"] = json!("auto");
        }

        let resp = self
            .client
            .post(GROQ_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("failed to call Groq API")?;

        let status = resp.status();
        let data: Value = resp
            .json()
            .await
            .context("failed to parse Groq response")?;

        if !status.is_success() {
            anyhow::bail!("Groq API error ({}): {}", status, data);
        }

        parse_completion(&data)
    }
}

// OpenAI chat format. Assistant tool calls carry their arguments as a string.
pub(crate) fn wire_messages(system_prompt: &str, messages: &[Message]) -> Vec<Value> {
    let mut out = vec![json!({
        "role": "system",
        "content": system_prompt,
    })];

    for msg in messages {
        let mut m = json!({
            "role": msg.role,
            "content": msg.content,
        });
        if let Some(id) = &msg.tool_call_id {
            m["tool_call_id"] = json!(id);
        }
        if !msg.tool_calls.is_empty() {
            m["tool_calls"] = msg
                .tool_calls
                .iter()
                .map(|c| {
                    json!({
                        "id": c.id,
                        "type": "function",
                        "function": { "name": c.name, "arguments": c.arguments },
                    })
                })
                .collect();
        }
        out.push(m);
    }
    out
}

pub(crate) fn wire_tools(tools: &[ToolSpec]) -> Value {
    tools
        .iter()
        .map(|t| {
            json!({
                "type": "function",
                "function": {
                    "name": t.name,
                    "description": t.description,
                    "parameters": t.parameters,
                },
            })
        })
        .collect()
}

// First tool call wins over text; empty text is an error.
fn parse_completion(data: &Value) -> anyhow::Result<Completion> {
    let message = &data["choices"][0]["message"];
    if message.is_null() {
        anyhow::bail!("missing message in Groq response");
    }

    if let Some(call) = message["tool_calls"].get(0) {
        let name = call["function"]["name"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("tool call without a function name"))?;
        return Ok(Completion::ToolCall(ToolCall {
            id: call["id"].as_str().unwrap_or_default().to_string(),
            name: name.to_string(),
            arguments: call["function"]["arguments"]
                .as_str()
                .unwrap_or("{}")
                .to_string(),
        }));
    }

    match message["content"].as_str() {
        Some(text) if !text.trim().is_empty() => Ok(Completion::Text(text.to_string())),
        _ => anyhow::bail!("missing content in Groq response"),
    }
}
