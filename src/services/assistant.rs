use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::models::NluResult;
use crate::services::ai::prompt::{build_system_prompt, available_rooms_json, get_rooms_tool, GET_ROOMS_TOOL};
use crate::services::ai::{Completion, LlmProvider, Message};
use crate::services::nlu::Classifier;
use crate::services::responder::{ResponseContext, ResponseGenerator};
use crate::services::store::QueryLogSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    Rules,
    Ai,
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub nlu: NluResult,
    pub reply: String,
    pub source: ReplySource,
    pub latency_ms: i64,
}

pub struct Assistant {
    classifier: Classifier,
    responder: ResponseGenerator,
    log: Arc<dyn QueryLogSink>,
    llm: Option<Arc<dyn LlmProvider>>,
    use_ai: bool,
    llm_timeout: Duration,
}

impl Assistant {
    pub fn new(
        classifier: Classifier,
        responder: ResponseGenerator,
        log: Arc<dyn QueryLogSink>,
    ) -> Self {
        Self {
            classifier,
            responder,
            log,
            llm: None,
            use_ai: false,
            llm_timeout: Duration::from_secs(10),
        }
    }

    // Enables the model path. `use_ai` is the default when a turn does not say.
    pub fn with_llm(mut self, llm: Arc<dyn LlmProvider>, use_ai: bool, timeout: Duration) -> Self {
        self.llm = Some(llm);
        self.use_ai = use_ai;
        self.llm_timeout = timeout;
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub async fn handle_turn(&self, user_text: &str) -> String {
        self.respond(user_text, None).await.reply
    }

    pub async fn respond(&self, user_text: &str, use_ai: Option<bool>) -> TurnOutcome {
        let started = Instant::now();

        let nlu = self.classifier.classify(user_text);
        let mut ctx = ResponseContext::new(&nlu);
        if nlu.intent.needs_room_data() {
            self.responder.ensure_rooms(&mut ctx);
        }

        let ai_reply = match &self.llm {
            Some(llm) if use_ai.unwrap_or(self.use_ai) => self.ai_reply(llm.as_ref(), &mut ctx).await,
            _ => None,
        };

        let (reply, source) = match ai_reply {
            Some(reply) => (reply, ReplySource::Ai),
            None => (self.responder.generate(&mut ctx), ReplySource::Rules),
        };

        let latency_ms = started.elapsed().as_millis() as i64;
        if let Err(e) = self
            .log
            .record(user_text, nlu.intent, nlu.confidence, latency_ms)
        {
            tracing::warn!(error = %e, "failed to record query log");
        }

        tracing::info!(
            intent = nlu.intent.as_str(),
            confidence = nlu.confidence,
            source = ?source,
            latency_ms,
            "turn answered"
        );

        TurnOutcome {
            nlu,
            reply,
            source,
            latency_ms,
        }
    }

    // `None` means "use the rules": any error, timeout or odd reply lands here.
    async fn ai_reply(&self, llm: &dyn LlmProvider, ctx: &mut ResponseContext) -> Option<String> {
        match tokio::time::timeout(self.llm_timeout, self.ai_exchange(llm, ctx)).await {
            Ok(Ok(reply)) => Some(reply),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "model reply unusable, falling back to rules");
                None
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.llm_timeout.as_secs(),
                    "model timed out, falling back to rules"
                );
                None
            }
        }
    }

    async fn ai_exchange(
        &self,
        llm: &dyn LlmProvider,
        ctx: &mut ResponseContext,
    ) -> anyhow::Result<String> {
        let rules = self.responder.rules();
        let system_prompt =
            build_system_prompt(rules, ctx.intent, &ctx.entities, ctx.room_data.as_deref());
        let tools = [get_rooms_tool(rules)];
        let mut messages = vec![Message::user(ctx.user_query.clone())];

        let call = match llm.chat(&system_prompt, &messages, &tools).await? {
            Completion::Text(text) => return non_empty(text),
            Completion::ToolCall(call) => call,
        };
        anyhow::ensure!(
            call.name == GET_ROOMS_TOOL,
            "model requested unknown tool {:?}",
            call.name
        );

        self.responder.ensure_rooms(ctx);
        let rooms_result = available_rooms_json(ctx.room_data.as_deref().unwrap_or_default());

        let call_id = call.id.clone();
        messages.push(Message::assistant_tool_call(call));
        messages.push(Message::tool_result(call_id, rooms_result));

        match llm.chat(&system_prompt, &messages, &[]).await? {
            Completion::Text(text) => non_empty(text),
            Completion::ToolCall(call) => {
                anyhow::bail!("model asked for {:?} after the tool result", call.name)
            }
        }
    }
}

fn non_empty(text: String) -> anyhow::Result<String> {
    anyhow::ensure!(!text.trim().is_empty(), "model returned an empty reply");
    Ok(text)
}
