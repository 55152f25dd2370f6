use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Entity, Intent};
use crate::services::assistant::{ReplySource, TurnOutcome};
use crate::state::AppState;

const UNCLEAR_AUDIO: &str = "Could not understand audio. Please speak clearly.";

// POST /api/chat
#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub use_ai: Option<bool>,
    #[serde(default)]
    pub speak: bool,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub intent: Intent,
    pub confidence: f32,
    pub entities: Vec<Entity>,
    pub source: ReplySource,
    pub latency_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_base64: Option<String>,
}

impl ChatResponse {
    fn from_outcome(outcome: TurnOutcome, audio: Option<Vec<u8>>) -> Self {
        Self {
            reply: outcome.reply,
            intent: outcome.nlu.intent,
            confidence: outcome.nlu.confidence,
            entities: outcome.nlu.entities,
            source: outcome.source,
            latency_ms: outcome.latency_ms,
            audio_base64: audio.map(|a| base64::engine::general_purpose::STANDARD.encode(a)),
        }
    }
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if payload.message.trim().is_empty() {
        return Err(AppError::BadRequest("message must not be empty".to_string()));
    }

    let outcome = state
        .assistant
        .respond(&payload.message, payload.use_ai)
        .await;

    let audio = if payload.speak {
        state.voice.speak(&outcome.reply).await
    } else {
        None
    };

    Ok(Json(ChatResponse::from_outcome(outcome, audio)))
}

// POST /api/voice
#[derive(Deserialize)]
pub struct VoiceParamsQuery {
    pub use_ai: Option<bool>,
    pub speak: Option<bool>,
}

#[derive(Serialize)]
pub struct VoiceResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub chat: Option<ChatResponse>,
}

impl VoiceResponse {
    fn unclear() -> Self {
        Self {
            success: false,
            transcript: None,
            message: Some(UNCLEAR_AUDIO.to_string()),
            chat: None,
        }
    }
}

pub async fn voice(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VoiceParamsQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<VoiceResponse>, AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("audio body must not be empty".to_string()));
    }

    let mime = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("audio/webm");

    let transcript = match state.voice.transcribe(&body, mime).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            tracing::info!(bytes = body.len(), "transcription was empty");
            return Ok(Json(VoiceResponse::unclear()));
        }
        Err(e) => {
            tracing::warn!(error = %e, bytes = body.len(), "transcription failed");
            return Ok(Json(VoiceResponse::unclear()));
        }
    };

    let outcome = state.assistant.respond(&transcript, params.use_ai).await;
    let audio = if params.speak.unwrap_or(true) {
        state.voice.speak(&outcome.reply).await
    } else {
        None
    };

    Ok(Json(VoiceResponse {
        success: true,
        transcript: Some(transcript),
        message: None,
        chat: Some(ChatResponse::from_outcome(outcome, audio)),
    }))
}

// POST /api/analyze
#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub intent: Intent,
    pub intent_confidence: f32,
    pub entities: Vec<Entity>,
    pub original_text: String,
    pub description: &'static str,
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnalyzeRequest>,
) -> Json<AnalyzeResponse> {
    let nlu = state.assistant.classifier().classify(&payload.text);
    Json(AnalyzeResponse {
        description: nlu.intent.description(),
        intent: nlu.intent,
        intent_confidence: nlu.confidence,
        entities: nlu.entities,
        original_text: nlu.original_text,
    })
}
