use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use roomdesk::config::{AppConfig, BusinessRules, SpeechConfig};
use roomdesk::db;
use roomdesk::handlers;
use roomdesk::models::Intent;
use roomdesk::services::ai::{Completion, LlmProvider, Message, ToolCall, ToolSpec};
use roomdesk::services::assistant::{Assistant, ReplySource};
use roomdesk::services::nlu::Classifier;
use roomdesk::services::responder::{ResponseContext, ResponseGenerator};
use roomdesk::services::speech::{SpeechToText, TextToSpeech, VoiceParams};
use roomdesk::services::store::SqliteStore;
use roomdesk::services::voice::Voice;
use roomdesk::state::AppState;

// ── Mock Providers ──

enum MockLlm {
    Failing,
    Text(&'static str),
    ToolThenText(&'static str),
    Hanging,
}

#[async_trait]
impl LlmProvider for MockLlm {
    async fn chat(
        &self,
        _system_prompt: &str,
        messages: &[Message],
        _tools: &[ToolSpec],
    ) -> anyhow::Result<Completion> {
        match self {
            MockLlm::Failing => anyhow::bail!("connection refused"),
            MockLlm::Text(text) => Ok(Completion::Text(text.to_string())),
            MockLlm::ToolThenText(text) => {
                if messages.iter().any(|m| m.role == "tool") {
                    Ok(Completion::Text(text.to_string()))
                } else {
                    Ok(Completion::ToolCall(ToolCall {
                        id: "call_1".to_string(),
                        name: "get_rooms".to_string(),
                        arguments: "{}".to_string(),
                    }))
                }
            }
            MockLlm::Hanging => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(Completion::Text("too late".to_string()))
            }
        }
    }
}

struct MockStt(Option<&'static str>);

#[async_trait]
impl SpeechToText for MockStt {
    async fn transcribe(&self, _audio: &[u8], _mime: &str) -> anyhow::Result<String> {
        self.0
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("recognition service unavailable"))
    }
}

struct StalledStt;

#[async_trait]
impl SpeechToText for StalledStt {
    async fn transcribe(&self, _audio: &[u8], _mime: &str) -> anyhow::Result<String> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok("what rooms do you have".to_string())
    }
}

struct MockTts;

#[async_trait]
impl TextToSpeech for MockTts {
    async fn synthesize(&self, _text: &str, _voice: &VoiceParams) -> anyhow::Result<Vec<u8>> {
        Ok(b"ID3mock".to_vec())
    }
}

// ── Helpers ──

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        database_url: ":memory:".to_string(),
        llm_provider: "none".to_string(),
        groq_api_key: "".to_string(),
        groq_model: "test-model".to_string(),
        ollama_url: "http://localhost:11434".to_string(),
        ollama_model: "llama3.2".to_string(),
        use_ai: false,
        llm_timeout_secs: 1,
        llm_max_tokens: 200,
        llm_temperature: 0.7,
        min_confidence: 0.5,
        business: BusinessRules::default(),
        speech: SpeechConfig {
            api_url: "http://localhost:9".to_string(),
            api_key: "".to_string(),
            stt_model: "whisper-large-v3".to_string(),
            tts_model: "playai-tts".to_string(),
            language: "en".to_string(),
            tts_enabled: true,
            tts_preset: "female_professional".to_string(),
            stt_timeout_secs: 1,
            tts_timeout_secs: 1,
        },
    }
}

fn test_store() -> SqliteStore {
    SqliteStore::new(Arc::new(Mutex::new(db::init_db(":memory:").unwrap())))
}

fn build_assistant(store: &SqliteStore, llm: Option<MockLlm>) -> Assistant {
    let responder = ResponseGenerator::new(
        BusinessRules::default(),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
    );
    let assistant = Assistant::new(Classifier::new(), responder, Arc::new(store.clone()));
    match llm {
        Some(llm) => assistant.with_llm(Arc::new(llm), true, Duration::from_millis(200)),
        None => assistant,
    }
}

fn test_state_with(
    store: SqliteStore,
    llm: Option<MockLlm>,
    stt: impl SpeechToText + 'static,
) -> Arc<AppState> {
    let config = test_config();
    let voice = Voice::new(
        Arc::new(stt),
        Arc::new(MockTts),
        VoiceParams::preset(&config.speech.tts_preset),
        config.speech.tts_enabled,
        Duration::from_millis(200),
        Duration::from_secs(1),
    );
    Arc::new(AppState {
        assistant: build_assistant(&store, llm),
        config,
        store,
        voice,
    })
}

fn test_state() -> Arc<AppState> {
    test_state_with(test_store(), None, MockStt(Some("what rooms do you have")))
}

fn test_app(state: Arc<AppState>) -> Router {
    handlers::router(state)
}

fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// Rule-based reply for `text`, computed independently of the assistant.
fn rules_reply(store: &SqliteStore, text: &str) -> String {
    let generator = ResponseGenerator::new(
        BusinessRules::default(),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
    );
    let nlu = Classifier::new().classify(text);
    generator.generate(&mut ResponseContext::new(&nlu))
}

// ── Orchestration ──

#[tokio::test]
async fn test_ai_failure_falls_back_to_identical_rules_reply() {
    let store = test_store();
    let text = "Compare direct booking vs booking.com prices";

    for llm in [MockLlm::Failing, MockLlm::Text(""), MockLlm::Hanging] {
        let assistant = build_assistant(&store, Some(llm));
        let outcome = assistant.respond(text, None).await;
        assert_eq!(outcome.source, ReplySource::Rules);
        assert_eq!(outcome.reply, rules_reply(&store, text));
    }
}

#[tokio::test]
async fn test_ai_reply_used_when_model_answers() {
    let store = test_store();
    let assistant = build_assistant(
        &store,
        Some(MockLlm::ToolThenText("Suites are ₹6,800 direct, save ₹1,200!")),
    );
    let outcome = assistant.respond("How much is a suite?", None).await;
    assert_eq!(outcome.source, ReplySource::Ai);
    assert_eq!(outcome.reply, "Suites are ₹6,800 direct, save ₹1,200!");
}

#[tokio::test]
async fn test_deluxe_price_end_to_end() {
    let store = test_store();
    let assistant = build_assistant(&store, None);

    let outcome = assistant.respond("How much is the deluxe room?", None).await;
    assert_eq!(outcome.nlu.intent, Intent::QueryPrices);
    assert!(outcome
        .nlu
        .entities
        .iter()
        .any(|e| e.kind == "room_type" && e.value == "deluxe"));
    assert!(outcome.reply.contains("OTA Platforms: ₹5,000"));
    assert!(outcome.reply.contains("Direct Booking: ₹4,250"));
    assert!(outcome.reply.contains("You save ₹750"));
}

#[tokio::test]
async fn test_sold_out_suite_never_claims_availability() {
    let store = test_store();
    {
        let conn = store.db().lock().unwrap();
        conn.execute("UPDATE rooms SET inventory = 0 WHERE room_type = 'suite'", [])
            .unwrap();
    }
    let assistant = build_assistant(&store, None);

    let reply = assistant
        .handle_turn("Do you have any suites available?")
        .await;
    assert!(reply.contains("sold out"), "{reply}");
    assert!(reply.contains("Standard Room"), "{reply}");
    assert!(!reply.starts_with("Yes!"));
}

#[tokio::test]
async fn test_every_turn_is_logged() {
    let store = test_store();
    let assistant = build_assistant(&store, Some(MockLlm::Failing));
    assistant.handle_turn("hello").await;
    assistant.handle_turn("asdfgh").await;

    let analytics = store.analytics(24, 0.5).unwrap();
    assert_eq!(analytics.total_queries, 2);
    assert_eq!(analytics.low_confidence_count, 1);
    assert_eq!(analytics.error_rate, 50.0);
}

// ── HTTP ──

#[tokio::test]
async fn test_health() {
    let resp = test_app(test_state()).oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn test_chat_endpoint() {
    let resp = test_app(test_state())
        .oneshot(json_post(
            "/api/chat",
            serde_json::json!({ "message": "I want to book the executive room" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["intent"], "book_room");
    assert_eq!(json["source"], "rules");
    assert_eq!(json["entities"][0]["type"], "room_type");
    assert_eq!(json["entities"][0]["value"], "executive");
    assert!(json["reply"].as_str().unwrap().contains("**Executive Room**"));
    assert!(json.get("audio_base64").is_none());
}

#[tokio::test]
async fn test_chat_with_speech() {
    let resp = test_app(test_state())
        .oneshot(json_post(
            "/api/chat",
            serde_json::json!({ "message": "hi", "speak": true }),
        ))
        .await
        .unwrap();
    let json = body_json(resp).await;
    // base64 of "ID3mock"
    assert_eq!(json["audio_base64"], "SUQzbW9jaw==");
}

#[tokio::test]
async fn test_chat_rejects_empty_message() {
    let resp = test_app(test_state())
        .oneshot(json_post("/api/chat", serde_json::json!({ "message": "   " })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert!(json["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_voice_endpoint() {
    let req = Request::builder()
        .method("POST")
        .uri("/api/voice?speak=false")
        .header("Content-Type", "audio/wav")
        .body(Body::from(vec![0u8; 32]))
        .unwrap();
    let resp = test_app(test_state()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["transcript"], "what rooms do you have");
    assert_eq!(json["intent"], "query_rooms");
    assert!(json.get("audio_base64").is_none());
}

#[tokio::test]
async fn test_voice_transcription_failure_is_friendly() {
    let state = test_state_with(test_store(), None, MockStt(None));
    let req = Request::builder()
        .method("POST")
        .uri("/api/voice")
        .header("Content-Type", "audio/webm")
        .body(Body::from(vec![1u8; 16]))
        .unwrap();
    let resp = test_app(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["success"], false);
    assert_eq!(
        json["message"],
        "Could not understand audio. Please speak clearly."
    );
    assert!(json.get("reply").is_none());
}

#[tokio::test]
async fn test_voice_stalled_transcription_is_friendly() {
    let state = test_state_with(test_store(), None, StalledStt);
    let req = Request::builder()
        .method("POST")
        .uri("/api/voice")
        .header("Content-Type", "audio/webm")
        .body(Body::from(vec![1u8; 16]))
        .unwrap();
    let resp = tokio::time::timeout(Duration::from_secs(5), test_app(state).oneshot(req))
        .await
        .expect("voice request should not hang")
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["success"], false);
    assert_eq!(
        json["message"],
        "Could not understand audio. Please speak clearly."
    );
}

#[tokio::test]
async fn test_analyze_endpoint() {
    let resp = test_app(test_state())
        .oneshot(json_post(
            "/api/analyze",
            serde_json::json!({ "text": "I want a luxury room" }),
        ))
        .await
        .unwrap();
    let json = body_json(resp).await;
    assert_eq!(json["original_text"], "I want a luxury room");
    assert!(json["entities"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["type"] == "room_type" && e["value"] == "deluxe"));
    assert!(json["description"].as_str().is_some());
}

#[tokio::test]
async fn test_rooms_endpoints() {
    let store = test_store();
    {
        let conn = store.db().lock().unwrap();
        conn.execute("UPDATE rooms SET inventory = 0 WHERE room_type = 'suite'", [])
            .unwrap();
    }
    let state = test_state_with(store, None, MockStt(None));

    let resp = test_app(state.clone()).oneshot(get("/api/rooms")).await.unwrap();
    let json = body_json(resp).await;
    assert_eq!(json.as_array().unwrap().len(), 3);
    assert_eq!(json[0]["name"], "Standard Room");
    assert_eq!(json[0]["savings"], 450.0);
    assert_eq!(json[0]["discount_percentage"], 15);

    let resp = test_app(state.clone())
        .oneshot(get("/api/rooms?available_only=false"))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 4);

    let resp = test_app(state.clone())
        .oneshot(get("/api/rooms/deluxe"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["direct_rate"], 4250.0);

    let resp = test_app(state).oneshot(get("/api/rooms/suite")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_faqs_endpoint() {
    let resp = test_app(test_state())
        .oneshot(get("/api/faqs?category=policies&limit=2"))
        .await
        .unwrap();
    let json = body_json(resp).await;
    let faqs = json.as_array().unwrap();
    assert_eq!(faqs.len(), 2);
    assert!(faqs.iter().all(|f| f["category"] == "policies"));
}

#[tokio::test]
async fn test_analytics_endpoint() {
    let state = test_state();
    let app = test_app(state.clone());

    for message in ["hello", "hello", "what are your rates?"] {
        let resp = app
            .clone()
            .oneshot(json_post("/api/chat", serde_json::json!({ "message": message })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app.oneshot(get("/api/analytics?hours=1")).await.unwrap();
    let json = body_json(resp).await;
    assert_eq!(json["total_queries"], 3);
    assert_eq!(json["recent_queries"], 3);
    assert_eq!(json["top_intents"][0]["intent"], "greeting");
    assert_eq!(json["common_queries"][0]["query"], "hello");
    assert_eq!(json["common_queries"][0]["count"], 2);

    let hourly = json["hourly_stats"].as_array().unwrap();
    let hourly_total: i64 = hourly.iter().map(|h| h["count"].as_i64().unwrap()).sum();
    assert_eq!(hourly_total, 3);

    let levels = &json["performance"]["confidence_distribution"];
    let classified: i64 = ["high", "medium", "low"]
        .iter()
        .map(|level| levels[*level].as_i64().unwrap())
        .sum();
    assert_eq!(classified, 3);
    let percentiles = &json["performance"]["response_time_percentiles"];
    assert!(percentiles["max"].as_i64().unwrap() >= percentiles["min"].as_i64().unwrap());
}
