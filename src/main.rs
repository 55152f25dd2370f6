use std::sync::{Arc, Mutex};
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use roomdesk::config::AppConfig;
use roomdesk::db;
use roomdesk::handlers;
use roomdesk::services::ai::groq::GroqProvider;
use roomdesk::services::ai::ollama::OllamaProvider;
use roomdesk::services::ai::{LlmProvider, Sampling};
use roomdesk::services::assistant::Assistant;
use roomdesk::services::nlu::Classifier;
use roomdesk::services::responder::ResponseGenerator;
use roomdesk::services::speech::openai_compat::OpenAiSpeech;
use roomdesk::services::speech::VoiceParams;
use roomdesk::services::store::SqliteStore;
use roomdesk::services::voice::Voice;
use roomdesk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;
    let store = SqliteStore::new(Arc::new(Mutex::new(conn)));

    let sampling = Sampling {
        max_tokens: config.llm_max_tokens,
        temperature: config.llm_temperature,
    };
    let llm: Option<Arc<dyn LlmProvider>> = match config.llm_provider.as_str() {
        "groq" if config.groq_api_key.is_empty() => {
            anyhow::ensure!(!config.use_ai, "GROQ_API_KEY must be set when USE_AI is on with LLM_PROVIDER=groq");
            tracing::info!("no GROQ_API_KEY, answering with rules only");
            None
        }
        "groq" => {
            tracing::info!("using Groq LLM provider (model: {})", config.groq_model);
            Some(Arc::new(GroqProvider::new(
                config.groq_api_key.clone(),
                config.groq_model.clone(),
                sampling,
            )))
        }
        "ollama" => {
            tracing::info!("using Ollama LLM provider (url: {})", config.ollama_url);
            Some(Arc::new(OllamaProvider::new(
                config.ollama_url.clone(),
                config.ollama_model.clone(),
                sampling,
            )))
        }
        other => {
            tracing::info!(provider = other, "no LLM provider, answering with rules only");
            None
        }
    };

    let responder = ResponseGenerator::new(
        config.business.clone(),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
    );
    let mut assistant = Assistant::new(Classifier::new(), responder, Arc::new(store.clone()));
    if let Some(llm) = llm {
        assistant = assistant.with_llm(llm, config.use_ai, config.llm_timeout());
    }

    let speech = Arc::new(OpenAiSpeech::new(&config.speech));
    let voice = Voice::new(
        speech.clone(),
        speech,
        VoiceParams::preset(&config.speech.tts_preset),
        config.speech.tts_enabled,
        Duration::from_secs(config.speech.stt_timeout_secs),
        Duration::from_secs(config.speech.tts_timeout_secs),
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        assistant,
        voice,
    });

    let app = handlers::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
