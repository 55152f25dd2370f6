use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub llm_provider: String,
    pub groq_api_key: String,
    pub groq_model: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub use_ai: bool,
    pub llm_timeout_secs: u64,
    pub llm_max_tokens: u32,
    pub llm_temperature: f32,
    pub min_confidence: f64,
    pub business: BusinessRules,
    pub speech: SpeechConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BusinessRules {
    pub currency_symbol: String,
    pub direct_discount_percentage: u32,
    pub booking_phone: String,
    pub booking_url: String,
    pub discount_code: String,
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
            direct_discount_percentage: 15,
            booking_phone: "+91-XXXX-XXXX".to_string(),
            booking_url: "www.simplotel.com/direct-booking".to_string(),
            discount_code: "DIRECT15".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SpeechConfig {
    pub api_url: String,
    pub api_key: String,
    pub stt_model: String,
    pub tts_model: String,
    pub language: String,
    pub tts_enabled: bool,
    pub tts_preset: String,
    pub stt_timeout_secs: u64,
    pub tts_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = BusinessRules::default();
        let groq_api_key = env::var("GROQ_API_KEY").unwrap_or_default();

        Self {
            port: parse_var("PORT", 3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "roomdesk.db".to_string()),
            llm_provider: env::var("LLM_PROVIDER").unwrap_or_else(|_| "groq".to_string()),
            groq_model: env::var("GROQ_MODEL")
                .unwrap_or_else(|_| "llama3-groq-70b-8192-tool-use-preview".to_string()),
            ollama_url: env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            ollama_model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string()),
            use_ai: parse_flag("USE_AI", false),
            llm_timeout_secs: parse_var("LLM_TIMEOUT_SECS", 10),
            llm_max_tokens: parse_var("LLM_MAX_TOKENS", 200),
            llm_temperature: parse_var("LLM_TEMPERATURE", 0.7),
            min_confidence: parse_var("MIN_CONFIDENCE", 0.5),
            business: BusinessRules {
                currency_symbol: env::var("CURRENCY_SYMBOL").unwrap_or(defaults.currency_symbol),
                direct_discount_percentage: parse_var(
                    "DIRECT_DISCOUNT",
                    defaults.direct_discount_percentage,
                ),
                booking_phone: env::var("BOOKING_PHONE").unwrap_or(defaults.booking_phone),
                booking_url: env::var("BOOKING_URL").unwrap_or(defaults.booking_url),
                discount_code: env::var("DISCOUNT_CODE").unwrap_or(defaults.discount_code),
            },
            speech: SpeechConfig {
                api_url: env::var("SPEECH_API_URL")
                    .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string()),
                api_key: env::var("SPEECH_API_KEY").unwrap_or_else(|_| groq_api_key.clone()),
                stt_model: env::var("STT_MODEL").unwrap_or_else(|_| "whisper-large-v3".to_string()),
                tts_model: env::var("TTS_MODEL").unwrap_or_else(|_| "playai-tts".to_string()),
                language: env::var("SPEECH_LANGUAGE").unwrap_or_else(|_| "en".to_string()),
                tts_enabled: parse_flag("TTS_ENABLED", true),
                tts_preset: env::var("TTS_PRESET")
                    .unwrap_or_else(|_| "female_professional".to_string()),
                stt_timeout_secs: parse_var("STT_TIMEOUT_SECS", 30),
                tts_timeout_secs: parse_var("TTS_TIMEOUT_SECS", 15),
            },
            groq_api_key,
        }
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}
