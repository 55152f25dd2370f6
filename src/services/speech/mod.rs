pub mod openai_compat;

use async_trait::async_trait;

#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio: &[u8], mime: &str) -> anyhow::Result<String>;
}

#[async_trait]
pub trait TextToSpeech: Send + Sync {
    async fn synthesize(&self, text: &str, voice: &VoiceParams) -> anyhow::Result<Vec<u8>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceParams {
    pub voice: String,
    pub rate: String,
    pub pitch: String,
}

impl VoiceParams {
    fn new(voice: &str, rate: &str, pitch: &str) -> Self {
        Self {
            voice: voice.to_string(),
            rate: rate.to_string(),
            pitch: pitch.to_string(),
        }
    }

    // Named preset; anything unrecognized gets `female_professional`.
    pub fn preset(name: &str) -> Self {
        match name {
            "male_professional" => Self::new("en-US-GuyNeural", "+0%", "+0Hz"),
            "female_friendly" => Self::new("en-US-JennyNeural", "+5%", "+2Hz"),
            "male_calm" => Self::new("en-US-EricNeural", "-5%", "-2Hz"),
            _ => Self::new("en-US-AriaNeural", "+0%", "+0Hz"),
        }
    }

    // Playback speed multiplier: `+5%` is 1.05, `-10%` is 0.9. Unparseable rates are 1.0.
    pub fn speed(&self) -> f32 {
        self.rate
            .trim()
            .trim_end_matches('%')
            .parse::<f32>()
            .map(|pct| 1.0 + pct / 100.0)
            .unwrap_or(1.0)
    }
}
