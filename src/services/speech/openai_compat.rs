use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{SpeechToText, TextToSpeech, VoiceParams};
use crate::config::SpeechConfig;

pub struct OpenAiSpeech {
    base_url: String,
    api_key: String,
    stt_model: String,
    tts_model: String,
    language: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl OpenAiSpeech {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            stt_model: config.stt_model.clone(),
            tts_model: config.tts_model.clone(),
            language: config.language.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl SpeechToText for OpenAiSpeech {
    async fn transcribe(&self, audio: &[u8], mime: &str) -> anyhow::Result<String> {
        let file = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name(format!("speech.{}", extension_for(mime)))
            .mime_str(mime)
            .context("invalid audio content type")?;

        let form = reqwest::multipart::Form::new()
            .text("model", self.stt_model.clone())
            .text("language", self.language.clone())
            .text("response_format", "json")
            .part("file", file);

        let resp = self
            .client
            .post(self.url("audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .context("failed to call transcription API")?
            .error_for_status()
            .context("transcription API returned an error")?
            .json::<TranscriptionResponse>()
            .await
            .context("failed to parse transcription response")?;

        Ok(resp.text.trim().to_string())
    }
}

#[async_trait]
impl TextToSpeech for OpenAiSpeech {
    async fn synthesize(&self, text: &str, voice: &VoiceParams) -> anyhow::Result<Vec<u8>> {
        let body = json!({
            "model": self.tts_model,
            "input": text,
            "voice": voice.voice,
            "speed": voice.speed(),
            "response_format": "mp3",
        });

        let bytes = self
            .client
            .post(self.url("audio/speech"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("failed to call speech API")?
            .error_for_status()
            .context("speech API returned an error")?
            .bytes()
            .await
            .context("failed to read speech audio")?;

        Ok(bytes.to_vec())
    }
}

fn extension_for(mime: &str) -> &'static str {
    match mime.split(';').next().unwrap_or_default().trim() {
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/ogg" => "ogg",
        "audio/flac" => "flac",
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "m4a",
        _ => "webm",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(extension_for("audio/wav"), "wav");
        assert_eq!(extension_for("audio/webm;codecs=opus"), "webm");
        assert_eq!(extension_for("audio/mpeg"), "mp3");
        assert_eq!(extension_for(""), "webm");
    }
}
