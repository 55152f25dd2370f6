use std::sync::Arc;
use std::time::Duration;

use crate::services::speech::{SpeechToText, TextToSpeech, VoiceParams};

pub struct Voice {
    stt: Arc<dyn SpeechToText>,
    tts: Arc<dyn TextToSpeech>,
    params: VoiceParams,
    tts_enabled: bool,
    stt_timeout: Duration,
    tts_timeout: Duration,
}

impl Voice {
    pub fn new(
        stt: Arc<dyn SpeechToText>,
        tts: Arc<dyn TextToSpeech>,
        params: VoiceParams,
        tts_enabled: bool,
        stt_timeout: Duration,
        tts_timeout: Duration,
    ) -> Self {
        Self {
            stt,
            tts,
            params,
            tts_enabled,
            stt_timeout,
            tts_timeout,
        }
    }

    pub async fn transcribe(&self, audio: &[u8], mime: &str) -> anyhow::Result<String> {
        tokio::time::timeout(self.stt_timeout, self.stt.transcribe(audio, mime))
            .await
            .map_err(|_| {
                anyhow::anyhow!("transcription timed out after {}s", self.stt_timeout.as_secs())
            })?
    }

    pub async fn speak(&self, text: &str) -> Option<Vec<u8>> {
        if !self.tts_enabled {
            return None;
        }

        let speakable = speakable_text(text);
        if speakable.is_empty() {
            return None;
        }

        match tokio::time::timeout(self.tts_timeout, self.tts.synthesize(&speakable, &self.params))
            .await
        {
            Ok(Ok(audio)) if !audio.is_empty() => Some(audio),
            Ok(Ok(_)) => {
                tracing::warn!("speech synthesis returned no audio");
                None
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "speech synthesis failed");
                None
            }
            Err(_) => {
                tracing::warn!(timeout_secs = self.tts_timeout.as_secs(), "speech synthesis timed out");
                None
            }
        }
    }
}

// Drops markdown emphasis and pictographs, then collapses whitespace.
pub fn speakable_text(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '`' | '#'))
        .map(|c| if c.is_ascii() || is_speakable_non_ascii(c) { c } else { ' ' })
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

// Letters and currency signs read fine; emoji, bullets and variation selectors do not.
fn is_speakable_non_ascii(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '₹' | '€' | '£' | '¥')
}
