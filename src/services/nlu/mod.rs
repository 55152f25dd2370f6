pub mod patterns;

use std::sync::Arc;

use crate::models::{Entity, Intent, NluResult};

use self::patterns::{PatternSet, DEFAULT_PATTERNS};

pub const ENTITY_CONFIDENCE: f32 = 0.9;

#[derive(Clone)]
pub struct Classifier {
    patterns: Arc<PatternSet>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            patterns: Arc::clone(&DEFAULT_PATTERNS),
        }
    }

    pub fn with_patterns(patterns: PatternSet) -> Self {
        Self {
            patterns: Arc::new(patterns),
        }
    }

    pub fn classify(&self, text: &str) -> NluResult {
        let normalized = text.trim().to_lowercase();
        if normalized.is_empty() {
            return NluResult::unknown(text);
        }

        let (intent, confidence) = self.recognize_intent(&normalized);
        let entities = self.extract_entities(&normalized);

        NluResult {
            intent,
            confidence,
            entities,
            original_text: text.to_string(),
        }
    }

    // Score = matched patterns / patterns for that intent. Highest score wins;
    // on a tie the intent declared first keeps the lead.
    fn recognize_intent(&self, text: &str) -> (Intent, f32) {
        let mut best: Option<(Intent, usize, usize)> = None;

        for rules in &self.patterns.intents {
            let total = rules.patterns.len();
            if total == 0 {
                continue;
            }
            let matched = rules.patterns.iter().filter(|re| re.is_match(text)).count();
            if matched == 0 {
                continue;
            }

            // matched/total > best_matched/best_total, compared without floats
            let beats = match best {
                None => true,
                Some((_, best_matched, best_total)) => matched * best_total > best_matched * total,
            };
            if beats {
                best = Some((rules.intent, matched, total));
            }
        }

        match best {
            Some((intent, matched, total)) => (intent, (matched as f32 / total as f32).min(1.0)),
            None => (Intent::Unknown, 0.0),
        }
    }

    fn extract_entities(&self, text: &str) -> Vec<Entity> {
        let mut entities = vec![];
        for rule in &self.patterns.entities {
            for m in rule.regex.find_iter(text) {
                entities.push(Entity {
                    kind: rule.kind.clone(),
                    value: rule
                        .canonical
                        .clone()
                        .unwrap_or_else(|| m.as_str().to_string()),
                    confidence: ENTITY_CONFIDENCE,
                });
            }
        }
        entities
    }
}
