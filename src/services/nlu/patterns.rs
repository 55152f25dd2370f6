use std::sync::{Arc, LazyLock};

use regex::{Regex, RegexBuilder};

use crate::models::Intent;

// Intent rules, in tie-break priority order.
pub const INTENT_RULES: &[(Intent, &[&str])] = &[
    (
        Intent::Greeting,
        &[
            r"\b(hello|hi|hey|greetings|good\s+(morning|afternoon|evening)|hola|namaste)\b",
            r"^(hi|hello|hey)[\s!]*$",
        ],
    ),
    (
        Intent::Goodbye,
        &[
            r"\b(bye|goodbye|see\s+you|take\s+care|have\s+a\s+good|thank\s*you|thanks|thnx|cheers)\b",
            r"\b(bye|cya|see\s+ya|later|thank)\b",
        ],
    ),
    (
        Intent::QueryRooms,
        &[
            r"\b(what|which|show|list|tell|display).*(rooms?|types?|options?|accommodations?)\b",
            r"\b(available|have).*(rooms?|suites?|accommodations?)\b",
            r"\brooms?\s+(available|do\s+you\s+have|types?)\b",
            r"\b(can\s+you\s+)?(show|tell|describe).*(rooms?|options?)\b",
            r"\b(i\s+want\s+to\s+see|looking\s+for).*(rooms?|options?)\b",
            r"\b(what\s+kind|what\s+types?).*(rooms?|accommodations?)\b",
        ],
    ),
    (
        Intent::QueryPrices,
        &[
            r"\b(what|how\s+much|tell\s+me).*(price|cost|rate|charge|tariff|fee)\b",
            r"\b(price|cost|rate|charge|tariff).*(room|deluxe|suite|standard|night)\b",
            r"\bhow\s+much\s+(is|are|does|do|for|per)\b",
            r"\b(what'?s|what\s+is).*(price|cost|rate)\b",
            r"\b(how\s+expensive|how\s+costly|pricing|rates?)\b",
            r"\b(can\s+you\s+tell).*(price|cost|rate)\b",
        ],
    ),
    (
        Intent::CheckAvailability,
        &[
            r"\b(available|availability|vacant|free|open).*(room|tonight|today|tomorrow)\b",
            r"\bdo\s+you\s+have\s+(any\s+)?(rooms?|deluxe|suites?|standard|executive|vacancy|vacancies)\b",
            r"\b(is|are).*(room|deluxe|suite|standard|executive).*(available|vacant|free|open)\b",
            r"\b(any|got).*(rooms?|vacancies|availability).*(available|free|left)\b",
            r"\b(can\s+i\s+get|looking\s+for).*(room|vacancy)\b",
        ],
    ),
    (
        Intent::CompareRates,
        &[
            r"\b(difference|compare|comparison|vs|versus).*(rate|price|cost)\b",
            r"\b(direct|booking\.com|ota|online|makemytrip|agoda).*(rate|price|booking|vs)\b",
            r"\b(cheaper|discount|save|saving|deal|offer)\b",
            r"\b(why\s+)?(book\s+direct|direct\s+booking)\b",
            r"\b(better\s+deal|best\s+price|lowest\s+rate)\b",
        ],
    ),
    (
        Intent::BookRoom,
        &[
            r"\b(book|reserve|reservation|make\s+a\s+booking)\b",
            r"\bi\s+want\s+(to\s+book|to\s+reserve|a\s+room)\b",
            r"\b(can\s+i|how\s+to|how\s+do\s+i).*(book|reserve)\b",
            r"\b(direct\s+book|book\s+direct|book\s+from\s+here)\b",
            r"\b(need\s+a\s+room|want\s+a\s+room|get\s+a\s+room)\b",
            r"\b(proceed|go\s+ahead).*(booking|reservation)\b",
        ],
    ),
    (
        Intent::Help,
        &[
            r"\b(help|assist|support)\b",
            r"\b(what|when|where|how).*(check[ -]?in|check[ -]?out|time|hour)\b",
            r"\b(wifi|internet|wi[ -]?fi|password)\b",
            r"\b(parking|park)\b",
            r"\b(breakfast|food|meal|dining)\b",
            r"\b(cancel|cancellation|refund)\b",
            r"\b(payment|pay|credit|cash)\b",
            r"\b(pet|pets|dog|cat|animal)\b",
            r"\b(allow|accept|permit)\b",
            r"\b(do you (have|offer|provide)|is there|can i|are.*allowed)\b",
            r"\b(policy|policies|rule|rules)\b",
            r"\b(pickup|airport|transport)\b",
        ],
    ),
];

// Entity rules: `(entity type, [(pattern, canonical value)])`.
// A `None` canonical value keeps the matched text.
pub const ENTITY_RULES: &[(&str, &[(&str, Option<&str>)])] = &[
    (
        "room_type",
        &[
            (r"\bdeluxe\s+rooms?\b", Some("deluxe")),
            (r"\bdeluxe\b", Some("deluxe")),
            (r"\bsuites?\s+rooms?\b", Some("suite")),
            (r"\bsuites?\b", Some("suite")),
            (r"\bstandard\s+rooms?\b", Some("standard")),
            (r"\bstandard\b", Some("standard")),
            (r"\bexecutive\s+rooms?\b", Some("executive")),
            (r"\bexecutive\b", Some("executive")),
            (r"\bluxury\s+rooms?\b", Some("deluxe")),
            (r"\bpremium\s+rooms?\b", Some("deluxe")),
            (r"\bbasic\s+rooms?\b", Some("standard")),
            (r"\bregular\s+rooms?\b", Some("standard")),
        ],
    ),
    (
        "number",
        &[
            (r"\b\d+\b", None),
            (r"\b(one|two|three|four|five|six|seven|eight|nine|ten)\b", None),
        ],
    ),
    (
        "date",
        &[
            (r"\b(today|tomorrow|tonight)\b", None),
            (r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b", None),
        ],
    ),
    (
        "booking_source",
        &[
            (r"\b(booking\.com|airbnb|expedia|ota|online)\b", Some("ota")),
            (r"\b(direct|directly|website)\b", Some("direct")),
        ],
    ),
];

pub struct IntentPatterns {
    pub intent: Intent,
    pub patterns: Vec<Regex>,
}

pub struct EntityPattern {
    pub kind: String,
    pub regex: Regex,
    pub canonical: Option<String>,
}

pub struct PatternSet {
    pub intents: Vec<IntentPatterns>,
    pub entities: Vec<EntityPattern>,
}

impl PatternSet {
    pub fn compile(
        intent_rules: &[(Intent, &[&str])],
        entity_rules: &[(&str, &[(&str, Option<&str>)])],
    ) -> Result<Self, regex::Error> {
        let mut intents = Vec::with_capacity(intent_rules.len());
        for (intent, sources) in intent_rules {
            let patterns = sources
                .iter()
                .map(|p| compile(p))
                .collect::<Result<Vec<_>, _>>()?;
            intents.push(IntentPatterns {
                intent: *intent,
                patterns,
            });
        }

        let mut entities = vec![];
        for (kind, rules) in entity_rules {
            for (pattern, canonical) in rules.iter() {
                entities.push(EntityPattern {
                    kind: kind.to_string(),
                    regex: compile(pattern)?,
                    canonical: canonical.map(str::to_string),
                });
            }
        }

        Ok(Self { intents, entities })
    }
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

pub static DEFAULT_PATTERNS: LazyLock<Arc<PatternSet>> = LazyLock::new(|| {
    Arc::new(PatternSet::compile(INTENT_RULES, ENTITY_RULES).expect("invalid built-in NLU pattern"))
});
