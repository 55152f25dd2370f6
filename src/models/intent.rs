use serde::{Deserialize, Serialize};

// Declaration order is also the tie-break priority used by the classifier:
// when two intents score the same, the one declared first wins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Goodbye,
    QueryRooms,
    QueryPrices,
    CheckAvailability,
    CompareRates,
    BookRoom,
    Help,
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::Goodbye => "goodbye",
            Intent::QueryRooms => "query_rooms",
            Intent::QueryPrices => "query_prices",
            Intent::CheckAvailability => "check_availability",
            Intent::CompareRates => "compare_rates",
            Intent::BookRoom => "book_room",
            Intent::Help => "help",
            Intent::Unknown => "unknown",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Intent::QueryRooms => "User wants to see available rooms",
            Intent::QueryPrices => "User wants to know pricing information",
            Intent::CheckAvailability => "User checking room availability",
            Intent::CompareRates => "User wants to compare pricing",
            Intent::BookRoom => "User wants to make a booking",
            Intent::Greeting => "User greeting",
            Intent::Goodbye => "User ending conversation",
            Intent::Help => "User needs assistance",
            Intent::Unknown => "Unable to determine user intent",
        }
    }

    pub fn needs_room_data(&self) -> bool {
        matches!(
            self,
            Intent::QueryRooms | Intent::QueryPrices | Intent::CheckAvailability | Intent::CompareRates
        )
    }
}

pub const ROOM_TYPE: &str = "room_type";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NluResult {
    pub intent: Intent,
    pub confidence: f32,
    pub entities: Vec<Entity>,
    pub original_text: String,
}

impl NluResult {
    pub fn unknown(text: &str) -> Self {
        Self {
            intent: Intent::Unknown,
            confidence: 0.0,
            entities: vec![],
            original_text: text.to_string(),
        }
    }
}

// Room types mentioned in the text, in extraction order. Duplicates are kept.
pub fn room_types(entities: &[Entity]) -> impl Iterator<Item = &str> {
    entities
        .iter()
        .filter(|e| e.kind == ROOM_TYPE)
        .map(|e| e.value.as_str())
}
