use serde_json::json;

use crate::config::BusinessRules;
use crate::models::intent::room_types;
use crate::models::{Entity, Intent, Room, RoomView};
use crate::services::ai::ToolSpec;
use crate::services::responder::format_price;

pub const GET_ROOMS_TOOL: &str = "get_rooms";

pub fn get_rooms_tool(rules: &BusinessRules) -> ToolSpec {
    ToolSpec {
        name: GET_ROOMS_TOOL.to_string(),
        description: format!(
            "Get available hotel rooms with pricing information including rack rates (OTA prices) and direct booking rates ({}% cheaper)",
            rules.direct_discount_percentage
        ),
        parameters: json!({
            "type": "object",
            "properties": {},
            "required": [],
        }),
    }
}

fn base_prompt(rules: &BusinessRules) -> String {
    let example_rack = format_price(&rules.currency_symbol, 3000.0);
    let example_direct = format_price(&rules.currency_symbol, 2550.0);
    let example_saved = format_price(&rules.currency_symbol, 450.0);

    format!(
        "You are a quick, helpful hotel booking assistant. Keep responses SHORT (1-3 sentences) and NATURAL.\n\n\
         RULES:\n\
         - Show room name, key feature, and BOTH prices (OTA vs Direct)\n\
         - Direct booking is {pct}% cheaper - mention the {symbol} saved\n\
         - Be friendly and conversational, not robotic\n\
         - Don't repeat yourself or over-explain\n\n\
         Example: \"Our Deluxe Room has a king bed and city view. OTA price: {example_rack}/night. \
         Book direct: {example_direct} (save {example_saved}!). Want to book?\"",
        pct = rules.direct_discount_percentage,
        symbol = rules.currency_symbol,
    )
}

fn intent_guidance(intent: Intent) -> Option<&'static str> {
    let guidance = match intent {
        Intent::QueryRooms => "User wants to see available rooms. List all rooms with names, key features, and BOTH prices with savings.",
        Intent::QueryPrices => "User asking about prices. Show BOTH Rack Rate and Direct Rate with exact savings amount.",
        Intent::CompareRates => "User comparing prices. Show side-by-side comparison with OTA vs Direct rates and total savings.",
        Intent::CheckAvailability => "User checking availability. Confirm available rooms with prices and offer to book.",
        Intent::BookRoom => "User wants to book. Ask for: room type (if not mentioned), dates, guest name. Confirm the direct booking savings.",
        Intent::Greeting => "Greet warmly and briefly mention you can help with rooms, prices, and bookings.",
        Intent::Help => "List what you can help with: view rooms, check prices, compare rates, make bookings. Ask what they need.",
        Intent::Goodbye | Intent::Unknown => return None,
    };
    Some(guidance)
}

pub fn build_system_prompt(
    rules: &BusinessRules,
    intent: Intent,
    entities: &[Entity],
    room_data: Option<&[Room]>,
) -> String {
    let mut prompt = base_prompt(rules);

    if let Some(guidance) = intent_guidance(intent) {
        prompt.push_str("\n\n");
        prompt.push_str(guidance);
    }

    let mentioned: Vec<&str> = room_types(entities).collect();
    if !mentioned.is_empty() {
        prompt.push_str(&format!(
            "\n\nUser mentioned room type: {}. Focus on this room.",
            mentioned.join(", ")
        ));
    }

    // Sold-out rooms stay out of the model's view, as in the tool result.
    let rooms = room_data.unwrap_or_default();
    if rooms.iter().any(Room::is_available) {
        prompt.push_str("\n\nAvailable rooms data: ");
        prompt.push_str(&available_rooms_json(rooms));
    }

    prompt
}

pub fn available_rooms_json(rooms: &[Room]) -> String {
    let views: Vec<RoomView<'_>> = rooms
        .iter()
        .filter(|r| r.is_available())
        .map(RoomView::from)
        .collect();
    serde_json::to_string(&views).unwrap_or_else(|_| "[]".to_string())
}
