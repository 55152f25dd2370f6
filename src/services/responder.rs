use std::fmt::Write as _;
use std::sync::Arc;

use crate::config::BusinessRules;
use crate::models::intent::room_types;
use crate::models::{Entity, Faq, Intent, NluResult, Room};
use crate::services::store::{FaqStore, RoomStore};

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseContext {
    pub intent: Intent,
    pub entities: Vec<Entity>,
    pub user_query: String,
    // All rooms, cheapest first. Filled on first use and kept for the turn.
    pub room_data: Option<Vec<Room>>,
}

impl ResponseContext {
    pub fn new(nlu: &NluResult) -> Self {
        Self {
            intent: nlu.intent,
            entities: nlu.entities.clone(),
            user_query: nlu.original_text.clone(),
            room_data: None,
        }
    }

    pub fn first_room_type(&self) -> Option<&str> {
        room_types(&self.entities).next()
    }
}

// FAQ topics, tried in order. The first topic whose keywords appear in the
// query and that has a stored FAQ is answered.
const FAQ_TOPICS: &[(&str, &[&str])] = &[
    (
        "check-in",
        &["check-in", "check in", "checkin", "check out", "checkout", "time", "hour"],
    ),
    ("WiFi", &["wifi", "internet", "wi-fi", "password", "network"]),
    ("cancellation", &["cancel", "cancellation", "refund"]),
    ("parking", &["parking", "park", "vehicle", "car"]),
    ("breakfast", &["breakfast", "food", "meal", "dining"]),
    ("payment", &["payment", "pay", "credit", "cash", "card"]),
    ("pets", &["pet", "pets", "dog", "cat", "animal"]),
    ("airport", &["airport", "pickup", "transport", "shuttle"]),
];

const CAPABILITIES: &str = "I can help you with:\n\
    • View rooms & amenities\n\
    • Check prices & compare rates\n\
    • Book rooms directly\n\
    • Answer FAQs\n\n\
    What would you like to know?";

const NOT_UNDERSTOOD: &str = "I'm not sure I understood that correctly. I can help you with:\n\n\
    - Viewing available rooms and prices\n\
    - Comparing direct booking vs OTA rates\n\
    - Checking room availability\n\
    - Making reservations\n\n\
    What would you like to know?";

const FULLY_BOOKED: &str =
    "Unfortunately, we're fully booked at the moment. Would you like me to check alternative dates?";

const NO_RATES: &str =
    "I'm sorry, our room rates aren't available right now. Please check back shortly.";

// Rule-based answer generator. Never fails: store errors read as "no data".
pub struct ResponseGenerator {
    rules: BusinessRules,
    rooms: Arc<dyn RoomStore>,
    faqs: Arc<dyn FaqStore>,
}

impl ResponseGenerator {
    pub fn new(rules: BusinessRules, rooms: Arc<dyn RoomStore>, faqs: Arc<dyn FaqStore>) -> Self {
        Self { rules, rooms, faqs }
    }

    pub fn rules(&self) -> &BusinessRules {
        &self.rules
    }

    pub fn generate(&self, ctx: &mut ResponseContext) -> String {
        match ctx.intent {
            Intent::Greeting => self.greeting(),
            Intent::Goodbye => self.goodbye(),
            Intent::Help => self.help(ctx),
            Intent::QueryRooms => self.room_query(ctx),
            Intent::QueryPrices => self.price_query(ctx),
            Intent::CheckAvailability => self.availability(ctx),
            Intent::CompareRates => self.rate_comparison(ctx),
            Intent::BookRoom => self.booking(ctx),
            Intent::Unknown => NOT_UNDERSTOOD.to_string(),
        }
    }

    pub fn ensure_rooms(&self, ctx: &mut ResponseContext) {
        if ctx.room_data.is_some() {
            return;
        }
        let rooms = match self.rooms.list_rooms(false) {
            Ok(rooms) => rooms,
            Err(e) => {
                tracing::warn!(error = %e, "room lookup failed, answering without room data");
                vec![]
            }
        };
        ctx.room_data = Some(rooms);
    }

    pub fn format_price(&self, amount: f64) -> String {
        format_price(&self.rules.currency_symbol, amount)
    }

    fn discount(&self) -> u32 {
        self.rules.direct_discount_percentage
    }

    fn greeting(&self) -> String {
        format!(
            "Hi there! 👋 I'm your booking assistant. I can show you rooms, prices, and help you save {}% by booking direct. What are you looking for?",
            self.discount()
        )
    }

    fn goodbye(&self) -> String {
        format!(
            "Thanks for chatting! 🙌 Remember, book direct to save {}%. Have a wonderful day!",
            self.discount()
        )
    }

    fn help(&self, ctx: &ResponseContext) -> String {
        let query = ctx.user_query.to_lowercase();

        for (topic, keywords) in FAQ_TOPICS {
            if !keywords.iter().any(|k| contains_word(&query, k)) {
                continue;
            }
            match self.faqs.search_faqs(topic) {
                Ok(faqs) => {
                    if let Some(Faq { question, answer, .. }) = faqs.into_iter().next() {
                        return format!("**{question}**\n\n{answer}\n\nNeed help with something else?");
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, topic, "faq lookup failed");
                }
            }
        }

        CAPABILITIES.to_string()
    }

    fn room_query(&self, ctx: &mut ResponseContext) -> String {
        self.ensure_rooms(ctx);
        let room_type = ctx.first_room_type();
        let rooms: Vec<&Room> = available(ctx)
            .filter(|r| room_type.map_or(true, |t| r.matches_type(t)))
            .collect();

        match rooms.as_slice() {
            [] => match room_type {
                Some(t) => format!(
                    "I apologize, but we don't have any {t} rooms available at the moment. Please check back later."
                ),
                None => "I apologize, but we don't have any rooms available at the moment. Please check back later."
                    .to_string(),
            },
            [room] => format!(
                "Great choice! Our **{}** is available ({} rooms left).\n\n\
                 💰 **Pricing:** OTA sites charge {}/night, but book direct for just {} - save {}!\n\n\
                 Ready to book?",
                room.name,
                room.inventory,
                self.format_price(room.rack_rate),
                self.format_price(room.direct_rate),
                self.format_price(room.savings()),
            ),
            rooms => {
                let mut response = format!("We have {} room types available:\n\n", rooms.len());
                for room in rooms {
                    let _ = writeln!(
                        response,
                        "**{}** - {}/night (save {}!) • {} available",
                        room.name,
                        self.format_price(room.direct_rate),
                        self.format_price(room.savings()),
                        room.inventory,
                    );
                }
                let _ = write!(
                    response,
                    "\n✨ *All prices are {}% off OTA rates when you book direct!*",
                    self.discount()
                );
                response
            }
        }
    }

    fn price_query(&self, ctx: &mut ResponseContext) -> String {
        self.ensure_rooms(ctx);
        let all = ctx.room_data.as_deref().unwrap_or_default();
        if all.is_empty() {
            return NO_RATES.to_string();
        }

        if let Some(room) = ctx
            .first_room_type()
            .and_then(|t| all.iter().find(|r| r.matches_type(t)))
        {
            return format!(
                "**{} Pricing:**\n\n\
                 🏷️ OTA Platforms: {}\n\
                 ✨ Direct Booking: {}\n\n\
                 💰 **You save {}** by booking directly!\n\n\
                 That's a {}% discount compared to Booking.com, Expedia, etc.",
                room.name,
                self.format_price(room.rack_rate),
                self.format_price(room.direct_rate),
                self.format_price(room.savings()),
                room.discount_pct(),
            );
        }

        let mut response = format!(
            "**Direct Booking Prices** ({}% off OTA rates):\n\n",
            self.discount()
        );
        for room in all {
            let _ = writeln!(
                response,
                "• **{}:** {}/night *(save {})*",
                room.name,
                self.format_price(room.direct_rate),
                self.format_price(room.savings()),
            );
        }
        let _ = write!(
            response,
            "\n💡 These are direct booking prices - all {}% cheaper than Booking.com/MakeMyTrip!",
            self.discount()
        );
        response
    }

    fn availability(&self, ctx: &mut ResponseContext) -> String {
        self.ensure_rooms(ctx);
        let all = ctx.room_data.as_deref().unwrap_or_default();

        if let Some(room) = ctx
            .first_room_type()
            .and_then(|t| all.iter().find(|r| r.matches_type(t)))
        {
            if room.is_available() {
                return format!(
                    "Yes! We have **{} {}(s)** available.\n\n\
                     Direct booking rate: {}\n\
                     (Save {} vs OTA platforms)\n\n\
                     Would you like to proceed with booking?",
                    room.inventory,
                    room.name,
                    self.format_price(room.direct_rate),
                    self.format_price(room.savings()),
                );
            }

            return match all.iter().find(|r| r.is_available() && r.id != room.id) {
                Some(alt) => format!(
                    "Sorry, {} is currently sold out. Can I suggest the **{}** instead? \
                     It's available at {}/night (save {} vs OTA platforms).",
                    room.name,
                    alt.name,
                    self.format_price(alt.direct_rate),
                    self.format_price(alt.savings()),
                ),
                None => format!(
                    "Sorry, {} is currently sold out. {FULLY_BOOKED}",
                    room.name
                ),
            };
        }

        let rooms: Vec<&Room> = available(ctx).collect();
        if rooms.is_empty() {
            return FULLY_BOOKED.to_string();
        }

        let mut response = format!("We have {} room types available:\n\n", rooms.len());
        for room in rooms {
            let _ = writeln!(
                response,
                "- {}: {} rooms at {}",
                room.name,
                room.inventory,
                self.format_price(room.direct_rate),
            );
        }
        let _ = write!(response, "\n💡 Book directly to save {}%!", self.discount());
        response
    }

    fn rate_comparison(&self, ctx: &mut ResponseContext) -> String {
        self.ensure_rooms(ctx);
        let all = ctx.room_data.as_deref().unwrap_or_default();
        if all.is_empty() {
            return NO_RATES.to_string();
        }

        let mut response = String::from(
            "**Direct Booking vs OTA Platforms:**\n\nHere's how much you save by booking directly:\n\n",
        );
        for room in all {
            let _ = write!(
                response,
                "**{}:**\n- Booking.com/Expedia: {}\n- Our Direct Rate: {}\n- Your Savings: {}\n\n",
                room.name,
                self.format_price(room.rack_rate),
                self.format_price(room.direct_rate),
                self.format_price(room.savings()),
            );
        }

        let total_ota: f64 = all.iter().map(|r| r.rack_rate).sum();
        let total_direct: f64 = all.iter().map(|r| r.direct_rate).sum();
        let _ = write!(
            response,
            "💰 **Across all {} room types:** {} on OTA platforms vs {} direct - that's {} back in your pocket.\n\n\
             🎯 **Bottom Line:** By booking directly, you avoid OTA commissions and get {}% off!\n\n\
             No hidden fees. No middleman. Just better prices.",
            all.len(),
            self.format_price(total_ota),
            self.format_price(total_direct),
            self.format_price(total_ota - total_direct),
            self.discount(),
        );
        response
    }

    fn booking(&self, ctx: &mut ResponseContext) -> String {
        self.ensure_rooms(ctx);
        let rules = &self.rules;

        if let Some(room) = ctx
            .first_room_type()
            .and_then(|t| available(ctx).find(|r| r.matches_type(t)))
        {
            return format!(
                "Perfect! Let me help you book the **{}**.\n\n\
                 📞 **Call us at: {}** (24/7 booking line)\n\
                 💻 **Or book online at: {}**\n\n\
                 💰 **Your Price:** {}/night (save {}!)\n\
                 ✅ **Mention code:** {} to confirm your discount\n\n\
                 Ready to book now? Just call or visit our website!",
                room.name,
                rules.booking_phone,
                rules.booking_url,
                self.format_price(room.direct_rate),
                self.format_price(room.savings()),
                rules.discount_code,
            );
        }

        let room_list: Vec<String> = available(ctx)
            .map(|r| {
                format!(
                    "• **{}** - {}/night ({} available)",
                    r.name,
                    self.format_price(r.direct_rate),
                    r.inventory
                )
            })
            .collect();
        if room_list.is_empty() {
            return FULLY_BOOKED.to_string();
        }

        format!(
            "Absolutely! I'd be happy to help you book directly and save {pct}%! 🎉\n\n\
             **Available rooms:**\n{}\n\n\
             📞 **Book now:** Call {} or visit {}\n\
             💰 **Use code {}** for your {pct}% discount!\n\n\
             Which room type interests you?",
            room_list.join("\n"),
            rules.booking_phone,
            rules.booking_url,
            rules.discount_code,
            pct = self.discount(),
        )
    }
}

fn available(ctx: &ResponseContext) -> impl Iterator<Item = &Room> {
    ctx.room_data
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter(|r| r.is_available())
}

// `needle` occurs in `haystack` as a whole word (a trailing plural "s" is allowed).
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let mut after = haystack[start + needle.len()..].chars();
        let boundary_before = before.map_or(true, |c| !c.is_alphanumeric());
        let boundary_after = match after.next() {
            None => true,
            Some('s') => after.next().map_or(true, |c| !c.is_alphanumeric()),
            Some(c) => !c.is_alphanumeric(),
        };
        boundary_before && boundary_after
    })
}

// Whole units with `,` thousands separators: `format_price("₹", 4250.0)` is `₹4,250`.
pub fn format_price(symbol: &str, amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{symbol}{grouped}")
}
