use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub room_type: String,
    pub rack_rate: f64,
    pub direct_rate: f64,
    pub inventory: i64,
    pub description: Option<String>,
    pub amenities: Option<String>,
    pub max_occupancy: i64,
}

impl Room {
    pub fn savings(&self) -> f64 {
        self.rack_rate - self.direct_rate
    }

    pub fn discount_pct(&self) -> i64 {
        if self.rack_rate <= 0.0 {
            return 0;
        }
        (self.savings() / self.rack_rate * 100.0).round() as i64
    }

    pub fn is_available(&self) -> bool {
        self.inventory > 0
    }

    pub fn matches_type(&self, room_type: &str) -> bool {
        self.name.to_lowercase().contains(&room_type.to_lowercase())
    }
}

// Room plus the derived pricing fields, as handed to the model and the API.
#[derive(Debug, Clone, Serialize)]
pub struct RoomView<'a> {
    #[serde(flatten)]
    pub room: &'a Room,
    pub savings: f64,
    pub discount_percentage: i64,
}

impl<'a> From<&'a Room> for RoomView<'a> {
    fn from(room: &'a Room) -> Self {
        Self {
            room,
            savings: room.savings(),
            discount_percentage: room.discount_pct(),
        }
    }
}
