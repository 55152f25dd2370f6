pub mod analytics;
pub mod faq;
pub mod intent;
pub mod room;

pub use analytics::{
    Analytics, ConfidenceLevels, HourCount, IntentCount, IntentShare, LatencyPercentiles,
    PerformanceMetrics, QueryCount,
};
pub use faq::Faq;
pub use intent::{Entity, Intent, NluResult, ROOM_TYPE};
pub use room::{Room, RoomView};
