use crate::config::AppConfig;
use crate::services::assistant::Assistant;
use crate::services::store::SqliteStore;
use crate::services::voice::Voice;

pub struct AppState {
    pub config: AppConfig,
    pub store: SqliteStore,
    pub assistant: Assistant,
    pub voice: Voice,
}
