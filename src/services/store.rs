use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::db::queries;
use crate::models::{Analytics, Faq, Intent, Room};

pub trait RoomStore: Send + Sync {
    fn list_rooms(&self, available_only: bool) -> anyhow::Result<Vec<Room>>;
    fn find_room_by_type(&self, room_type: &str) -> anyhow::Result<Option<Room>>;
}

pub trait FaqStore: Send + Sync {
    fn search_faqs(&self, keyword: &str) -> anyhow::Result<Vec<Faq>>;
    fn list_faqs(&self, category: Option<&str>, limit: i64) -> anyhow::Result<Vec<Faq>>;
}

// Best-effort analytics sink. Callers log and drop failures.
pub trait QueryLogSink: Send + Sync {
    fn record(
        &self,
        query_text: &str,
        intent: Intent,
        confidence: f32,
        latency_ms: i64,
    ) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Arc<Mutex<Connection>> {
        &self.db
    }

    fn conn(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|_| anyhow::anyhow!("database mutex poisoned"))
    }

    pub fn analytics(&self, hours: i64, min_confidence: f64) -> anyhow::Result<Analytics> {
        let conn = self.conn()?;
        queries::get_analytics(&conn, hours, min_confidence)
    }
}

impl RoomStore for SqliteStore {
    fn list_rooms(&self, available_only: bool) -> anyhow::Result<Vec<Room>> {
        let conn = self.conn()?;
        queries::list_rooms(&conn, available_only)
    }

    fn find_room_by_type(&self, room_type: &str) -> anyhow::Result<Option<Room>> {
        let conn = self.conn()?;
        queries::find_room_by_type(&conn, room_type)
    }
}

impl FaqStore for SqliteStore {
    fn search_faqs(&self, keyword: &str) -> anyhow::Result<Vec<Faq>> {
        let conn = self.conn()?;
        queries::search_faqs(&conn, keyword)
    }

    fn list_faqs(&self, category: Option<&str>, limit: i64) -> anyhow::Result<Vec<Faq>> {
        let conn = self.conn()?;
        queries::list_faqs(&conn, category, limit)
    }
}

impl QueryLogSink for SqliteStore {
    fn record(
        &self,
        query_text: &str,
        intent: Intent,
        confidence: f32,
        latency_ms: i64,
    ) -> anyhow::Result<()> {
        let conn = self.conn()?;
        queries::insert_query_log(&conn, query_text, intent.as_str(), confidence, latency_ms)?;
        Ok(())
    }
}
