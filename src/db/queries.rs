use rusqlite::{params, Connection, Row};

use crate::models::{
    Analytics, ConfidenceLevels, Faq, HourCount, IntentCount, IntentShare, LatencyPercentiles,
    PerformanceMetrics, QueryCount, Room,
};

// ── Rooms ──

const ROOM_COLUMNS: &str =
    "id, name, room_type, rack_rate, direct_rate, inventory, description, amenities, max_occupancy";

fn room_from_row(row: &Row<'_>) -> rusqlite::Result<Room> {
    Ok(Room {
        id: row.get(0)?,
        name: row.get(1)?,
        room_type: row.get(2)?,
        rack_rate: row.get(3)?,
        direct_rate: row.get(4)?,
        inventory: row.get(5)?,
        description: row.get(6)?,
        amenities: row.get(7)?,
        max_occupancy: row.get(8)?,
    })
}

// Rooms ordered by rack rate, cheapest first.
pub fn list_rooms(conn: &Connection, available_only: bool) -> anyhow::Result<Vec<Room>> {
    let sql = if available_only {
        format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE inventory > 0 ORDER BY rack_rate, id")
    } else {
        format!("SELECT {ROOM_COLUMNS} FROM rooms ORDER BY rack_rate, id")
    };

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], room_from_row)?;

    let mut rooms = vec![];
    for row in rows {
        rooms.push(row?);
    }
    Ok(rooms)
}

pub fn find_room_by_type(conn: &Connection, room_type: &str) -> anyhow::Result<Option<Room>> {
    let result = conn.query_row(
        &format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE room_type = ?1 AND inventory > 0 ORDER BY rack_rate LIMIT 1"
        ),
        params![room_type.to_lowercase()],
        room_from_row,
    );

    match result {
        Ok(room) => Ok(Some(room)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── FAQs ──

const FAQ_SEARCH_LIMIT: i64 = 5;

fn faq_from_row(row: &Row<'_>) -> rusqlite::Result<Faq> {
    Ok(Faq {
        question: row.get(0)?,
        answer: row.get(1)?,
        category: row.get(2)?,
    })
}

pub fn search_faqs(conn: &Connection, keyword: &str) -> anyhow::Result<Vec<Faq>> {
    let pattern = format!("%{keyword}%");
    let mut stmt = conn.prepare(
        "SELECT question, answer, category FROM faqs
         WHERE question LIKE ?1 OR answer LIKE ?1
         ORDER BY priority DESC, id
         LIMIT ?2",
    )?;

    let rows = stmt.query_map(params![pattern, FAQ_SEARCH_LIMIT], faq_from_row)?;

    let mut faqs = vec![];
    for row in rows {
        faqs.push(row?);
    }
    Ok(faqs)
}

pub fn list_faqs(conn: &Connection, category: Option<&str>, limit: i64) -> anyhow::Result<Vec<Faq>> {
    let mut stmt = conn.prepare(
        "SELECT question, answer, category FROM faqs
         WHERE ?1 IS NULL OR category = ?1
         ORDER BY priority DESC, id
         LIMIT ?2",
    )?;

    let rows = stmt.query_map(params![category, limit], faq_from_row)?;

    let mut faqs = vec![];
    for row in rows {
        faqs.push(row?);
    }
    Ok(faqs)
}

// ── Query Logs ──

pub fn insert_query_log(
    conn: &Connection,
    user_query: &str,
    intent: &str,
    confidence: f32,
    response_time_ms: i64,
) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO query_logs (user_query, intent, confidence, response_time_ms) VALUES (?1, ?2, ?3, ?4)",
        params![user_query, intent, confidence as f64, response_time_ms],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_analytics(conn: &Connection, hours: i64, min_confidence: f64) -> anyhow::Result<Analytics> {
    let window = format!("-{hours} hours");

    let total_queries: i64 =
        conn.query_row("SELECT COUNT(*) FROM query_logs", [], |row| row.get(0))?;

    let recent_queries: i64 = conn.query_row(
        "SELECT COUNT(*) FROM query_logs WHERE created_at >= datetime('now', ?1)",
        params![window],
        |row| row.get(0),
    )?;

    let (avg_confidence, avg_response_time_ms, min_response_time_ms, max_response_time_ms): (
        f64,
        f64,
        i64,
        i64,
    ) = conn.query_row(
        "SELECT COALESCE(AVG(confidence), 0.0),
                COALESCE(AVG(response_time_ms), 0.0),
                COALESCE(MIN(response_time_ms), 0),
                COALESCE(MAX(response_time_ms), 0)
         FROM query_logs",
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
    )?;

    let low_confidence_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM query_logs WHERE confidence < ?1",
        params![min_confidence],
        |row| row.get(0),
    )?;

    let error_rate = if total_queries > 0 {
        low_confidence_count as f64 / total_queries as f64 * 100.0
    } else {
        0.0
    };

    let mut stmt = conn.prepare(
        "SELECT intent, COUNT(*) as count FROM query_logs
         GROUP BY intent ORDER BY count DESC, intent LIMIT 5",
    )?;
    let top_intents = stmt
        .query_map([], |row| {
            Ok(IntentCount {
                intent: row.get(0)?,
                count: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare(
        "SELECT strftime('%H:00', created_at) as hour, COUNT(*) as count FROM query_logs
         WHERE created_at >= datetime('now', ?1)
         GROUP BY hour ORDER BY hour DESC LIMIT 24",
    )?;
    let hourly_stats = stmt
        .query_map(params![window], |row| {
            Ok(HourCount {
                hour: row.get(0)?,
                count: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare(
        "SELECT intent, COUNT(*) as count,
                ROUND(COUNT(*) * 100.0 / (SELECT COUNT(*) FROM query_logs), 1)
         FROM query_logs GROUP BY intent ORDER BY count DESC, intent",
    )?;
    let intent_distribution = stmt
        .query_map([], |row| {
            Ok(IntentShare {
                intent: row.get(0)?,
                count: row.get(1)?,
                percentage: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare(
        "SELECT MIN(user_query), COUNT(*) as count FROM query_logs
         GROUP BY LOWER(user_query) ORDER BY count DESC, MIN(id) LIMIT 5",
    )?;
    let common_queries = stmt
        .query_map([], |row| {
            Ok(QueryCount {
                query: row.get(0)?,
                count: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let performance = get_performance_metrics(conn, min_confidence)?;

    Ok(Analytics {
        total_queries,
        recent_queries,
        avg_confidence: round_to(avg_confidence, 2),
        avg_response_time_ms: avg_response_time_ms.round(),
        min_response_time_ms,
        max_response_time_ms,
        low_confidence_count,
        error_rate: round_to(error_rate, 1),
        top_intents,
        hourly_stats,
        intent_distribution,
        common_queries,
        performance,
    })
}

const HIGH_CONFIDENCE: f64 = 0.8;

// Nearest-rank percentiles: the largest latency whose rank is within the fraction.
// Below that rank a percentile reports 0.
pub fn get_performance_metrics(
    conn: &Connection,
    min_confidence: f64,
) -> anyhow::Result<PerformanceMetrics> {
    let response_time_percentiles = conn.query_row(
        "SELECT COALESCE(MIN(response_time_ms), 0),
                COALESCE(MAX(CASE WHEN row_num <= total * 0.5 THEN response_time_ms END), 0),
                COALESCE(MAX(CASE WHEN row_num <= total * 0.95 THEN response_time_ms END), 0),
                COALESCE(MAX(CASE WHEN row_num <= total * 0.99 THEN response_time_ms END), 0),
                COALESCE(MAX(response_time_ms), 0)
         FROM (
             SELECT response_time_ms,
                    ROW_NUMBER() OVER (ORDER BY response_time_ms) as row_num,
                    COUNT(*) OVER () as total
             FROM query_logs
         )",
        [],
        |row| {
            Ok(LatencyPercentiles {
                min: row.get(0)?,
                p50: row.get(1)?,
                p95: row.get(2)?,
                p99: row.get(3)?,
                max: row.get(4)?,
            })
        },
    )?;

    let confidence_distribution = conn.query_row(
        "SELECT COALESCE(SUM(CASE WHEN confidence >= ?1 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN confidence >= ?2 AND confidence < ?1 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN confidence < ?2 THEN 1 ELSE 0 END), 0)
         FROM query_logs",
        params![HIGH_CONFIDENCE, min_confidence],
        |row| {
            Ok(ConfidenceLevels {
                high: row.get(0)?,
                medium: row.get(1)?,
                low: row.get(2)?,
            })
        },
    )?;

    Ok(PerformanceMetrics {
        response_time_percentiles,
        confidence_distribution,
    })
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;

    #[test]
    fn test_list_rooms_orders_by_rack_rate() {
        let conn = init_db(":memory:").unwrap();
        let rooms = list_rooms(&conn, false).unwrap();
        let names: Vec<&str> = rooms.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Standard Room", "Deluxe Room", "Executive Room", "Suite Room"]
        );
    }

    #[test]
    fn test_list_rooms_available_only_skips_sold_out() {
        let conn = init_db(":memory:").unwrap();
        conn.execute("UPDATE rooms SET inventory = 0 WHERE room_type = 'suite'", [])
            .unwrap();

        assert_eq!(list_rooms(&conn, true).unwrap().len(), 3);
        assert_eq!(list_rooms(&conn, false).unwrap().len(), 4);
        assert!(find_room_by_type(&conn, "suite").unwrap().is_none());
        assert!(find_room_by_type(&conn, "Deluxe").unwrap().is_some());
    }

    #[test]
    fn test_search_faqs_priority_order() {
        let conn = init_db(":memory:").unwrap();
        let faqs = search_faqs(&conn, "check-in").unwrap();
        // Both the check-in and cancellation answers mention "check-in"; both have priority 10.
        assert_eq!(faqs.len(), 2);
        assert_eq!(faqs[0].question, "What is the check-in time?");

        let faqs = search_faqs(&conn, "wifi").unwrap();
        assert_eq!(faqs[0].question, "Is WiFi free?");
    }

    #[test]
    fn test_list_faqs_by_category() {
        let conn = init_db(":memory:").unwrap();
        let faqs = list_faqs(&conn, Some("policies"), 10).unwrap();
        assert_eq!(faqs.len(), 3);
        assert!(faqs.iter().all(|f| f.category.as_deref() == Some("policies")));

        let all = list_faqs(&conn, None, 3).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_analytics_empty() {
        let conn = init_db(":memory:").unwrap();
        let analytics = get_analytics(&conn, 24, 0.5).unwrap();
        assert_eq!(analytics.total_queries, 0);
        assert_eq!(analytics.error_rate, 0.0);
        assert!(analytics.top_intents.is_empty());
        assert!(analytics.hourly_stats.is_empty());
        assert_eq!(analytics.performance, PerformanceMetrics::default());
    }

    #[test]
    fn test_analytics_aggregates() {
        let conn = init_db(":memory:").unwrap();
        insert_query_log(&conn, "hi", "greeting", 0.5, 10).unwrap();
        insert_query_log(&conn, "Hi", "greeting", 0.5, 20).unwrap();
        insert_query_log(&conn, "asdf", "unknown", 0.0, 30).unwrap();
        insert_query_log(&conn, "rates?", "query_prices", 0.25, 40).unwrap();

        let analytics = get_analytics(&conn, 24, 0.5).unwrap();
        assert_eq!(analytics.total_queries, 4);
        assert_eq!(analytics.recent_queries, 4);
        assert_eq!(analytics.min_response_time_ms, 10);
        assert_eq!(analytics.max_response_time_ms, 40);
        assert_eq!(analytics.avg_response_time_ms, 25.0);
        assert_eq!(analytics.low_confidence_count, 2);
        assert_eq!(analytics.error_rate, 50.0);
        assert_eq!(analytics.top_intents[0].intent, "greeting");
        assert_eq!(analytics.top_intents[0].count, 2);
        assert_eq!(analytics.intent_distribution[0].percentage, 50.0);
        assert_eq!(analytics.common_queries[0].count, 2);
        assert_eq!(analytics.hourly_stats.len(), 1);
        assert_eq!(analytics.hourly_stats[0].count, 4);
    }

    #[test]
    fn test_hourly_stats_respect_window() {
        let conn = init_db(":memory:").unwrap();
        insert_query_log(&conn, "hi", "greeting", 1.0, 10).unwrap();
        conn.execute(
            "INSERT INTO query_logs (user_query, intent, confidence, response_time_ms, created_at)
             VALUES ('old', 'greeting', 1.0, 10, datetime('now', '-3 days'))",
            [],
        )
        .unwrap();

        let analytics = get_analytics(&conn, 24, 0.5).unwrap();
        assert_eq!(analytics.total_queries, 2);
        assert_eq!(analytics.recent_queries, 1);
        let hourly_total: i64 = analytics.hourly_stats.iter().map(|h| h.count).sum();
        assert_eq!(hourly_total, 1);
        assert!(analytics.hourly_stats[0].hour.ends_with(":00"));
    }

    #[test]
    fn test_performance_metrics() {
        let conn = init_db(":memory:").unwrap();
        for (i, ms) in (10..=100).step_by(10).enumerate() {
            let confidence = match i {
                0..=3 => 0.9,
                4..=6 => 0.6,
                _ => 0.2,
            };
            insert_query_log(&conn, "q", "greeting", confidence, ms).unwrap();
        }

        let metrics = get_performance_metrics(&conn, 0.5).unwrap();
        assert_eq!(
            metrics.response_time_percentiles,
            LatencyPercentiles {
                min: 10,
                p50: 50,
                p95: 90,
                p99: 90,
                max: 100,
            }
        );
        assert_eq!(
            metrics.confidence_distribution,
            ConfidenceLevels {
                high: 4,
                medium: 3,
                low: 3,
            }
        );
    }
}
