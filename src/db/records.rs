use chrono::Utc;
use serde::{Deserialize, Serialize};
use crate::errors::BenchError;
use crate::llm::types::{Prompt, ResponseRecord};
use super::Database;

/// Append-only log of completed requests.
pub trait RecordStore: Send + Sync {
    /// Insert one row and return its id. Never updates an existing row.
    fn append(&self, record: &ResponseRecord) -> Result<i64, BenchError>;

    /// Rows in insertion order.
    fn list(&self, limit: usize, offset: usize) -> Result<Vec<StoredRecord>, BenchError>;

    fn count(&self) -> Result<i64, BenchError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: i64,
    #[serde(flatten)]
    pub record: ResponseRecord,
    pub created_at: String,
}

impl RecordStore for Database {
    fn append(&self, record: &ResponseRecord) -> Result<i64, BenchError> {
        let prompt = serde_json::to_string(&record.prompt)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO responses (model, prompt, response, time_elapsed, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![record.model, prompt, record.response, record.time_elapsed, Utc::now().to_rfc3339()],
        ).map_err(|e| BenchError::Persistence(format!("Failed to insert record: {}", e)))?;
        Ok(conn.last_insert_rowid())
    }

    fn list(&self, limit: usize, offset: usize) -> Result<Vec<StoredRecord>, BenchError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, model, prompt, response, time_elapsed, created_at FROM responses ORDER BY id ASC LIMIT ?1 OFFSET ?2"
        ).map_err(|e| BenchError::Persistence(format!("Query failed: {}", e)))?;

        let rows = stmt.query_map(rusqlite::params![limit as i64, offset as i64], |row: &rusqlite::Row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, String>(5)?,
            ))
        }).map_err(|e| BenchError::Persistence(format!("Query failed: {}", e)))?;

        let mut records = Vec::new();
        for row in rows {
            let (id, model, prompt, response, time_elapsed, created_at) =
                row.map_err(|e| BenchError::Persistence(format!("Row read failed: {}", e)))?;
            let prompt: Prompt = serde_json::from_str(&prompt)?;
            records.push(StoredRecord {
                id,
                record: ResponseRecord { model, prompt, response, time_elapsed },
                created_at,
            });
        }
        Ok(records)
    }

    fn count(&self) -> Result<i64, BenchError> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM responses", [], |row| row.get(0))
            .map_err(|e| BenchError::Persistence(format!("Count failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::Turn;
    use std::time::Duration;

    fn sample(prompt: Prompt) -> ResponseRecord {
        ResponseRecord::new("gpt-4o-mini", &prompt, "Hello there".into(), Duration::from_millis(420))
    }

    #[test]
    fn test_round_trip_structured_prompt() {
        let db = Database::in_memory().unwrap();
        let record = sample(Prompt::Turns(vec![Turn::system("be brief"), Turn::user("hi")]));
        let id = db.append(&record).unwrap();

        let rows = db.list(10, 0).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert_eq!(rows[0].record.model, record.model);
        assert_eq!(rows[0].record.prompt, record.prompt);
        assert_eq!(rows[0].record.response, record.response);
        assert!(rows[0].record.time_elapsed > 0.0);
        assert!(!rows[0].created_at.is_empty());
    }

    #[test]
    fn test_round_trip_flat_prompt() {
        let db = Database::in_memory().unwrap();
        db.append(&sample(Prompt::Text("tell me a joke".into()))).unwrap();
        let rows = db.list(10, 0).unwrap();
        assert_eq!(rows[0].record.prompt, Prompt::Text("tell me a joke".into()));
    }

    #[test]
    fn test_same_record_twice_is_two_rows() {
        let db = Database::in_memory().unwrap();
        let record = sample(Prompt::Text("hi".into()));
        let first = db.append(&record).unwrap();
        let second = db.append(&record).unwrap();
        assert_ne!(first, second);
        assert_eq!(db.count().unwrap(), 2);
    }

    #[test]
    fn test_list_pagination_in_insertion_order() {
        let db = Database::in_memory().unwrap();
        for i in 0..5 {
            let mut record = sample(Prompt::Text("hi".into()));
            record.response = format!("answer {}", i);
            db.append(&record).unwrap();
        }
        let page = db.list(2, 1).unwrap();
        let responses: Vec<_> = page.iter().map(|r| r.record.response.as_str()).collect();
        assert_eq!(responses, vec!["answer 1", "answer 2"]);
    }

    #[test]
    fn test_concurrent_appends_all_land() {
        let db = Database::in_memory().unwrap();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db = db.clone();
                std::thread::spawn(move || db.append(&sample(Prompt::Text("hi".into()))).unwrap())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(db.count().unwrap(), 8);
    }

    #[test]
    fn test_stored_record_serializes_flat() {
        let db = Database::in_memory().unwrap();
        db.append(&sample(Prompt::Text("hi".into()))).unwrap();
        let value = serde_json::to_value(&db.list(1, 0).unwrap()[0]).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["prompt"], "hi");
        assert!(value.get("record").is_none());
    }
}
