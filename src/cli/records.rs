use crate::cli::commands::RecordsArgs;
use crate::config::BenchConfig;
use crate::db::{Database, RecordStore, StoredRecord};
use crate::errors::BenchError;
use crate::utils::formatting::format_duration;

pub async fn handle_records(args: RecordsArgs, config: BenchConfig) -> Result<(), BenchError> {
    let path = args.db.unwrap_or(config.storage.path);
    let (limit, offset) = (args.limit, args.offset);

    let (records, total) = tokio::task::spawn_blocking(move || -> Result<_, BenchError> {
        let db = Database::new(&path)?;
        Ok((db.list(limit, offset)?, db.count()?))
    })
    .await
    .map_err(|e| BenchError::Internal(format!("Record query task failed: {}", e)))??;

    if args.table {
        print!("{}", render_table(&records));
        println!("{} of {} records", records.len(), total);
    } else {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({
            "records": records,
            "total": total,
        }))?);
    }
    Ok(())
}

fn render_table(records: &[StoredRecord]) -> String {
    let mut out = format!("{:<6} {:<28} {:>8}  {}\n", "ID", "MODEL", "ELAPSED", "RESPONSE");
    for row in records {
        let preview: String = row.record.response
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(60)
            .collect();
        out.push_str(&format!(
            "{:<6} {:<28} {:>8}  {}\n",
            row.id,
            row.record.model,
            format_duration((row.record.time_elapsed * 1000.0) as u64),
            preview,
        ));
    }
    out
}
