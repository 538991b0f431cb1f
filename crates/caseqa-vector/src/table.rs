//! LanceDB connection and housekeeping helpers.
//!
//! Provides database open functions, an ensure-table helper, row counting,
//! best-effort clearing and a cheap id peek used by the inspect command.

use anyhow::Result;
use arrow_array::{RecordBatch, RecordBatchIterator, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection};
use std::sync::Arc;
use tracing::{debug, info};

pub async fn open_db(uri: &str) -> Result<Connection> {
    Ok(connect(uri).execute().await?)
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    Ok(conn.table_names().execute().await?.iter().any(|n| n == name))
}

pub async fn ensure_table(conn: &Connection, name: &str, schema: Arc<arrow_schema::Schema>) -> Result<()> {
    if table_exists(conn, name).await? {
        return Ok(());
    }
    // create empty table with 0 rows
    let empty = RecordBatch::new_empty(schema.clone());
    let iter = RecordBatchIterator::new(vec![Ok(empty)], schema);
    conn.create_table(name, iter).execute().await?;
    debug!("Created empty table '{}'", name);
    Ok(())
}

pub async fn count_rows(conn: &Connection, name: &str) -> Result<usize> {
    if !table_exists(conn, name).await? { return Ok(0); }
    let t = conn.open_table(name).execute().await?;
    Ok(t.count_rows(None).await?)
}

/// Delete every row of `name`. Failures are logged and swallowed: the insert
/// that follows succeeds or fails on its own.
pub async fn clear_table(conn: &Connection, name: &str) {
    let existing = match count_rows(conn, name).await {
        Ok(n) => n,
        Err(e) => { debug!("Could not count '{}' before clearing: {}", name, e); return; }
    };
    if existing == 0 { return; }
    let result = async {
        let t = conn.open_table(name).execute().await?;
        t.delete("id IS NOT NULL").await?;
        anyhow::Ok(())
    }
    .await;
    match result {
        Ok(()) => info!("Cleared collection '{}' ({} documents removed)", name, existing),
        Err(e) => debug!("Clearing '{}' failed, continuing: {}", name, e),
    }
}

/// Up to `n` ids in storage order.
pub async fn peek_ids(conn: &Connection, name: &str, n: usize) -> Result<Vec<String>> {
    if !table_exists(conn, name).await? { return Ok(Vec::new()); }
    let t = conn.open_table(name).execute().await?;
    let mut stream = t.query().limit(n).execute().await?;
    let mut ids = Vec::new();
    while let Some(batch) = stream.try_next().await? {
        let col = batch
            .column_by_name("id")
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())
            .ok_or_else(|| anyhow::anyhow!("'{}' has no utf8 id column", name))?;
        ids.extend((0..batch.num_rows()).map(|i| col.value(i).to_string()));
    }
    ids.truncate(n);
    Ok(ids)
}
