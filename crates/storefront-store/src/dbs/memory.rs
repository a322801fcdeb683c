use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::table::{values_equal, Filter, Row, TableStore};

#[derive(Default)]
struct Table {
    rows: Vec<Row>,
    next_id: i64,
}

impl Table {
    fn assign_id(&mut self, row: &mut Row) {
        self.next_id += 1;
        row.insert("id".to_string(), Value::from(self.next_id));
    }
}

/// In-process table store. Used by tests and by the `memory` backend.
#[derive(Default)]
pub struct MemoryTableStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn conflict_key(row: &Row, conflict: &[&str]) -> Result<Vec<Value>> {
    conflict
        .iter()
        .map(|column| {
            row.get(*column)
                .cloned()
                .ok_or_else(|| StoreError::Validation(format!("upsert row is missing `{column}`")))
        })
        .collect()
}

fn same_key(row: &Row, conflict: &[&str], key: &[Value]) -> bool {
    conflict
        .iter()
        .zip(key)
        .all(|(column, value)| row.get(*column).is_some_and(|v| values_equal(v, value)))
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Row>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Row> = tables
            .get(table)
            .map(|t| t.rows.iter().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default();
        filter.arrange(&mut rows);
        Ok(rows)
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>> {
        let mut tables = self.tables.write().await;
        let entry = tables.entry(table.to_string()).or_default();
        let mut stored = Vec::with_capacity(rows.len());
        for mut row in rows {
            entry.assign_id(&mut row);
            entry.rows.push(row.clone());
            stored.push(row);
        }
        Ok(stored)
    }

    async fn upsert(&self, table: &str, rows: Vec<Row>, conflict: &[&str]) -> Result<Vec<Row>> {
        let mut tables = self.tables.write().await;
        let entry = tables.entry(table.to_string()).or_default();
        let mut stored = Vec::with_capacity(rows.len());
        for mut row in rows {
            row.remove("id");
            let key = conflict_key(&row, conflict)?;
            match entry.rows.iter_mut().find(|existing| same_key(existing, conflict, &key)) {
                Some(existing) => {
                    for (column, value) in row {
                        existing.insert(column, value);
                    }
                    stored.push(existing.clone());
                }
                None => {
                    entry.assign_id(&mut row);
                    entry.rows.push(row.clone());
                    stored.push(row);
                }
            }
        }
        Ok(stored)
    }

    async fn update(&self, table: &str, mut patch: Row, filter: &Filter) -> Result<Vec<Row>> {
        patch.remove("id");
        let mut tables = self.tables.write().await;
        let Some(entry) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };
        let mut updated = Vec::new();
        for row in entry.rows.iter_mut().filter(|r| filter.matches(r)) {
            for (column, value) in &patch {
                row.insert(column.clone(), value.clone());
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Row>> {
        let mut tables = self.tables.write().await;
        let Some(entry) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };
        let (removed, kept): (Vec<Row>, Vec<Row>) =
            entry.rows.drain(..).partition(|r| filter.matches(r));
        entry.rows = kept;
        Ok(removed)
    }
}
