use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use serde_json::Value;

use super::convert::{document_to_row, filter_to_document, row_to_document, sort_document};
use crate::error::{Result, StoreError};
use crate::table::{tables, Filter, Row, TableStore};

const COUNTERS: &str = "counters";

/// Table store backed by one MongoDB collection per table.
///
/// Integer ids come from a `counters` collection so rows keep the
/// relational `id` column the rest of the crate relies on.
pub struct MongoTableStore {
    database: Database,
}

/// Unique keys per table: every `id`, plus the conflict columns upserts rely on
fn unique_indexes() -> Vec<(&'static str, Document)> {
    let mut indexes: Vec<(&'static str, Document)> =
        tables::ALL.iter().map(|table| (*table, doc! { "id": 1 })).collect();
    indexes.push((tables::LABELS, doc! { "name": 1 }));
    indexes.push((tables::PRODUCT_RECOMMENDATIONS, doc! { "product_id": 1 }));
    indexes.push((tables::USER_VIEWS, doc! { "user_id": 1, "product_id": 1 }));
    indexes
}

impl MongoTableStore {
    /// Connect to MongoDB and make sure the unique indexes exist
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = Self { database: client.database(database) };
        store.ensure_indexes().await?;
        Ok(store)
    }

    fn collection(&self, table: &str) -> Collection<Document> {
        self.database.collection(table)
    }

    async fn ensure_indexes(&self) -> Result<()> {
        for (table, keys) in unique_indexes() {
            self.create_unique_index(table, keys).await?;
        }
        Ok(())
    }

    async fn create_unique_index(&self, table: &str, keys: Document) -> Result<()> {
        let index = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection(table).create_index(index).await?;
        Ok(())
    }

    /// Reserve `count` consecutive ids and return the first one
    async fn reserve_ids(&self, table: &str, count: i64) -> Result<i64> {
        let counter = self
            .database
            .collection::<Document>(COUNTERS)
            .find_one_and_update(doc! { "_id": table }, doc! { "$inc": { "seq": count } })
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| StoreError::write_failed(COUNTERS, "reserve_ids"))?;

        let last = match counter.get("seq") {
            Some(Bson::Int64(n)) => *n,
            Some(Bson::Int32(n)) => i64::from(*n),
            _ => return Err(StoreError::Internal(format!("counter for {table} is not an integer"))),
        };
        Ok(last - count + 1)
    }

    async fn find_rows(&self, table: &str, filter: &Filter) -> Result<Vec<Row>> {
        let collection = self.collection(table);
        let mut find = collection
            .find(filter_to_document(filter)?)
            .projection(doc! { "_id": 0 });
        if let Some(sort) = sort_document(filter) {
            find = find.sort(sort);
        }
        if let Some(limit) = filter.limit {
            find = find.limit(limit as i64);
        }

        let documents: Vec<Document> = find.await?.try_collect().await?;
        documents.into_iter().map(document_to_row).collect()
    }
}

#[async_trait]
impl TableStore for MongoTableStore {
    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Row>> {
        self.find_rows(table, filter).await
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let first_id = self.reserve_ids(table, rows.len() as i64).await?;
        let rows: Vec<Row> = rows
            .into_iter()
            .zip(first_id..)
            .map(|(mut row, id)| {
                row.insert("id".to_string(), Value::from(id));
                row
            })
            .collect();

        let documents = rows.iter().map(row_to_document).collect::<Result<Vec<_>>>()?;
        self.collection(table).insert_many(documents).await?;
        Ok(rows)
    }

    async fn upsert(&self, table: &str, rows: Vec<Row>, conflict: &[&str]) -> Result<Vec<Row>> {
        let mut stored = Vec::with_capacity(rows.len());
        for mut row in rows {
            row.remove("id");

            let mut key = Filter::all();
            for column in conflict {
                let value = row.get(*column).cloned().ok_or_else(|| {
                    StoreError::Validation(format!("upsert row is missing `{column}`"))
                })?;
                key = key.eq(*column, value);
            }
            let key_document = filter_to_document(&key)?;

            let existing = self
                .collection(table)
                .find_one(key_document.clone())
                .projection(doc! { "id": 1 })
                .await?;

            let mut update = doc! { "$set": row_to_document(&row)? };
            if existing.is_none() {
                let id = self.reserve_ids(table, 1).await?;
                update.insert("$setOnInsert", doc! { "id": id });
            }

            self.collection(table)
                .update_one(key_document, update)
                .upsert(true)
                .await?;

            let mut current = self.find_rows(table, &key.limit(1)).await?;
            let row = current
                .pop()
                .ok_or_else(|| StoreError::write_failed(table, "upsert"))?;
            stored.push(row);
        }
        Ok(stored)
    }

    async fn update(&self, table: &str, mut patch: Row, filter: &Filter) -> Result<Vec<Row>> {
        patch.remove("id");
        let ids: Vec<Value> = self
            .find_rows(table, filter)
            .await?
            .into_iter()
            .filter_map(|row| row.get("id").cloned())
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let by_ids = Filter::all().in_("id", ids);
        self.collection(table)
            .update_many(filter_to_document(&by_ids)?, doc! { "$set": row_to_document(&patch)? })
            .await?;
        self.find_rows(table, &by_ids).await
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Row>> {
        let removed = self.find_rows(table, filter).await?;
        if removed.is_empty() {
            return Ok(removed);
        }

        let ids: Vec<Value> = removed.iter().filter_map(|row| row.get("id").cloned()).collect();
        self.collection(table)
            .delete_many(filter_to_document(&Filter::all().in_("id", ids))?)
            .await?;
        Ok(removed)
    }

    async fn health_check(&self) -> Result<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_indexes_cover_upsert_conflict_columns() {
        let indexes = unique_indexes();
        let has = |table: &str, key: &str| {
            indexes.iter().any(|(t, keys)| *t == table && keys.contains_key(key))
        };

        assert!(tables::ALL.iter().all(|table| has(table, "id")));
        assert!(has(tables::LABELS, "name"));
        assert!(has(tables::PRODUCT_RECOMMENDATIONS, "product_id"));
        assert!(has(tables::USER_VIEWS, "product_id"));
        // category names may repeat, as in the in-memory store
        assert!(!has(tables::CATEGORIES, "name"));
    }
}
