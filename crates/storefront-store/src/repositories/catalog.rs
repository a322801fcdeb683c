use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::models::{
    Category, CategoryCreate, CategoryUpdate, LabelRow, Product, ProductCreate, ProductLabelRow,
    ProductRow, ProductSpecRow, ProductUpdate,
};
use crate::table::{from_row, from_rows, tables, Filter, Row, TableStore};

/// Catalog reads and writes over products, categories, labels and specs.
///
/// Product aggregates are assembled with one fetch per child table and an
/// in-memory merge, see [`merge_products`].
#[derive(Clone)]
pub struct CatalogRepository {
    store: Arc<dyn TableStore>,
}

impl CatalogRepository {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    // Products

    pub async fn create_product(&self, payload: ProductCreate) -> Result<Product> {
        payload.validate()?;

        let inserted = self
            .store
            .insert(tables::PRODUCTS, vec![payload.base_row(Utc::now())?])
            .await?;
        let row: ProductRow = inserted
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::write_failed(tables::PRODUCTS, "insert"))
            .and_then(from_row)?;

        self.insert_specs(row.id, &payload.specs).await?;
        self.link_labels(row.id, &payload.labels).await?;

        info!(product_id = row.id, name = %row.name, "Created product");
        self.get_product(row.id).await
    }

    pub async fn get_product(&self, id: i64) -> Result<Product> {
        self.find_product(id)
            .await?
            .ok_or_else(|| StoreError::not_found("Product", id))
    }

    pub async fn find_product(&self, id: i64) -> Result<Option<Product>> {
        let rows = self.fetch_rows(Filter::by_id(id)).await?;
        Ok(self.assemble(rows).await?.into_iter().next())
    }

    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = self.fetch_rows(Filter::all().order("id", false)).await?;
        self.assemble(rows).await
    }

    /// Products for the given ids in catalog order; unknown ids are skipped
    pub async fn products_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = self
            .fetch_rows(Filter::all().in_("id", ids.iter().copied()).order("id", false))
            .await?;
        self.assemble(rows).await
    }

    pub async fn products_by_category(&self, category_id: i64) -> Result<Vec<Product>> {
        let rows = self
            .fetch_rows(Filter::all().eq("category_id", category_id).order("id", false))
            .await?;
        self.assemble(rows).await
    }

    pub async fn products_by_label(&self, label: &str) -> Result<Vec<Product>> {
        let labels: Vec<LabelRow> =
            from_rows(self.store.select(tables::LABELS, &Filter::all().eq("name", label)).await?)?;
        let Some(label) = labels.into_iter().next() else {
            return Ok(Vec::new());
        };

        let links: Vec<ProductLabelRow> = from_rows(
            self.store
                .select(tables::PRODUCT_LABELS, &Filter::all().eq("label_id", label.id))
                .await?,
        )?;
        let ids: Vec<i64> = links.iter().map(|link| link.product_id).collect();
        self.products_by_ids(&ids).await
    }

    pub async fn update_product(&self, id: i64, payload: ProductUpdate) -> Result<Product> {
        payload.validate()?;
        if self.fetch_rows(Filter::by_id(id)).await?.is_empty() {
            return Err(StoreError::not_found("Product", id));
        }

        let mut patch = payload.base_patch()?;
        patch.insert("updated_at".to_string(), serde_json::to_value(Utc::now())?);
        let updated = self.store.update(tables::PRODUCTS, patch, &Filter::by_id(id)).await?;
        if updated.is_empty() {
            return Err(StoreError::write_failed(tables::PRODUCTS, "update"));
        }

        if let Some(specs) = &payload.specs {
            self.store
                .delete(tables::PRODUCT_SPECS, &Filter::all().eq("product_id", id))
                .await?;
            self.insert_specs(id, specs).await?;
        }
        if let Some(labels) = &payload.labels {
            self.store
                .delete(tables::PRODUCT_LABELS, &Filter::all().eq("product_id", id))
                .await?;
            self.link_labels(id, labels).await?;
        }

        info!(product_id = id, "Updated product");
        self.get_product(id).await
    }

    pub async fn delete_product(&self, id: i64) -> Result<()> {
        let removed = self.store.delete(tables::PRODUCTS, &Filter::by_id(id)).await?;
        if removed.is_empty() {
            return Err(StoreError::not_found("Product", id));
        }

        let children = Filter::all().eq("product_id", id);
        self.store.delete(tables::PRODUCT_SPECS, &children).await?;
        self.store.delete(tables::PRODUCT_LABELS, &children).await?;
        self.store.delete(tables::PRODUCT_RECOMMENDATIONS, &children).await?;

        info!(product_id = id, "Deleted product");
        Ok(())
    }

    /// Upsert labels by unique name and return them in request order
    pub async fn ensure_labels(&self, names: &[String]) -> Result<Vec<LabelRow>> {
        let mut unique: Vec<&str> = Vec::new();
        for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        if unique.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<Row> = unique.iter().map(|name| to_object(json!({ "name": name }))).collect();
        let stored = self.store.upsert(tables::LABELS, rows, &["name"]).await?;
        if stored.len() != unique.len() {
            return Err(StoreError::write_failed(tables::LABELS, "upsert"));
        }
        from_rows(stored)
    }

    async fn insert_specs(&self, product_id: i64, specs: &HashMap<String, String>) -> Result<()> {
        if specs.is_empty() {
            return Ok(());
        }
        let mut entries: Vec<(&String, &String)> = specs.iter().collect();
        entries.sort();
        let rows = entries
            .into_iter()
            .map(|(key, value)| {
                to_object(json!({ "product_id": product_id, "spec_key": key, "spec_value": value }))
            })
            .collect();
        let inserted = self.store.insert(tables::PRODUCT_SPECS, rows).await?;
        if inserted.is_empty() {
            return Err(StoreError::write_failed(tables::PRODUCT_SPECS, "insert"));
        }
        Ok(())
    }

    async fn link_labels(&self, product_id: i64, labels: &[String]) -> Result<()> {
        let labels = self.ensure_labels(labels).await?;
        if labels.is_empty() {
            return Ok(());
        }
        let rows = labels
            .iter()
            .map(|label| to_object(json!({ "product_id": product_id, "label_id": label.id })))
            .collect();
        let inserted = self.store.insert(tables::PRODUCT_LABELS, rows).await?;
        if inserted.is_empty() {
            return Err(StoreError::write_failed(tables::PRODUCT_LABELS, "insert"));
        }
        Ok(())
    }

    async fn fetch_rows(&self, filter: Filter) -> Result<Vec<ProductRow>> {
        from_rows(self.store.select(tables::PRODUCTS, &filter).await?)
    }

    /// Fetch child rows for `rows` and merge them into aggregates
    async fn assemble(&self, rows: Vec<ProductRow>) -> Result<Vec<Product>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let by_product = Filter::all().in_("product_id", ids.iter().copied()).order("id", false);

        let specs: Vec<ProductSpecRow> =
            from_rows(self.store.select(tables::PRODUCT_SPECS, &by_product).await?)?;
        let links: Vec<ProductLabelRow> =
            from_rows(self.store.select(tables::PRODUCT_LABELS, &by_product).await?)?;

        let labels: Vec<LabelRow> = if links.is_empty() {
            Vec::new()
        } else {
            let label_ids: Vec<i64> = links.iter().map(|link| link.label_id).collect();
            from_rows(
                self.store
                    .select(tables::LABELS, &Filter::all().in_("id", label_ids))
                    .await?,
            )?
        };

        debug!(
            products = rows.len(),
            specs = specs.len(),
            labels = links.len(),
            "Assembled product aggregates"
        );
        Ok(merge_products(rows, specs, links, labels))
    }

    // Categories

    pub async fn create_category(&self, payload: CategoryCreate) -> Result<Category> {
        payload.validate()?;
        let inserted = self
            .store
            .insert(tables::CATEGORIES, vec![payload.to_row(Utc::now())?])
            .await?;
        let category: Category = inserted
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::write_failed(tables::CATEGORIES, "insert"))
            .and_then(from_row)?;
        info!(category_id = category.id, name = %category.name, "Created category");
        Ok(category)
    }

    pub async fn get_category(&self, id: i64) -> Result<Category> {
        self.store
            .select(tables::CATEGORIES, &Filter::by_id(id))
            .await?
            .into_iter()
            .next()
            .map(from_row)
            .transpose()?
            .ok_or_else(|| StoreError::not_found("Category", id))
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        from_rows(
            self.store
                .select(tables::CATEGORIES, &Filter::all().order("id", false))
                .await?,
        )
    }

    pub async fn update_category(&self, id: i64, payload: CategoryUpdate) -> Result<Category> {
        payload.validate()?;
        let patch = payload.patch()?;
        if patch.is_empty() {
            return self.get_category(id).await;
        }

        let current = self.get_category(id).await?;
        let updated = self.store.update(tables::CATEGORIES, patch, &Filter::by_id(current.id)).await?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::write_failed(tables::CATEGORIES, "update"))
            .and_then(from_row)
    }

    pub async fn delete_category(&self, id: i64) -> Result<()> {
        let removed = self.store.delete(tables::CATEGORIES, &Filter::by_id(id)).await?;
        if removed.is_empty() {
            return Err(StoreError::not_found("Category", id));
        }
        info!(category_id = id, "Deleted category");
        Ok(())
    }
}

fn to_object(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

/// Merge base rows with their spec rows and label links.
///
/// Specs and labels keep the order of the child rows. Links to labels that
/// are missing from `labels` are dropped.
pub fn merge_products(
    rows: Vec<ProductRow>,
    specs: Vec<ProductSpecRow>,
    links: Vec<ProductLabelRow>,
    labels: Vec<LabelRow>,
) -> Vec<Product> {
    let label_names: HashMap<i64, String> =
        labels.into_iter().map(|label| (label.id, label.name)).collect();

    let mut specs_by_product: HashMap<i64, HashMap<String, String>> = HashMap::new();
    for spec in specs {
        specs_by_product
            .entry(spec.product_id)
            .or_default()
            .insert(spec.spec_key, spec.spec_value);
    }

    let mut labels_by_product: HashMap<i64, Vec<String>> = HashMap::new();
    for link in links {
        if let Some(name) = label_names.get(&link.label_id) {
            let names = labels_by_product.entry(link.product_id).or_default();
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
    }

    rows.into_iter()
        .map(|row| {
            let specs = specs_by_product.remove(&row.id).unwrap_or_default();
            let labels = labels_by_product.remove(&row.id).unwrap_or_default();
            Product::from_parts(row, specs, labels)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_row(id: i64) -> ProductRow {
        ProductRow {
            id,
            name: format!("product-{id}"),
            price: 10.0,
            description: None,
            stock: 1,
            category_id: None,
            image_url: None,
            rating: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_merge_assigns_children_to_their_products() {
        let specs = vec![
            ProductSpecRow { id: 1, product_id: 1, spec_key: "color".into(), spec_value: "red".into() },
            ProductSpecRow { id: 2, product_id: 2, spec_key: "size".into(), spec_value: "L".into() },
        ];
        let links = vec![
            ProductLabelRow { id: 1, product_id: 2, label_id: 10 },
            ProductLabelRow { id: 2, product_id: 2, label_id: 11 },
            ProductLabelRow { id: 3, product_id: 1, label_id: 99 },
        ];
        let labels = vec![
            LabelRow { id: 10, name: "sale".into() },
            LabelRow { id: 11, name: "new".into() },
        ];

        let products = merge_products(vec![product_row(1), product_row(2)], specs, links, labels);

        assert_eq!(products[0].specs.get("color").map(String::as_str), Some("red"));
        assert!(products[0].labels.is_empty());
        assert_eq!(products[1].labels, vec!["sale".to_string(), "new".to_string()]);
        assert_eq!(products[1].description, "");
    }
}
