use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Result, StoreError};
use crate::table::{to_row, Row};

/// Base `products` row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSpecRow {
    pub id: i64,
    pub product_id: i64,
    pub spec_key: String,
    pub spec_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLabelRow {
    pub id: i64,
    pub product_id: i64,
    pub label_id: i64,
}

/// Product aggregate: base row merged with its specs and label names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub specs: HashMap<String, String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn from_parts(row: ProductRow, specs: HashMap<String, String>, labels: Vec<String>) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            description: row.description.unwrap_or_default(),
            stock: row.stock,
            category_id: row.category_id,
            image_url: row.image_url,
            rating: row.rating,
            specs,
            labels,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(StoreError::Validation(format!("price must be a non-negative number, got {price}")));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(StoreError::Validation("name must not be empty".to_string()));
    }
    Ok(())
}

fn validate_stock(stock: i64) -> Result<()> {
    if stock < 0 {
        return Err(StoreError::Validation(format!("stock must be non-negative, got {stock}")));
    }
    Ok(())
}

fn validate_specs(specs: &HashMap<String, String>) -> Result<()> {
    if specs.keys().any(|key| key.trim().is_empty()) {
        return Err(StoreError::Validation("spec keys must not be empty".to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub specs: HashMap<String, String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl ProductCreate {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_price(self.price)?;
        validate_stock(self.stock)?;
        validate_specs(&self.specs)
    }

    /// Row for the `products` table, without child relations
    pub fn base_row(&self, now: DateTime<Utc>) -> Result<Row> {
        #[derive(Serialize)]
        struct Base<'a> {
            name: &'a str,
            price: f64,
            description: &'a Option<String>,
            stock: i64,
            category_id: Option<i64>,
            image_url: &'a Option<String>,
            rating: Option<f64>,
            created_at: DateTime<Utc>,
            updated_at: DateTime<Utc>,
        }

        to_row(&Base {
            name: &self.name,
            price: self.price,
            description: &self.description,
            stock: self.stock,
            category_id: self.category_id,
            image_url: &self.image_url,
            rating: self.rating,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update. Absent fields are left untouched; `specs` and `labels`,
/// when present, replace the existing child rows entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specs: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl ProductUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(stock) = self.stock {
            validate_stock(stock)?;
        }
        if let Some(specs) = &self.specs {
            validate_specs(specs)?;
        }
        Ok(())
    }

    /// Patch for the base row; empty when only child relations change
    pub fn base_patch(&self) -> Result<Row> {
        let mut patch = to_row(self)?;
        patch.remove("specs");
        patch.remove("labels");
        Ok(patch)
    }
}
