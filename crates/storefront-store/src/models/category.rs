use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::table::{to_row, Row};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CategoryCreate {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(StoreError::Validation("category name must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn to_row(&self, now: DateTime<Utc>) -> Result<Row> {
        let mut row = to_row(self)?;
        row.insert("created_at".to_string(), serde_json::to_value(now)?);
        Ok(row)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CategoryUpdate {
    pub fn validate(&self) -> Result<()> {
        match &self.name {
            Some(name) if name.trim().is_empty() => Err(StoreError::Validation(
                "category name must not be empty".to_string(),
            )),
            _ => Ok(()),
        }
    }

    pub fn patch(&self) -> Result<Row> {
        to_row(self)
    }
}
