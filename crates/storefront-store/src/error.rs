use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[cfg(feature = "mongodb")]
    #[error("Database error: {0}")]
    Database(mongodb::error::Error),
    
    #[cfg(feature = "mongodb")]
    #[error("BSON serialization error: {0}")]
    BsonSerialization(#[from] bson::ser::Error),
    
    #[cfg(feature = "mongodb")]
    #[error("BSON deserialization error: {0}")]
    BsonDeserialization(#[from] bson::de::Error),
    
    #[error("Row conversion error: {0}")]
    Serialization(#[from] serde_json::Error),
    
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    
    #[error("Validation failed: {0}")]
    Validation(String),
    
    /// The store accepted the call but returned no rows for a write
    #[error("Store returned no rows for {operation} on {table}")]
    WriteFailed { table: String, operation: &'static str },
    
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    
    #[error("Connection error: {0}")]
    Connection(String),
    
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound { entity, id: id.to_string() }
    }
    
    pub fn write_failed(table: &str, operation: &'static str) -> Self {
        Self::WriteFailed { table: table.to_string(), operation }
    }
    
    /// Whether the failure came from the backend being unreachable
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Unavailable(_) | Self::Connection(_) => true,
            #[cfg(feature = "mongodb")]
            Self::Database(_) => true,
            _ => false,
        }
    }
}

/// MongoDB server code for a unique index violation
#[cfg(feature = "mongodb")]
const DUPLICATE_KEY: i32 = 11000;

#[cfg(feature = "mongodb")]
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::InsertMany(e) => e
            .write_errors
            .as_ref()
            .is_some_and(|errors| errors.iter().any(|e| e.code == DUPLICATE_KEY)),
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

/// Unique constraint violations are caller errors, everything else is the backend's
#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        if is_duplicate_key(&err) {
            tracing::debug!(error = %err, "Unique constraint violated");
            Self::Validation("a row with the same unique value already exists".to_string())
        } else {
            Self::Database(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(all(test, feature = "mongodb"))]
mod tests {
    use super::*;
    use mongodb::error::{ErrorKind, WriteError, WriteFailure};

    fn write_error(code: i32) -> mongodb::error::Error {
        let error: WriteError = bson::from_document(bson::doc! {
            "code": code,
            "errmsg": "E11000 duplicate key error collection: storefront.labels",
        })
        .unwrap();
        mongodb::error::Error::from(ErrorKind::Write(WriteFailure::WriteError(error)))
    }

    #[test]
    fn test_duplicate_key_is_a_validation_error() {
        let err = StoreError::from(write_error(DUPLICATE_KEY));
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(!err.is_unavailable());
    }

    #[test]
    fn test_other_write_errors_stay_database_errors() {
        let err = StoreError::from(write_error(2));
        assert!(matches!(err, StoreError::Database(_)));
    }
}
