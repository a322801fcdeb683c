use mongodb::bson::{self, doc, Bson, Document};

use crate::error::Result;
use crate::table::{Condition, Filter, Row};

pub fn row_to_document(row: &Row) -> Result<Document> {
    Ok(bson::to_document(row)?)
}

pub fn document_to_row(mut document: Document) -> Result<Row> {
    document.remove("_id");
    Ok(bson::from_document(document)?)
}

pub fn filter_to_document(filter: &Filter) -> Result<Document> {
    let mut document = Document::new();
    for condition in &filter.conditions {
        match condition {
            Condition::Eq(column, value) => {
                document.insert(column.as_str(), bson::to_bson(value)?);
            }
            Condition::In(column, values) => {
                let values = values
                    .iter()
                    .map(bson::to_bson)
                    .collect::<std::result::Result<Vec<Bson>, _>>()?;
                document.insert(column.as_str(), doc! { "$in": values });
            }
        }
    }
    Ok(document)
}

pub fn sort_document(filter: &Filter) -> Option<Document> {
    filter.order.as_ref().map(|order| {
        let direction = if order.descending { -1 } else { 1 };
        let mut sort = Document::new();
        sort.insert(order.column.clone(), direction);
        sort
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_conversion() {
        let filter = Filter::all().eq("user_id", 3).in_("product_id", vec![1, 2]);
        let document = filter_to_document(&filter).unwrap();
        assert_eq!(document.get_i64("user_id").unwrap(), 3);
        let membership = document.get_document("product_id").unwrap();
        assert_eq!(membership.get_array("$in").unwrap().len(), 2);
    }

    #[test]
    fn test_sort_direction() {
        let filter = Filter::all().order("score", true);
        assert_eq!(sort_document(&filter).unwrap().get_i32("score").unwrap(), -1);
    }
}
