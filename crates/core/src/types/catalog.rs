//! Product catalog records and queries.
//!
//! The catalog is a document collection: every product is an id plus a bag of
//! fields. Only `gender` and `subcategory` are interpreted (for filtering);
//! all other fields pass through to callers untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::id::ProductId;

/// Document field holding the audience a product is listed under.
pub const GENDER_FIELD: &str = "gender";

/// Document field holding the product's category within a gender.
pub const SUBCATEGORY_FIELD: &str = "subcategory";

/// A product document: identifier plus its fields.
///
/// Serializes flat, e.g. `{"id": "p1", "name": "...", "gender": "women"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ProductRecord {
    /// Build a record from a stored document.
    ///
    /// A stray `id` key inside the document body is dropped; the document
    /// identifier always wins.
    #[must_use]
    pub fn from_document(id: impl Into<ProductId>, mut fields: Map<String, Value>) -> Self {
        fields.remove("id");
        Self {
            id: id.into(),
            fields,
        }
    }

    /// A string-valued field, if present.
    #[must_use]
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Whether this record satisfies `query`.
    #[must_use]
    pub fn matches(&self, query: &CatalogQuery) -> bool {
        match query {
            CatalogQuery::All => true,
            CatalogQuery::ByCategory {
                gender,
                subcategory,
            } => {
                self.field_str(GENDER_FIELD) == Some(gender.as_str())
                    && subcategory
                        .as_deref()
                        .is_none_or(|sub| self.field_str(SUBCATEGORY_FIELD) == Some(sub))
            }
        }
    }
}

/// A catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CatalogQuery {
    /// Every product.
    All,
    /// Equality on `gender`, and on `subcategory` when given.
    ByCategory {
        gender: String,
        subcategory: Option<String>,
    },
}

impl CatalogQuery {
    /// Query by gender and optional category.
    ///
    /// An empty category string is treated as no category.
    #[must_use]
    pub fn by_category(gender: impl Into<String>, category: Option<&str>) -> Self {
        Self::ByCategory {
            gender: gender.into(),
            subcategory: category.filter(|c| !c.is_empty()).map(str::to_owned),
        }
    }
}
