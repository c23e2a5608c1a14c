//! Product Model

use serde::{Deserialize, Serialize};

/// Product name in the three storefront languages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalizedName {
    pub en: String,
    pub hi: String,
    pub bn: String,
}

impl LocalizedName {
    pub fn new(en: impl Into<String>, hi: impl Into<String>, bn: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            hi: hi.into(),
            bn: bn.into(),
        }
    }
}

/// Catalog product entity (reference data, read-only for the core)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: LocalizedName,
    /// Base price per `base_unit`, whole rupees
    pub price: i64,
    /// Strike-through price, if discounted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_price: Option<i64>,
    pub image: String,
    pub gallery: Vec<String>,
    pub category: String,
    pub description: String,
    pub in_stock: bool,
    pub rating: f32,
    pub reviews: u32,
    /// e.g. "kg", "pc", "bunch"
    pub base_unit: String,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_organic: bool,
    #[serde(default)]
    pub is_local: bool,
}
