//! Catalog domain models.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Product category as sold in the shop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Ammunition,
    Magazine,
    Accessory,
    Gear,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Ammunition => "ammunition",
            ProductCategory::Magazine => "magazine",
            ProductCategory::Accessory => "accessory",
            ProductCategory::Gear => "gear",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ammunition" => Ok(ProductCategory::Ammunition),
            "magazine" => Ok(ProductCategory::Magazine),
            "accessory" => Ok(ProductCategory::Accessory),
            "gear" => Ok(ProductCategory::Gear),
            other => Err(Error::invalid_input(format!(
                "Unknown product category '{}'",
                other
            ))),
        }
    }
}

/// Domain model representing a catalog product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: ProductCategory,
    pub caliber: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input model for creating or replacing a product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: ProductCategory,
    pub caliber: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub stock_quantity: i32,
    pub image_url: Option<String>,
}

impl NewProduct {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::missing_field("id"));
        }
        if self.name.trim().is_empty() {
            return Err(Error::missing_field("name"));
        }
        if self.price.is_sign_negative() {
            return Err(Error::invalid_input(format!(
                "Product '{}' has a negative price",
                self.id
            )));
        }
        Ok(())
    }
}

/// Unit price lookup keyed by product id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceCatalog {
    prices: HashMap<String, Decimal>,
}

impl PriceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, product_id: impl Into<String>, unit_price: Decimal) {
        self.prices.insert(product_id.into(), unit_price);
    }

    /// Returns the unit price of a product, or `None` if it is not in the catalog.
    pub fn unit_price(&self, product_id: &str) -> Option<Decimal> {
        self.prices.get(product_id).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl FromIterator<(String, Decimal)> for PriceCatalog {
    fn from_iter<I: IntoIterator<Item = (String, Decimal)>>(iter: I) -> Self {
        PriceCatalog {
            prices: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a Product> for PriceCatalog {
    fn from_iter<I: IntoIterator<Item = &'a Product>>(iter: I) -> Self {
        iter.into_iter()
            .map(|product| (product.id.clone(), product.price))
            .collect()
    }
}
