use dts_forge::ApiType;
use serde::{Deserialize, Serialize, Serializer};

/// Parameters for adding two numbers.
#[derive(ApiType, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AddParams {
    pub a: f64,
    pub b: f64,
}

/// Represents a product in the system.
#[derive(ApiType, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
#[api_type(nested(StockStatus))]
pub struct Product {
    pub id: String,
    pub product_code: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Category,
    pub tags: Vec<String>,
    pub status: StockStatus,
}

#[derive(ApiType, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    /// A category can have a parent, creating a recursive structure.
    pub parent: Option<Box<Category>>,
}

/// Availability of a product. Serialized as its numeric value, matching the
/// generated TypeScript enum.
#[derive(ApiType, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    InStock = 0,
    Backordered = 1,
    Discontinued = 2,
}

impl Serialize for StockStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(*self as i64)
    }
}

impl<'de> Deserialize<'de> for StockStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match i64::deserialize(deserializer)? {
            0 => Ok(StockStatus::InStock),
            1 => Ok(StockStatus::Backordered),
            2 => Ok(StockStatus::Discontinued),
            other => Err(serde::de::Error::custom(format!(
                "unknown stock status {}",
                other
            ))),
        }
    }
}

/// DTO for updating a product.
#[derive(ApiType, Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}

/// This is a sample DTO with a different naming convention.
#[derive(ApiType, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "snake_case")]
#[api_type(rename_all = "snake_case")]
pub struct LegacyData {
    pub user_id: String,
    pub transaction_amount: f64,
}
