use axum::extract::{Path, Query};
use axum::routing::get;
use axum::{Json, Router};
use dts_forge::controller;

use crate::dtos::{AddParams, Category, LegacyData, Product, ProductUpdate, StockStatus};

fn electronics() -> Category {
    Category {
        id: "cat-01".to_string(),
        name: "Electronics".to_string(),
        parent: None,
    }
}

pub struct ProductController;

#[controller]
impl ProductController {
    /// Get a product by its ID.
    #[action(GET)]
    pub async fn get_product(Path(id): Path<String>) -> Json<Product> {
        Json(Product {
            id,
            product_code: "P-12345".to_string(),
            name: "Example Product".to_string(),
            description: Some("This is a product from the mock handler.".to_string()),
            price: 99.99,
            category: electronics(),
            tags: vec!["featured".to_string()],
            status: StockStatus::InStock,
        })
    }

    /// A simple calculator that adds two numbers.
    #[action(GET)]
    pub async fn add(Query(params): Query<AddParams>) -> Json<f64> {
        Json(params.a + params.b)
    }

    #[action(GET)]
    pub async fn list_products() -> Json<Vec<Product>> {
        Json(vec![
            Product {
                id: "prod-001".to_string(),
                product_code: "P-12345".to_string(),
                name: "Example Product 1".to_string(),
                description: Some("This is product 1.".to_string()),
                price: 99.99,
                category: electronics(),
                tags: Vec::new(),
                status: StockStatus::InStock,
            },
            Product {
                id: "prod-002".to_string(),
                product_code: "P-67890".to_string(),
                name: "Example Product 2".to_string(),
                description: None,
                price: 149.99,
                category: Category {
                    id: "cat-02".to_string(),
                    name: "Books".to_string(),
                    parent: Some(Box::new(electronics())),
                },
                tags: vec!["paperback".to_string()],
                status: StockStatus::Backordered,
            },
        ])
    }

    /// Update a product's information.
    #[action(PATCH)]
    pub async fn update_product(
        Path(id): Path<String>,
        Json(payload): Json<ProductUpdate>,
    ) -> Json<Product> {
        Json(Product {
            id,
            product_code: "P-UPDATED".to_string(),
            name: payload.name.unwrap_or_else(|| "Old Name".to_string()),
            description: payload.description,
            price: payload.price.unwrap_or(0.0),
            category: electronics(),
            tags: Vec::new(),
            status: StockStatus::Discontinued,
        })
    }

    #[action(GET)]
    pub async fn legacy_data() -> Json<LegacyData> {
        Json(LegacyData {
            user_id: "user-123".to_string(),
            transaction_amount: 42.0,
        })
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/v1/add", get(ProductController::add))
        .route("/v1/products", get(ProductController::list_products))
        .route(
            "/v1/products/{id}",
            get(ProductController::get_product).patch(ProductController::update_product),
        )
        .route("/v1/legacy", get(ProductController::legacy_data))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use dts_forge::registry::inventory_catalog;
    use dts_forge::Generator;

    #[test]
    fn test_generates_product_declarations() {
        let dir = tempfile::tempdir().unwrap();
        Generator::new(inventory_catalog())
            .generate(dir.path())
            .unwrap();

        let dtos = dir.path().join("product_service").join("dtos");
        assert_eq!(
            fs::read_to_string(dtos.join("Product.d.ts")).unwrap(),
            "
export interface Product {
  id: string;
  productCode: string;
  name: string;
  description: string|null;
  price: number;
  category: Category;
  tags: string[];
  status: StockStatus;
}

export enum StockStatus {
  InStock = 0,
  Backordered = 1,
  Discontinued = 2,
}
"
        );
        assert_eq!(
            fs::read_to_string(dtos.join("Category.d.ts")).unwrap(),
            "
export interface Category {
  id: string;
  name: string;
  parent: Category|null;
}
"
        );
        assert!(dtos.join("AddParams.d.ts").exists());
        assert!(dtos.join("ProductUpdate.d.ts").exists());
        assert!(fs::read_to_string(dtos.join("LegacyData.d.ts"))
            .unwrap()
            .contains("  user_id: string;\n"));
    }
}
