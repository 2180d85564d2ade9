use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use quoterack_api::{app, AppState};
use quoterack_core::pricing;
use quoterack_core::{
    CatalogError, CatalogRepository, PriceQuote, Product, ProductDraft, ProductSummary, QuoteDraft,
};

/// In-memory stand-in for the SQL backends, implementing the same
/// contract: name uniqueness, cascade delete, ordering, validation.
#[derive(Default)]
struct MemoryCatalog {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    products: BTreeMap<i64, Product>,
    quotes: BTreeMap<i64, PriceQuote>,
    next_product_id: i64,
    next_quote_id: i64,
}

impl MemoryCatalog {
    fn quote_count(&self) -> usize {
        self.inner.lock().unwrap().quotes.len()
    }
}

#[async_trait]
impl CatalogRepository for MemoryCatalog {
    async fn list_products(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<ProductSummary>, CatalogError> {
        let inner = self.inner.lock().unwrap();
        let term = search
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);
        let mut summaries: Vec<ProductSummary> = inner
            .products
            .values()
            .filter(|p| match &term {
                Some(term) => {
                    p.name.to_lowercase().contains(term)
                        || p.description
                            .as_deref()
                            .is_some_and(|d| d.to_lowercase().contains(term))
                }
                None => true,
            })
            .map(|p| {
                let quotes: Vec<PriceQuote> = inner
                    .quotes
                    .values()
                    .filter(|q| q.product_id == p.id)
                    .cloned()
                    .collect();
                let cheapest = pricing::cheapest_quote(&quotes);
                ProductSummary {
                    id: p.id,
                    name: p.name.clone(),
                    description: p.description.clone(),
                    units_per_box: p.units_per_box,
                    cheapest_price: cheapest.map(|q| q.price),
                    cheapest_supplier: cheapest.map(|q| q.supplier.clone()),
                    unit_price: None,
                }
            })
            .collect();
        summaries.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        pricing::attach_unit_prices(&mut summaries);
        Ok(summaries)
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>, CatalogError> {
        Ok(self.inner.lock().unwrap().products.get(&id).cloned())
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<Product, CatalogError> {
        draft.validate()?;
        let mut inner = self.inner.lock().unwrap();
        let name = draft.normalized_name().to_string();
        if inner.products.values().any(|p| p.name == name) {
            return Err(CatalogError::DuplicateName(name));
        }
        inner.next_product_id += 1;
        let product = Product {
            id: inner.next_product_id,
            name,
            description: draft.description.clone(),
            units_per_box: draft.units_per_box,
        };
        inner.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: i64, draft: &ProductDraft) -> Result<Product, CatalogError> {
        draft.validate()?;
        let mut inner = self.inner.lock().unwrap();
        let name = draft.normalized_name().to_string();
        if inner.products.values().any(|p| p.id != id && p.name == name) {
            return Err(CatalogError::DuplicateName(name));
        }
        let product = inner
            .products
            .get_mut(&id)
            .ok_or_else(|| CatalogError::product_not_found(id))?;
        product.name = name;
        product.description = draft.description.clone();
        product.units_per_box = draft.units_per_box;
        Ok(product.clone())
    }

    async fn delete_product(&self, id: i64) -> Result<(), CatalogError> {
        let mut inner = self.inner.lock().unwrap();
        inner.products.remove(&id);
        inner.quotes.retain(|_, q| q.product_id != id);
        Ok(())
    }

    async fn quotes_for_product(&self, product_id: i64) -> Result<Vec<PriceQuote>, CatalogError> {
        let inner = self.inner.lock().unwrap();
        let mut quotes: Vec<PriceQuote> = inner
            .quotes
            .values()
            .filter(|q| q.product_id == product_id)
            .cloned()
            .collect();
        quotes.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at).then(b.id.cmp(&a.id)));
        Ok(quotes)
    }

    async fn add_quote(
        &self,
        product_id: i64,
        draft: &QuoteDraft,
    ) -> Result<PriceQuote, CatalogError> {
        draft.validate()?;
        let mut inner = self.inner.lock().unwrap();
        if !inner.products.contains_key(&product_id) {
            return Err(CatalogError::product_not_found(product_id));
        }
        inner.next_quote_id += 1;
        let quote = PriceQuote {
            id: inner.next_quote_id,
            product_id,
            supplier: draft.normalized_supplier().to_string(),
            price: draft.price,
            recorded_at: Utc::now(),
        };
        inner.quotes.insert(quote.id, quote.clone());
        Ok(quote)
    }

    async fn get_quote(&self, id: i64) -> Result<Option<PriceQuote>, CatalogError> {
        Ok(self.inner.lock().unwrap().quotes.get(&id).cloned())
    }

    async fn update_quote(&self, id: i64, draft: &QuoteDraft) -> Result<PriceQuote, CatalogError> {
        draft.validate()?;
        let mut inner = self.inner.lock().unwrap();
        let quote = inner
            .quotes
            .get_mut(&id)
            .ok_or_else(|| CatalogError::quote_not_found(id))?;
        quote.supplier = draft.normalized_supplier().to_string();
        quote.price = draft.price;
        Ok(quote.clone())
    }

    async fn delete_quote(&self, id: i64) -> Result<(), CatalogError> {
        self.inner.lock().unwrap().quotes.remove(&id);
        Ok(())
    }
}

fn test_app() -> (Router, Arc<MemoryCatalog>) {
    let catalog = Arc::new(MemoryCatalog::default());
    let router = app(AppState {
        catalog: catalog.clone(),
    });
    (router, catalog)
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (router, _) = test_app();
    let (status, body) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_and_get_round_trip() {
    let (router, _) = test_app();
    let (status, created) = send(
        &router,
        "POST",
        "/products",
        Some(json!({ "name": "Rice 1kg", "description": "white rice", "units_per_box": 12 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, detail) = send(&router, "GET", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["name"], "Rice 1kg");
    assert_eq!(detail["description"], "white rice");
    assert_eq!(detail["units_per_box"], 12);
    assert_eq!(detail["quotes"], json!([]));
    assert_eq!(detail["cheapest_price"], Value::Null);
    assert_eq!(detail["unit_price"], Value::Null);
}

#[tokio::test]
async fn test_validation_errors_are_400_with_field() {
    let (router, _) = test_app();

    let (status, body) = send(
        &router,
        "POST",
        "/products",
        Some(json!({ "name": "  ", "description": null, "units_per_box": 12 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "name");

    let (status, body) = send(
        &router,
        "POST",
        "/products",
        Some(json!({ "name": "Rice 1kg", "description": null, "units_per_box": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "units_per_box");
}

#[tokio::test]
async fn test_duplicate_name_is_conflict_and_leaves_state_unchanged() {
    let (router, _) = test_app();
    let (status, _) = send(
        &router,
        "POST",
        "/products",
        Some(json!({ "name": "Rice 1kg", "description": "original", "units_per_box": 12 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &router,
        "POST",
        "/products",
        Some(json!({ "name": "Rice 1kg", "description": "imposter", "units_per_box": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Rice 1kg"));

    let (_, list) = send(&router, "GET", "/products", None).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["description"], "original");
    assert_eq!(list[0]["units_per_box"], 12);
}

#[tokio::test]
async fn test_unknown_product_is_404() {
    let (router, _) = test_app();
    let (status, _) = send(&router, "GET", "/products/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &router,
        "PUT",
        "/products/999",
        Some(json!({ "name": "Ghost", "description": null, "units_per_box": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &router,
        "POST",
        "/products/999/quotes",
        Some(json!({ "supplier": "X", "price": 10.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cheapest_tie_goes_to_first_inserted() {
    let (router, _) = test_app();
    let (_, created) = send(
        &router,
        "POST",
        "/products",
        Some(json!({ "name": "Beans 500g", "description": null, "units_per_box": 10 })),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    for (supplier, price) in [("A", 10.0), ("B", 5.0), ("C", 5.0)] {
        let (status, _) = send(
            &router,
            "POST",
            &format!("/products/{id}/quotes"),
            Some(json!({ "supplier": supplier, "price": price })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, detail) = send(&router, "GET", &format!("/products/{id}"), None).await;
    assert_eq!(detail["cheapest_supplier"], "B");
    assert_eq!(detail["cheapest_price"], 5.0);

    let (_, list) = send(&router, "GET", "/products", None).await;
    assert_eq!(list[0]["cheapest_supplier"], "B");
}

#[tokio::test]
async fn test_rice_scenario_unit_price_and_cascade_delete() {
    let (router, catalog) = test_app();
    let (_, created) = send(
        &router,
        "POST",
        "/products",
        Some(json!({ "name": "Rice 1kg", "description": null, "units_per_box": 12 })),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    send(
        &router,
        "POST",
        &format!("/products/{id}/quotes"),
        Some(json!({ "supplier": "X", "price": 24.0 })),
    )
    .await;
    send(
        &router,
        "POST",
        &format!("/products/{id}/quotes"),
        Some(json!({ "supplier": "Y", "price": 18.0 })),
    )
    .await;

    let (_, detail) = send(&router, "GET", &format!("/products/{id}"), None).await;
    assert_eq!(detail["cheapest_supplier"], "Y");
    assert_eq!(detail["unit_price"], 1.5);
    assert_eq!(detail["quotes"].as_array().unwrap().len(), 2);

    let (status, _) = send(&router, "DELETE", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&router, "GET", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send(&router, "GET", "/products", None).await;
    assert_eq!(list.as_array().unwrap().len(), 0);
    assert_eq!(catalog.quote_count(), 0, "no orphan quotes may remain");

    // Deleting again is a no-op, not an error.
    let (status, _) = send(&router, "DELETE", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_search_matches_name_or_description_case_insensitive() {
    let (router, _) = test_app();
    for (name, description) in [
        ("Cereal", Some("best with cold MILK")),
        ("Almond Milk", None),
        ("Bread", Some("plain loaf")),
    ] {
        send(
            &router,
            "POST",
            "/products",
            Some(json!({ "name": name, "description": description, "units_per_box": 1 })),
        )
        .await;
    }

    let (status, list) = send(&router, "GET", "/products?search=milk", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Almond Milk", "Cereal"]);
}

#[tokio::test]
async fn test_edit_product_full_replace() {
    let (router, _) = test_app();
    let (_, created) = send(
        &router,
        "POST",
        "/products",
        Some(json!({ "name": "Oats", "description": "rolled", "units_per_box": 8 })),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send(
        &router,
        "PUT",
        &format!("/products/{id}"),
        Some(json!({ "name": "Oats 1kg", "description": null, "units_per_box": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Oats 1kg");
    assert_eq!(updated["description"], Value::Null);
    assert_eq!(updated["units_per_box"], 10);
}

#[tokio::test]
async fn test_quote_edit_and_delete() {
    let (router, _) = test_app();
    let (_, created) = send(
        &router,
        "POST",
        "/products",
        Some(json!({ "name": "Sugar", "description": null, "units_per_box": 4 })),
    )
    .await;
    let product_id = created["id"].as_i64().unwrap();

    let (_, quote) = send(
        &router,
        "POST",
        &format!("/products/{product_id}/quotes"),
        Some(json!({ "supplier": "X", "price": 9.0 })),
    )
    .await;
    let quote_id = quote["id"].as_i64().unwrap();

    let (status, body) = send(
        &router,
        "POST",
        &format!("/products/{product_id}/quotes"),
        Some(json!({ "supplier": "X", "price": -1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "price");

    let (status, updated) = send(
        &router,
        "PUT",
        &format!("/quotes/{quote_id}"),
        Some(json!({ "supplier": "Z", "price": 7.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["supplier"], "Z");
    assert_eq!(updated["price"], 7.5);

    let (status, fetched) = send(&router, "GET", &format!("/quotes/{quote_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["supplier"], "Z");

    let (status, _) = send(
        &router,
        "PUT",
        "/quotes/999",
        Some(json!({ "supplier": "Z", "price": 7.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&router, "DELETE", &format!("/quotes/{quote_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, detail) = send(&router, "GET", &format!("/products/{product_id}"), None).await;
    assert_eq!(detail["quotes"], json!([]));

    // Idempotent quote delete.
    let (status, _) = send(&router, "DELETE", &format!("/quotes/{quote_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
