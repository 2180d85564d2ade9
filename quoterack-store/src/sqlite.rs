//! Embedded file-backed SQLite backend.
//!
//! Same contract as the PostgreSQL backend with dialect-native SQL:
//! positional `?n` binds, `lower(..) LIKE` instead of `ILIKE`, and
//! correlated subqueries instead of a lateral join for the cheapest-quote
//! aggregate.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use quoterack_core::pricing;
use quoterack_core::{
    CatalogError, CatalogRepository, PriceQuote, Product, ProductDraft, ProductSummary, QuoteDraft,
};

use crate::sql::{escape_like, is_unique_violation, storage, ProductRow, QuoteRow, SummaryRow};

pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                description TEXT,
                units_per_box INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS price_quotes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                product_id INTEGER NOT NULL REFERENCES products(id),
                supplier TEXT NOT NULL,
                price REAL NOT NULL,
                recorded_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS price_quotes_cheapest_idx
             ON price_quotes (product_id, price, id)",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

const SUMMARY_SELECT: &str = "SELECT p.id, p.name, p.description, p.units_per_box,
        (SELECT price FROM price_quotes
         WHERE product_id = p.id ORDER BY price ASC, id ASC LIMIT 1) AS cheapest_price,
        (SELECT supplier FROM price_quotes
         WHERE product_id = p.id ORDER BY price ASC, id ASC LIMIT 1) AS cheapest_supplier
     FROM products p";

const SUMMARY_ORDER: &str = " ORDER BY lower(p.name) ASC, p.id ASC";

#[async_trait]
impl CatalogRepository for SqliteCatalog {
    async fn list_products(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<ProductSummary>, CatalogError> {
        let term = search.map(str::trim).filter(|t| !t.is_empty());
        let rows: Vec<SummaryRow> = match term {
            Some(term) => {
                let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
                let sql = format!(
                    "{SUMMARY_SELECT} WHERE lower(p.name) LIKE ?1 ESCAPE '\\'
                        OR lower(coalesce(p.description, '')) LIKE ?1 ESCAPE '\\'{SUMMARY_ORDER}"
                );
                sqlx::query_as(&sql)
                    .bind(pattern)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!("{SUMMARY_SELECT}{SUMMARY_ORDER}");
                sqlx::query_as(&sql).fetch_all(&self.pool).await
            }
        }
        .map_err(storage)?;

        let mut summaries: Vec<ProductSummary> = rows.into_iter().map(Into::into).collect();
        pricing::attach_unit_prices(&mut summaries);
        Ok(summaries)
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>, CatalogError> {
        let row: Option<ProductRow> = sqlx::query_as(
            "SELECT id, name, description, units_per_box FROM products WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        Ok(row.map(Into::into))
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<Product, CatalogError> {
        draft.validate()?;
        let row: ProductRow = sqlx::query_as(
            "INSERT INTO products (name, description, units_per_box)
             VALUES (?1, ?2, ?3)
             RETURNING id, name, description, units_per_box",
        )
        .bind(draft.normalized_name())
        .bind(draft.description.as_deref())
        .bind(draft.units_per_box)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CatalogError::DuplicateName(draft.normalized_name().to_string())
            } else {
                storage(e)
            }
        })?;
        Ok(row.into())
    }

    async fn update_product(&self, id: i64, draft: &ProductDraft) -> Result<Product, CatalogError> {
        draft.validate()?;
        let row: Option<ProductRow> = sqlx::query_as(
            "UPDATE products SET name = ?2, description = ?3, units_per_box = ?4
             WHERE id = ?1
             RETURNING id, name, description, units_per_box",
        )
        .bind(id)
        .bind(draft.normalized_name())
        .bind(draft.description.as_deref())
        .bind(draft.units_per_box)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CatalogError::DuplicateName(draft.normalized_name().to_string())
            } else {
                storage(e)
            }
        })?;
        row.map(Into::into)
            .ok_or_else(|| CatalogError::product_not_found(id))
    }

    async fn delete_product(&self, id: i64) -> Result<(), CatalogError> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        sqlx::query("DELETE FROM price_quotes WHERE product_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        tx.commit().await.map_err(storage)?;
        if result.rows_affected() == 0 {
            debug!(product_id = id, "delete of absent product ignored");
        }
        Ok(())
    }

    async fn quotes_for_product(&self, product_id: i64) -> Result<Vec<PriceQuote>, CatalogError> {
        let rows: Vec<QuoteRow> = sqlx::query_as(
            "SELECT id, product_id, supplier, price, recorded_at
             FROM price_quotes
             WHERE product_id = ?1
             ORDER BY recorded_at DESC, id DESC",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn add_quote(
        &self,
        product_id: i64,
        draft: &QuoteDraft,
    ) -> Result<PriceQuote, CatalogError> {
        draft.validate()?;
        let mut tx = self.pool.begin().await.map_err(storage)?;
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage)?;
        if exists.is_none() {
            return Err(CatalogError::product_not_found(product_id));
        }
        let row: QuoteRow = sqlx::query_as(
            "INSERT INTO price_quotes (product_id, supplier, price, recorded_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, product_id, supplier, price, recorded_at",
        )
        .bind(product_id)
        .bind(draft.normalized_supplier())
        .bind(draft.price)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(storage)?;
        tx.commit().await.map_err(storage)?;
        Ok(row.into())
    }

    async fn get_quote(&self, id: i64) -> Result<Option<PriceQuote>, CatalogError> {
        let row: Option<QuoteRow> = sqlx::query_as(
            "SELECT id, product_id, supplier, price, recorded_at FROM price_quotes WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        Ok(row.map(Into::into))
    }

    async fn update_quote(&self, id: i64, draft: &QuoteDraft) -> Result<PriceQuote, CatalogError> {
        draft.validate()?;
        let row: Option<QuoteRow> = sqlx::query_as(
            "UPDATE price_quotes SET supplier = ?2, price = ?3
             WHERE id = ?1
             RETURNING id, product_id, supplier, price, recorded_at",
        )
        .bind(id)
        .bind(draft.normalized_supplier())
        .bind(draft.price)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        row.map(Into::into)
            .ok_or_else(|| CatalogError::quote_not_found(id))
    }

    async fn delete_quote(&self, id: i64) -> Result<(), CatalogError> {
        let result = sqlx::query("DELETE FROM price_quotes WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        if result.rows_affected() == 0 {
            debug!(quote_id = id, "delete of absent quote ignored");
        }
        Ok(())
    }
}
