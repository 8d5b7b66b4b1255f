use crate::DbError;
use core_types::{Contract, KycRecord, Product, User};
use kpi_engine::EntitySnapshot;
use sqlx::postgres::PgPool;

/// The `EntityRepository` provides a high-level, read-only interface to the
/// four entity collections the KPI aggregation consumes. It encapsulates all
/// SQL and data access logic.
///
/// The collections are small at this scale, so every read returns the full
/// table without pagination; ordering by creation time keeps the "first seen"
/// tie-breaking of the rankings stable across calls.
#[derive(Debug, Clone)]
pub struct EntityRepository {
    pool: PgPool,
}

impl EntityRepository {
    /// Creates a new `EntityRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches all contracts, oldest first.
    pub async fn list_contracts(&self) -> Result<Vec<Contract>, DbError> {
        let contracts = sqlx::query_as::<_, Contract>(
            "SELECT id, user_id, product_id, amount, status, start_date, end_date, created_at, updated_at \
             FROM contracts ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(contracts)
    }

    /// Fetches all products, oldest first.
    pub async fn list_products(&self) -> Result<Vec<Product>, DbError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, interest_rate, created_at FROM products ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    /// Fetches all users, oldest first.
    pub async fn list_users(&self) -> Result<Vec<User>, DbError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, created_at FROM users ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Fetches all KYC records, oldest first.
    pub async fn list_kyc_records(&self) -> Result<Vec<KycRecord>, DbError> {
        let records = sqlx::query_as::<_, KycRecord>(
            "SELECT id, user_id, status, created_at FROM kyc_records ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    /// Reads all four collections concurrently into one `EntitySnapshot`.
    ///
    /// Any single failed read fails the whole snapshot; the aggregation never
    /// runs on partial data.
    pub async fn fetch_snapshot(&self) -> Result<EntitySnapshot, DbError> {
        let (contracts, products, users, kyc_records) = tokio::join!(
            self.list_contracts(),
            self.list_products(),
            self.list_users(),
            self.list_kyc_records(),
        );

        Ok(EntitySnapshot {
            contracts: contracts?,
            products: products?,
            users: users?,
            kyc_records: kyc_records?,
        })
    }
}
