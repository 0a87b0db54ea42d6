use std::fmt::Display;
use std::future::Future;

use async_trait::async_trait;
use bb8_postgres::bb8::{Pool, PooledConnection};
use bb8_postgres::tokio_postgres::{GenericClient, NoTls, Row};
use bb8_postgres::PostgresConnectionManager;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::helpers::retry::RetryPolicy;
use crate::models::area::AreaKey;
use crate::models::restaurant::{PriceLevel, RestaurantRecord};
use crate::repositories::RestaurantStore;

const CREATE_RESTAURANTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS restaurants (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    address TEXT NOT NULL,
    zipcode TEXT,
    city TEXT,
    rating DOUBLE PRECISION,
    price_level TEXT,
    keyword TEXT,
    UNIQUE NULLS NOT DISTINCT (name, address, zipcode)
);";

// Parentheses keep the keyword filter applied to both the zipcode and the city branch.
const FIND_BY_AREA: &str = "SELECT name, address, zipcode, city, rating, price_level, keyword \
    FROM restaurants \
    WHERE (zipcode = $1 OR city = $2) AND keyword IS NOT DISTINCT FROM $3 \
    ORDER BY id \
    LIMIT $4;";

const INSERT_IF_ABSENT: &str = "INSERT INTO restaurants \
    (name, address, zipcode, city, rating, price_level, keyword) \
    VALUES ($1, $2, $3, $4, $5, $6, $7) \
    ON CONFLICT DO NOTHING;";

pub struct PostgresConnectionRepo {
    postgres_connection: Pool<PostgresConnectionManager<NoTls>>,
    retry: RetryPolicy,
}

impl PostgresConnectionRepo {
    pub fn new(
        postgres_connection: Pool<PostgresConnectionManager<NoTls>>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            postgres_connection,
            retry,
        }
    }

    async fn get_postgres_connection(
        &self,
    ) -> Result<PooledConnection<'_, PostgresConnectionManager<NoTls>>, StoreError> {
        checkout_with_retry(self.retry, || self.postgres_connection.get()).await
    }

    /// Creates the `restaurants` table when it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let conn = self.get_postgres_connection().await?;
        conn.batch_execute(CREATE_RESTAURANTS_TABLE).await?;
        Ok(())
    }
}

/// Retries a pool checkout with the policy's delay between attempts. No delay
/// follows the final failure.
async fn checkout_with_retry<T, E, F, Fut>(retry: RetryPolicy, mut checkout: F) -> Result<T, StoreError>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = retry.attempts.max(1);
    let mut attempt = 1;
    loop {
        match checkout().await {
            Ok(conn) => return Ok(conn),
            Err(e) if attempt < attempts => {
                warn!(
                    "Failed to retrieve postgres connection due to: {}, retrying in {:?} (attempt {}/{})",
                    e, retry.delay, attempt, attempts
                );
                tokio::time::sleep(retry.delay).await;
                attempt += 1;
            }
            Err(e) => {
                warn!("Failed to retrieve postgres connection due to: {}, giving up after {} attempts", e, attempts);
                return Err(StoreError::Pool(e.to_string()));
            }
        }
    }
}

async fn insert_if_absent<C: GenericClient + Sync>(
    client: &C,
    record: &RestaurantRecord,
) -> Result<bool, StoreError> {
    let price_level = record.price_level.as_ref().map(PriceLevel::to_stored);
    let inserted = client
        .execute(
            INSERT_IF_ABSENT,
            &[
                &record.name,
                &record.address,
                &record.zipcode,
                &record.city,
                &record.rating,
                &price_level,
                &record.keyword,
            ],
        )
        .await?;
    Ok(inserted == 1)
}

#[async_trait]
impl RestaurantStore for PostgresConnectionRepo {
    async fn find_by_area(
        &self,
        area: &AreaKey,
        keyword: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RestaurantRecord>, StoreError> {
        let conn = self.get_postgres_connection().await?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = conn
            .query(FIND_BY_AREA, &[&area.zipcode, &area.city, &keyword, &limit])
            .await?;

        Ok(rows.into_iter().map(parse_row_into_restaurant).collect())
    }

    async fn upsert_if_absent(&self, record: &RestaurantRecord) -> Result<bool, StoreError> {
        let conn = self.get_postgres_connection().await?;
        insert_if_absent(&*conn, record).await
    }

    async fn upsert_all_if_absent(
        &self,
        records: &[RestaurantRecord],
    ) -> Result<Vec<bool>, StoreError> {
        let mut conn = self.get_postgres_connection().await?;
        let transaction = conn.transaction().await?;

        let mut inserted = Vec::with_capacity(records.len());
        for record in records {
            inserted.push(insert_if_absent(&transaction, record).await?);
        }
        transaction.commit().await?;

        debug!("Committed {} restaurant rows in one transaction", records.len());
        Ok(inserted)
    }
}

fn parse_row_into_restaurant(
    row: Row,
) -> RestaurantRecord {
    RestaurantRecord {
        name: row.get("name"),
        address: row.get("address"),
        zipcode: row.get("zipcode"),
        city: row.get("city"),
        rating: row.get::<&str, Option<f64>>("rating"),
        price_level: row
            .get::<&str, Option<String>>("price_level")
            .map(|level| PriceLevel::from_stored(&level)),
        keyword: row.get("keyword"),
    }
}
