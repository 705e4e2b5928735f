use crate::DbError;
use chrono::{DateTime, Utc};
use core_types::{PricePoint, PriceSeries, StockRecord};
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use sqlx::FromRow;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
///
/// Clones share the same pool.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

// This struct represents the subset of a `stock` row the analyzer needs.
#[derive(FromRow, Debug, Clone)]
struct DbPricePoint {
    date: DateTime<Utc>,
    close: Decimal,
}

impl From<DbPricePoint> for PricePoint {
    fn from(row: DbPricePoint) -> Self {
        PricePoint::new(row.date, row.close)
    }
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches every stored closing price, oldest first.
    ///
    /// Rows whose close is NULL carry no usable price and are skipped.
    pub async fn get_price_series(&self) -> Result<PriceSeries, DbError> {
        let rows = sqlx::query_as::<_, DbPricePoint>(
            r#"
            SELECT date, close
            FROM stock
            WHERE close IS NOT NULL
            ORDER BY date ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(rows = rows.len(), "Fetched price series");
        Ok(rows.into_iter().map(PricePoint::from).collect())
    }

    /// Saves a batch of bars atomically: either every bar is stored or none is.
    ///
    /// A bar replaces any bar already stored for the same date.
    pub async fn save_stock_records(&self, records: &[StockRecord]) -> Result<usize, DbError> {
        let mut tx = self.pool.begin().await?;
        for record in records {
            upsert_stock_record(&mut tx, record).await?;
        }
        tx.commit().await?;

        tracing::info!(count = records.len(), "Saved stock records");
        Ok(records.len())
    }
}

async fn upsert_stock_record(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    record: &StockRecord,
) -> Result<(), DbError> {
    sqlx::query(
        r#"
        INSERT INTO stock (date, open, high, low, close, volume)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (date) DO UPDATE
        SET open = EXCLUDED.open,
            high = EXCLUDED.high,
            low = EXCLUDED.low,
            close = EXCLUDED.close,
            volume = EXCLUDED.volume
        "#,
    )
    .bind(record.date)
    .bind(record.open)
    .bind(record.high)
    .bind(record.low)
    .bind(record.close)
    .bind(record.volume)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
