//! SQLite-backed market store
//!
//! Blocking rusqlite calls run on the blocking pool. The connection is
//! shared behind a mutex, so queries from concurrent requests are
//! serialized; each one sees whatever the table holds when it runs.

use super::{MarketStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use types::aggregate::Totals;
use types::ids::{ChainId, MarketId};
use types::market::Market;
use types::numeric::Cents;

const SCHEMA: &str = include_str!("../../migrations/0001_create_market.sql");

const SELECT_MARKETS: &str = "SELECT id, name, chain_id, total_supply_cents, total_borrow_cents, created_at
     FROM market
     WHERE ?1 IS NULL OR chain_id = ?1
     ORDER BY id ASC";

const SELECT_BY_NAME: &str = "SELECT id, name, chain_id, total_supply_cents, total_borrow_cents, created_at
     FROM market
     WHERE name = ?1";

const SUM_TOTALS: &str = "SELECT SUM(total_supply_cents), SUM(total_borrow_cents), COUNT(*)
     FROM market
     WHERE ?1 IS NULL OR chain_id = ?1";

const SELECT_AMOUNTS: &str = "SELECT total_supply_cents, total_borrow_cents
     FROM market
     WHERE ?1 IS NULL OR chain_id = ?1";

/// Apply the market schema. Idempotent.
pub fn migrate(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

#[derive(Clone)]
pub struct SqliteMarketStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMarketStore {
    /// Open (or create) the database file and apply the schema
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    /// Wrap an existing connection, applying the schema first
    pub fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&guard)
        })
        .await?
    }
}

struct MarketRow {
    id: i64,
    name: String,
    chain_id: String,
    total_supply_cents: i64,
    total_borrow_cents: i64,
    created_at: DateTime<Utc>,
}

impl MarketRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            chain_id: row.get(2)?,
            total_supply_cents: row.get(3)?,
            total_borrow_cents: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

impl TryFrom<MarketRow> for Market {
    type Error = StoreError;

    fn try_from(row: MarketRow) -> Result<Self, Self::Error> {
        let id = MarketId::try_new(row.id).ok_or_else(|| StoreError::InvalidRow {
            id: row.id,
            reason: "non-positive id".to_string(),
        })?;
        let chain_id = ChainId::try_new(row.chain_id).ok_or_else(|| StoreError::InvalidRow {
            id: row.id,
            reason: "empty chain_id".to_string(),
        })?;

        Ok(Market {
            id,
            name: row.name,
            chain_id,
            total_supply_cents: Cents::from(row.total_supply_cents),
            total_borrow_cents: Cents::from(row.total_borrow_cents),
            created_at: row.created_at,
        })
    }
}

fn is_integer_overflow(err: &rusqlite::Error) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(_, Some(msg)) if msg == "integer overflow")
}

/// Sum rows in process with the exact accumulator
fn stream_totals(conn: &Connection, chain_id: Option<&str>) -> Result<Totals, StoreError> {
    let mut stmt = conn.prepare(SELECT_AMOUNTS)?;
    let mut rows = stmt.query(params![chain_id])?;

    let mut totals = Totals::default();
    while let Some(row) = rows.next()? {
        let supply: i64 = row.get(0)?;
        let borrow: i64 = row.get(1)?;
        totals.add_amounts(Cents::from(supply), Cents::from(borrow))?;
    }
    Ok(totals)
}

#[async_trait]
impl MarketStore for SqliteMarketStore {
    async fn find_markets(&self, chain_id: Option<&ChainId>) -> Result<Vec<Market>, StoreError> {
        tracing::debug!(chain_id = ?chain_id, "Finding markets");
        let chain_id = chain_id.map(|c| c.as_str().to_owned());

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(SELECT_MARKETS)?;
            let rows = stmt.query_map(params![chain_id], MarketRow::from_row)?;

            let mut markets = Vec::new();
            for row in rows {
                markets.push(Market::try_from(row?)?);
            }
            Ok(markets)
        })
        .await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Market>, StoreError> {
        tracing::debug!(name, "Finding market by name");
        let name = name.to_owned();

        self.with_conn(move |conn| {
            let row = conn
                .query_row(SELECT_BY_NAME, params![name], MarketRow::from_row)
                .optional()?;
            row.map(Market::try_from).transpose()
        })
        .await
    }

    async fn sum_totals(&self, chain_id: Option<&ChainId>) -> Result<Totals, StoreError> {
        tracing::debug!(chain_id = ?chain_id, "Summing market totals");
        let chain_id = chain_id.map(|c| c.as_str().to_owned());

        self.with_conn(move |conn| {
            let summed = conn.query_row(SUM_TOTALS, params![chain_id], |row| {
                let supply: Option<i64> = row.get(0)?;
                let borrow: Option<i64> = row.get(1)?;
                let count: i64 = row.get(2)?;
                Ok((supply, borrow, count))
            });

            match summed {
                Ok((supply, borrow, count)) => Ok(Totals::from_sums(
                    supply.map(Cents::from),
                    borrow.map(Cents::from),
                    count.unsigned_abs(),
                )),
                // SQLite's SUM is exact but bounded to i64.
                Err(err) if is_integer_overflow(&err) => {
                    tracing::debug!(chain_id = ?chain_id, "SUM overflowed i64, streaming rows instead");
                    stream_totals(conn, chain_id.as_deref())
                }
                Err(err) => Err(err.into()),
            }
        })
        .await
    }
}
