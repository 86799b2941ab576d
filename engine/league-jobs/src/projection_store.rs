//! Week projection records
//!
//! One record per (league, season, week) holding every snapshot taken that
//! week. The job loads it, appends, and writes the whole record back.

use async_trait::async_trait;
use league_core::{TeamProjection, WeekProjections};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::{Result, StorageError};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS week_projections (
    league_id   TEXT        NOT NULL,
    season      TEXT        NOT NULL,
    week        INTEGER     NOT NULL,
    projections JSONB       NOT NULL DEFAULT '[]'::jsonb,
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (league_id, season, week)
)
"#;

#[async_trait]
pub trait ProjectionStore: Send + Sync {
    /// Load a week's record, empty if none has been saved
    async fn load_week(&self, league_id: &str, season: &str, week: u32) -> Result<WeekProjections>;

    /// Replace a week's record
    async fn save_week(&self, record: &WeekProjections) -> Result<()>;
}

/// Postgres-backed store
pub struct PgProjectionStore {
    pool: PgPool,
}

impl PgProjectionStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(2).connect(database_url).await?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

fn week_column(week: u32) -> Result<i32> {
    i32::try_from(week).map_err(|_| StorageError::WeekOutOfRange(week))
}

#[async_trait]
impl ProjectionStore for PgProjectionStore {
    async fn load_week(&self, league_id: &str, season: &str, week: u32) -> Result<WeekProjections> {
        let row: Option<(Json<Vec<TeamProjection>>,)> = sqlx::query_as(
            "SELECT projections FROM week_projections WHERE league_id = $1 AND season = $2 AND week = $3",
        )
        .bind(league_id)
        .bind(season)
        .bind(week_column(week)?)
        .fetch_optional(&self.pool)
        .await?;

        let record = WeekProjections::empty(league_id, season, week);
        Ok(match row {
            Some((Json(projections),)) => record.with_snapshot(projections),
            None => record,
        })
    }

    async fn save_week(&self, record: &WeekProjections) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO week_projections (league_id, season, week, projections, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (league_id, season, week)
            DO UPDATE SET projections = EXCLUDED.projections, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&record.league_id)
        .bind(&record.season)
        .bind(week_column(record.week)?)
        .bind(Json(&record.projections))
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;

        info!(
            "Saved {} projections for league {} week {}",
            record.projections.len(),
            record.league_id,
            record.week
        );
        Ok(())
    }
}

/// In-memory store (for testing)
#[derive(Clone, Default)]
pub struct InMemoryProjectionStore {
    records: Arc<Mutex<HashMap<(String, String, u32), WeekProjections>>>,
}

impl InMemoryProjectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectionStore for InMemoryProjectionStore {
    async fn load_week(&self, league_id: &str, season: &str, week: u32) -> Result<WeekProjections> {
        let records = self.records.lock().await;
        Ok(records
            .get(&(league_id.to_string(), season.to_string(), week))
            .cloned()
            .unwrap_or_else(|| WeekProjections::empty(league_id, season, week)))
    }

    async fn save_week(&self, record: &WeekProjections) -> Result<()> {
        let key = (record.league_id.clone(), record.season.clone(), record.week);
        self.records.lock().await.insert(key, record.clone());
        Ok(())
    }
}
