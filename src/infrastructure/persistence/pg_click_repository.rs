//! PostgreSQL implementation of click repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// PostgreSQL repository for click tracking.
///
/// Each call checks a connection out of the pool, so concurrent workers
/// never share a connection.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ClickRow {
    id: i64,
    link_id: i64,
    clicked_at: DateTime<Utc>,
    user_agent: Option<String>,
    ip: Option<String>,
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn create(&self, new_click: NewClick) -> Result<Click, AppError> {
        let row = sqlx::query_as::<_, ClickRow>(
            r#"
            INSERT INTO link_clicks (link_id, clicked_at, user_agent, ip)
            VALUES ($1, $2, $3, $4)
            RETURNING id, link_id, clicked_at, user_agent, ip
            "#,
        )
        .bind(new_click.link_id)
        .bind(new_click.clicked_at)
        .bind(&new_click.user_agent)
        .bind(&new_click.ip)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(Click::new(
            row.id,
            row.link_id,
            row.clicked_at,
            row.user_agent,
            row.ip,
        ))
    }

    async fn count_by_link_id(&self, link_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM link_clicks
            WHERE link_id = $1
            "#,
        )
        .bind(link_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }
}
