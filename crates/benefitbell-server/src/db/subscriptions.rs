//! `push_subscriptions` table

use async_trait::async_trait;
use benefitbell_common::BenefitCategory;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::StoreResult;
use crate::notify::{PushSubscription, SubscriptionStore};

#[derive(Debug, FromRow)]
struct SubscriptionRow {
    endpoint: String,
    p256dh: String,
    auth: String,
    categories: Vec<String>,
    created_at: DateTime<Utc>,
}

impl From<SubscriptionRow> for PushSubscription {
    fn from(row: SubscriptionRow) -> Self {
        let categories = row
            .categories
            .iter()
            .filter_map(|slug| match slug.parse::<BenefitCategory>() {
                Ok(category) => Some(category),
                Err(e) => {
                    tracing::warn!(endpoint = %row.endpoint, error = %e, "Dropping stored category");
                    None
                },
            })
            .collect();

        Self {
            endpoint: row.endpoint,
            p256dh: row.p256dh,
            auth: row.auth,
            categories,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgSubscriptionStore {
    pool: PgPool,
}

impl PgSubscriptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for PgSubscriptionStore {
    async fn upsert(&self, subscription: &PushSubscription) -> StoreResult<()> {
        let categories: Vec<&str> = subscription.categories.iter().map(|c| c.as_str()).collect();

        sqlx::query(
            r#"
            INSERT INTO push_subscriptions (endpoint, p256dh, auth, categories, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (endpoint) DO UPDATE SET
                p256dh = EXCLUDED.p256dh,
                auth = EXCLUDED.auth,
                categories = EXCLUDED.categories
            "#,
        )
        .bind(&subscription.endpoint)
        .bind(&subscription.p256dh)
        .bind(&subscription.auth)
        .bind(&categories)
        .bind(subscription.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, endpoint: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM push_subscriptions WHERE endpoint = $1")
            .bind(endpoint)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> StoreResult<Vec<PushSubscription>> {
        let rows = sqlx::query_as::<_, SubscriptionRow>(
            "SELECT endpoint, p256dh, auth, categories, created_at FROM push_subscriptions ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PushSubscription::from).collect())
    }

    async fn count(&self) -> StoreResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM push_subscriptions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }
}
