//! `welfare_details` table

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::collections::HashSet;

use super::{StoreError, StoreResult};
use crate::catalog::DetailStore;
use crate::welfare::{Contact, Homepage, WelfareDetail};

const SELECT_COLUMNS: &str = r#"
    serv_id, title, ministry, phone, year, support_cycle, support_type,
    overview, target_detail, selection_criteria, support_content,
    apply_bgn_dt, apply_end_dt, life_stages, target_groups, themes,
    application_methods, application_links, contacts, required_docs,
    related_laws, homepages, fetched_at
"#;

#[derive(Debug, FromRow)]
struct DetailRow {
    serv_id: String,
    title: String,
    ministry: String,
    phone: String,
    year: String,
    support_cycle: String,
    support_type: String,
    overview: String,
    target_detail: String,
    selection_criteria: String,
    support_content: String,
    apply_bgn_dt: String,
    apply_end_dt: String,
    life_stages: String,
    target_groups: String,
    themes: String,
    application_methods: Json<Vec<String>>,
    application_links: Json<Vec<String>>,
    contacts: Json<Vec<Contact>>,
    required_docs: Json<Vec<String>>,
    related_laws: Json<Vec<String>>,
    homepages: Json<Vec<Homepage>>,
    fetched_at: DateTime<Utc>,
}

impl From<DetailRow> for WelfareDetail {
    fn from(row: DetailRow) -> Self {
        Self {
            serv_id: row.serv_id,
            title: row.title,
            ministry: row.ministry,
            phone: row.phone,
            year: row.year,
            support_cycle: row.support_cycle,
            support_type: row.support_type,
            overview: row.overview,
            target_detail: row.target_detail,
            selection_criteria: row.selection_criteria,
            support_content: row.support_content,
            apply_bgn_dt: row.apply_bgn_dt,
            apply_end_dt: row.apply_end_dt,
            life_stages: row.life_stages,
            target_groups: row.target_groups,
            themes: row.themes,
            application_methods: row.application_methods.0,
            application_links: row.application_links.0,
            contacts: row.contacts.0,
            required_docs: row.required_docs.0,
            related_laws: row.related_laws.0,
            homepages: row.homepages.0,
            fetched_at: row.fetched_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgDetailStore {
    pool: PgPool,
}

impl PgDetailStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn upsert_one(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        detail: &WelfareDetail,
    ) -> StoreResult<()> {
        if detail.serv_id.is_empty() {
            return Err(StoreError::Invalid("detail without serv_id".to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO welfare_details (
                serv_id, title, ministry, phone, year, support_cycle, support_type,
                overview, target_detail, selection_criteria, support_content,
                apply_bgn_dt, apply_end_dt, life_stages, target_groups, themes,
                application_methods, application_links, contacts, required_docs,
                related_laws, homepages, fetched_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22, $23)
            ON CONFLICT (serv_id) DO UPDATE SET
                title = EXCLUDED.title,
                ministry = EXCLUDED.ministry,
                phone = EXCLUDED.phone,
                year = EXCLUDED.year,
                support_cycle = EXCLUDED.support_cycle,
                support_type = EXCLUDED.support_type,
                overview = EXCLUDED.overview,
                target_detail = EXCLUDED.target_detail,
                selection_criteria = EXCLUDED.selection_criteria,
                support_content = EXCLUDED.support_content,
                apply_bgn_dt = EXCLUDED.apply_bgn_dt,
                apply_end_dt = EXCLUDED.apply_end_dt,
                life_stages = EXCLUDED.life_stages,
                target_groups = EXCLUDED.target_groups,
                themes = EXCLUDED.themes,
                application_methods = EXCLUDED.application_methods,
                application_links = EXCLUDED.application_links,
                contacts = EXCLUDED.contacts,
                required_docs = EXCLUDED.required_docs,
                related_laws = EXCLUDED.related_laws,
                homepages = EXCLUDED.homepages,
                fetched_at = EXCLUDED.fetched_at
            "#,
        )
        .bind(&detail.serv_id)
        .bind(&detail.title)
        .bind(&detail.ministry)
        .bind(&detail.phone)
        .bind(&detail.year)
        .bind(&detail.support_cycle)
        .bind(&detail.support_type)
        .bind(&detail.overview)
        .bind(&detail.target_detail)
        .bind(&detail.selection_criteria)
        .bind(&detail.support_content)
        .bind(&detail.apply_bgn_dt)
        .bind(&detail.apply_end_dt)
        .bind(&detail.life_stages)
        .bind(&detail.target_groups)
        .bind(&detail.themes)
        .bind(Json(&detail.application_methods))
        .bind(Json(&detail.application_links))
        .bind(Json(&detail.contacts))
        .bind(Json(&detail.required_docs))
        .bind(Json(&detail.related_laws))
        .bind(Json(&detail.homepages))
        .bind(detail.fetched_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl DetailStore for PgDetailStore {
    async fn get(&self, serv_id: &str) -> StoreResult<Option<WelfareDetail>> {
        let row = sqlx::query_as::<_, DetailRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM welfare_details WHERE serv_id = $1"
        ))
        .bind(serv_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(WelfareDetail::from))
    }

    async fn upsert_many(&self, details: &[WelfareDetail]) -> StoreResult<u64> {
        if details.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        for detail in details {
            Self::upsert_one(&mut tx, detail).await?;
        }
        tx.commit().await?;

        Ok(details.len() as u64)
    }

    async fn fresh_ids_since(&self, cutoff: DateTime<Utc>) -> StoreResult<HashSet<String>> {
        let ids: Vec<(String,)> =
            sqlx::query_as("SELECT serv_id FROM welfare_details WHERE fetched_at > $1")
                .bind(cutoff)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn all_ids(&self) -> StoreResult<HashSet<String>> {
        let ids: Vec<(String,)> = sqlx::query_as("SELECT serv_id FROM welfare_details")
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn list_all(&self) -> StoreResult<Vec<WelfareDetail>> {
        let rows = sqlx::query_as::<_, DetailRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM welfare_details ORDER BY serv_id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(WelfareDetail::from).collect())
    }

    async fn health(&self) -> StoreResult<()> {
        super::health_check(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(serv_id: &str, fetched_at: DateTime<Utc>) -> WelfareDetail {
        WelfareDetail {
            serv_id: serv_id.to_string(),
            title: "국민내일배움카드".to_string(),
            ministry: "고용노동부".to_string(),
            phone: "1350".to_string(),
            year: "2026".to_string(),
            support_cycle: String::new(),
            support_type: String::new(),
            overview: String::new(),
            target_detail: String::new(),
            selection_criteria: String::new(),
            support_content: "훈련비 지원".to_string(),
            apply_bgn_dt: String::new(),
            apply_end_dt: "상시".to_string(),
            life_stages: String::new(),
            target_groups: String::new(),
            themes: String::new(),
            application_methods: vec!["온라인".to_string()],
            application_links: vec![],
            contacts: vec![Contact { name: "고객상담센터".into(), address: "1350".into() }],
            required_docs: vec![],
            related_laws: vec![],
            homepages: vec![],
            fetched_at,
        }
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_upsert_and_get(pool: PgPool) -> sqlx::Result<()> {
        let store = PgDetailStore::new(pool);
        let now = Utc::now();

        store.upsert_many(&[detail("WLF1", now)]).await.unwrap();
        let loaded = store.get("WLF1").await.unwrap().unwrap();
        assert_eq!(loaded.title, "국민내일배움카드");
        assert_eq!(loaded.contacts[0].address, "1350");

        let mut updated = detail("WLF1", now);
        updated.title = "국민내일배움카드 (개편)".to_string();
        store.upsert_many(&[updated]).await.unwrap();
        assert_eq!(store.get("WLF1").await.unwrap().unwrap().title, "국민내일배움카드 (개편)");

        assert!(store.get("WLF404").await.unwrap().is_none());
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_fresh_ids_since(pool: PgPool) -> sqlx::Result<()> {
        let store = PgDetailStore::new(pool);
        let now = Utc::now();
        let old = now - chrono::Duration::hours(20);

        store
            .upsert_many(&[detail("FRESH", now), detail("OLD", old)])
            .await
            .unwrap();

        let fresh = store.fresh_ids_since(now - chrono::Duration::hours(12)).await.unwrap();
        assert!(fresh.contains("FRESH"));
        assert!(!fresh.contains("OLD"));
        assert_eq!(store.all_ids().await.unwrap().len(), 2);
        Ok(())
    }
}
