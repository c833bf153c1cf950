pub mod analysis_log;

use crate::domain::sentiment::AnalysisLogEntry;
use anyhow::Context;

/// Durable backing for the analysis log. Entries come back in insertion order.
#[async_trait::async_trait]
pub trait AnalysisLogStore: Send + Sync {
    fn store_name(&self) -> &'static str;

    async fn append(&self, entry: &AnalysisLogEntry) -> anyhow::Result<()>;

    async fn load_all(&self) -> anyhow::Result<Vec<AnalysisLogEntry>>;
}

pub async fn migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("sqlx migrations failed")?;
    Ok(())
}
