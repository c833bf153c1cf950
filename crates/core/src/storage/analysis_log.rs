use crate::domain::sentiment::{AnalysisLogEntry, Sentiment, SentimentVerdict};
use crate::storage::AnalysisLogStore;
use anyhow::Context;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PgAnalysisLog {
    pool: sqlx::PgPool,
}

impl PgAnalysisLog {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AnalysisLogStore for PgAnalysisLog {
    fn store_name(&self) -> &'static str {
        "postgres"
    }

    async fn append(&self, entry: &AnalysisLogEntry) -> anyhow::Result<()> {
        let id = Uuid::new_v4();
        let keywords: Vec<String> = entry.verdict.keywords.clone();

        sqlx::query(
            "INSERT INTO analysis_log (id, ts, stakeholder, text, sentiment, confidence, keywords) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .persistent(false)
        .bind(id)
        .bind(entry.timestamp)
        .bind(&entry.stakeholder)
        .bind(&entry.verdict.text)
        .bind(entry.verdict.sentiment.as_str())
        .bind(entry.verdict.confidence)
        .bind(keywords)
        .execute(&self.pool)
        .await
        .context("insert analysis_log failed")?;

        tracing::debug!(%id, stakeholder = %entry.stakeholder, "analysis_log appended");
        Ok(())
    }

    async fn load_all(&self) -> anyhow::Result<Vec<AnalysisLogEntry>> {
        let rows = sqlx::query_as::<_, (f64, String, String, String, f64, Vec<String>)>(
            "SELECT ts, stakeholder, text, sentiment, confidence, keywords \
             FROM analysis_log \
             ORDER BY seq ASC",
        )
        .persistent(false)
        .fetch_all(&self.pool)
        .await
        .context("select analysis_log failed")?;

        let mut out = Vec::with_capacity(rows.len());
        for (timestamp, stakeholder, text, sentiment, confidence, keywords) in rows {
            let sentiment = Sentiment::parse(&sentiment).with_context(|| {
                format!("invalid sentiment in DB for stakeholder={stakeholder}: {sentiment}")
            })?;
            out.push(AnalysisLogEntry {
                timestamp,
                stakeholder,
                verdict: SentimentVerdict {
                    text,
                    sentiment,
                    confidence,
                    keywords,
                },
            });
        }
        Ok(out)
    }
}
