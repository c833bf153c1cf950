use crate::aggregate::{Aggregator, AggregatorOptions};
use crate::domain::sentiment::{
    AnalysisLogEntry, GlobalSummary, SentimentVerdict, StakeholderRecord,
};
use crate::error::{AnalyzeError, RecordError};
use crate::scoring;
use crate::storage::AnalysisLogStore;
use anyhow::Context;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Summary, stakeholders and recent entries read under a single lock acquisition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub summary: GlobalSummary,
    pub stakeholders: Vec<StakeholderRecord>,
    pub recent: Vec<AnalysisLogEntry>,
}

/// Serializes every append and read against one aggregator.
///
/// With a durable store configured, an entry is written to the store before it becomes
/// visible in memory; if the store write fails, nothing changes.
pub struct AnalysisService {
    aggregator: Mutex<Aggregator>,
    store: Option<Arc<dyn AnalysisLogStore>>,
}

impl AnalysisService {
    pub fn in_memory(options: AggregatorOptions) -> Self {
        Self {
            aggregator: Mutex::new(Aggregator::new(options)),
            store: None,
        }
    }

    /// Replays the store's log into a fresh aggregator.
    pub async fn with_store(
        options: AggregatorOptions,
        store: Arc<dyn AnalysisLogStore>,
    ) -> anyhow::Result<Self> {
        let entries = store
            .load_all()
            .await
            .with_context(|| format!("failed to load analysis log from {}", store.store_name()))?;
        let loaded = entries.len();
        let aggregator = Aggregator::from_entries(options, entries)
            .context("persisted analysis log contains a malformed entry")?;

        tracing::info!(store = store.store_name(), loaded, "analysis log restored");

        Ok(Self {
            aggregator: Mutex::new(aggregator),
            store: Some(store),
        })
    }

    pub fn is_durable(&self) -> bool {
        self.store.is_some()
    }

    pub async fn record(
        &self,
        verdict: SentimentVerdict,
        stakeholder: &str,
        timestamp: f64,
    ) -> Result<AnalysisLogEntry, RecordError> {
        let entry = AnalysisLogEntry::try_new(verdict, stakeholder, timestamp)?;

        let mut aggregator = self.aggregator.lock().await;
        if let Some(store) = &self.store {
            store.append(&entry).await.map_err(RecordError::Store)?;
        }
        aggregator.commit(entry.clone());

        tracing::debug!(
            stakeholder = %entry.stakeholder,
            sentiment = %entry.verdict.sentiment,
            confidence = entry.verdict.confidence,
            total = aggregator.len(),
            "analysis recorded"
        );
        Ok(entry)
    }

    /// Scores `text`, stamps it with the current time and records it for `stakeholder`.
    pub async fn analyze(
        &self,
        text: &str,
        stakeholder: &str,
    ) -> Result<AnalysisLogEntry, AnalyzeError> {
        let verdict = scoring::score(text)?;
        let entry = self.record(verdict, stakeholder, now_seconds()).await?;
        Ok(entry)
    }

    pub async fn summary(&self) -> GlobalSummary {
        self.aggregator.lock().await.summary()
    }

    pub async fn stakeholders(&self) -> Vec<StakeholderRecord> {
        self.aggregator.lock().await.stakeholders().to_vec()
    }

    pub async fn recent(&self, n: usize) -> Vec<AnalysisLogEntry> {
        self.aggregator.lock().await.recent(n)
    }

    pub async fn dashboard(&self, recent: usize) -> DashboardSnapshot {
        let aggregator = self.aggregator.lock().await;
        DashboardSnapshot {
            summary: aggregator.summary(),
            stakeholders: aggregator.stakeholders().to_vec(),
            recent: aggregator.recent(recent),
        }
    }
}

pub fn now_seconds() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
